//! SQLite intake implementation
//!
//! Stores harvested documents and plays the host's filtering role:
//! a document whose URL is already stored, or one arriving after the
//! per-run ceiling was reached, finishes the run.

use crate::intake::schema::initialize_schema;
use crate::intake::traits::{Intake, IntakeError, StorageError, StorageResult};
use crate::model::Document;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const DOCUMENT_COLUMNS: &str = "id, url, title, body, published_at, loaded_at";

/// SQLite-backed intake
pub struct SqliteIntake {
    conn: Connection,
    source: String,
    max_materials: Option<usize>,
    accepted: usize,
}

impl SqliteIntake {
    /// Opens or creates a document store
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `source` - Source name recorded with every document
    pub fn open(path: &Path, source: &str) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn,
            source: source.to_string(),
            max_materials: None,
            accepted: 0,
        })
    }

    /// Creates an in-memory store (for testing)
    #[cfg(test)]
    pub fn open_in_memory(source: &str) -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn,
            source: source.to_string(),
            max_materials: None,
            accepted: 0,
        })
    }

    /// Sets the ceiling on documents accepted during this run
    pub fn with_max_materials(mut self, max_materials: Option<usize>) -> Self {
        self.max_materials = max_materials;
        self
    }

    /// Number of documents accepted since this intake was opened
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// Returns true if a document with this fingerprint is stored
    pub fn contains(&self, fingerprint: &str) -> StorageResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM documents WHERE fingerprint = ?1",
                params![fingerprint],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Counts stored documents for this source
    pub fn count_documents(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE source = ?1",
            params![self.source],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// The most recently published stored document, if any
    ///
    /// Used to build the last-seen marker of the next run's restriction.
    pub fn latest_document(&self) -> StorageResult<Option<Document>> {
        Ok(self.recent_documents(1)?.into_iter().next())
    }

    /// Stored documents, newest publish date first
    pub fn recent_documents(&self, limit: usize) -> StorageResult<Vec<Document>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM documents WHERE source = ?1
             ORDER BY published_at DESC, id DESC LIMIT ?2",
            DOCUMENT_COLUMNS
        ))?;

        let rows = stmt.query_map(params![self.source, limit as i64], raw_document)?;

        let mut documents = Vec::new();
        for row in rows {
            documents.push(row?.into_document()?);
        }
        Ok(documents)
    }

    fn insert(&mut self, document: &Document, fingerprint: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO documents (fingerprint, source, url, title, body, published_at, loaded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                fingerprint,
                self.source,
                document.url,
                document.title,
                document.text,
                document.published.to_rfc3339(),
                document.loaded.to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

impl Intake for SqliteIntake {
    fn submit(&mut self, document: Document) -> Result<(), IntakeError> {
        if let Some(max) = self.max_materials {
            if self.accepted >= max {
                return Err(IntakeError::Finish(format!(
                    "maximum materials reached ({})",
                    max
                )));
            }
        }

        let fingerprint = document.fingerprint();
        if self.contains(&fingerprint)? {
            return Err(IntakeError::Finish(format!(
                "document already seen: {}",
                document.url
            )));
        }

        self.insert(&document, &fingerprint)?;
        self.accepted += 1;
        tracing::debug!("Stored document {} ({})", document.title, document.url);
        Ok(())
    }
}

/// Row values before timestamp decoding
struct RawDocument {
    id: i64,
    url: String,
    title: String,
    body: String,
    published_at: String,
    loaded_at: String,
}

fn raw_document(row: &Row<'_>) -> rusqlite::Result<RawDocument> {
    Ok(RawDocument {
        id: row.get(0)?,
        url: row.get(1)?,
        title: row.get(2)?,
        body: row.get(3)?,
        published_at: row.get(4)?,
        loaded_at: row.get(5)?,
    })
}

impl RawDocument {
    fn into_document(self) -> StorageResult<Document> {
        let published = parse_timestamp(&self.published_at)?;
        let loaded = parse_timestamp(&self.loaded_at)?;

        let mut document = Document::new(&self.title, &self.body, &self.url, published, loaded)
            .map_err(|e| StorageError::Corrupt(format!("document {}: {}", self.id, e)))?;
        document.id = Some(self.id);
        Ok(document)
    }
}

fn parse_timestamp(value: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::Corrupt(format!("timestamp '{}': {}", value, e)))
}
