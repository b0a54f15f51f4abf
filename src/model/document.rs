/// Document record produced for every successfully extracted item page
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Reasons a page's extracted fields cannot form a document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("document title is empty")]
    EmptyTitle,

    #[error("document body is empty")]
    EmptyText,

    #[error("document url is empty")]
    EmptyUrl,
}

/// A harvested article, handed to the host exactly once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Host-assigned identifier (never set by the crawler)
    pub id: Option<i64>,

    pub title: String,

    /// Reserved by the host schema
    pub abstract_text: Option<String>,

    /// Body text of the article
    pub text: String,

    /// Source URL of the item page
    pub url: String,

    /// Reserved by the host schema
    pub authors: Vec<String>,

    /// Publish timestamp
    pub published: DateTime<Utc>,

    /// Time the document was extracted
    pub loaded: DateTime<Utc>,
}

impl Document {
    /// Builds a document from extracted fields
    ///
    /// Title, text and url are trimmed; any of them ending up empty
    /// is rejected so that half-extracted pages never reach the host.
    pub fn new(
        title: &str,
        text: &str,
        url: &str,
        published: DateTime<Utc>,
        loaded: DateTime<Utc>,
    ) -> Result<Self, DocumentError> {
        let title = title.trim();
        let text = text.trim();
        let url = url.trim();

        if title.is_empty() {
            return Err(DocumentError::EmptyTitle);
        }
        if text.is_empty() {
            return Err(DocumentError::EmptyText);
        }
        if url.is_empty() {
            return Err(DocumentError::EmptyUrl);
        }

        Ok(Self {
            id: None,
            title: title.to_string(),
            abstract_text: None,
            text: text.to_string(),
            url: url.to_string(),
            authors: Vec::new(),
            published,
            loaded,
        })
    }

    /// Hex SHA-256 of the source URL, used for deduplication
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.url.as_bytes());
        hex::encode(hasher.finalize())
    }
}
