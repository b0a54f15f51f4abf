//! In-memory intake
//!
//! Collects documents without persisting them, for dry runs.

use crate::intake::traits::{Intake, IntakeError};
use crate::model::Document;
use std::collections::HashSet;

/// Intake that keeps submitted documents in a vector
#[derive(Debug, Default)]
pub struct CollectingIntake {
    documents: Vec<Document>,
    seen: HashSet<String>,
    limit: Option<usize>,
}

impl CollectingIntake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finishes the run once `limit` documents were collected
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn into_documents(self) -> Vec<Document> {
        self.documents
    }
}

impl Intake for CollectingIntake {
    fn submit(&mut self, document: Document) -> Result<(), IntakeError> {
        if let Some(limit) = self.limit {
            if self.documents.len() >= limit {
                return Err(IntakeError::Finish(format!(
                    "maximum materials reached ({})",
                    limit
                )));
            }
        }

        if !self.seen.insert(document.url.clone()) {
            return Err(IntakeError::Finish(format!(
                "document already seen: {}",
                document.url
            )));
        }

        self.documents.push(document);
        Ok(())
    }
}
