//! Intake trait and error types
//!
//! The intake is the host's submission function. The crawler hands every
//! valid document to it exactly once and lets a `Finish` signal travel back
//! up through both listing traversals untouched.

use crate::model::Document;
use thiserror::Error;

/// Errors raised by the storage behind an intake
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors an intake can return for a submitted document
#[derive(Debug, Error)]
pub enum IntakeError {
    /// The host wants the whole run to stop
    #[error("Intake finished the run: {0}")]
    Finish(String),

    /// The document was refused but the run may continue
    #[error("Document rejected: {0}")]
    Rejected(String),

    #[error("Intake storage error: {0}")]
    Storage(#[from] StorageError),
}

impl IntakeError {
    /// Returns true if this error must end the run
    pub fn is_finish(&self) -> bool {
        matches!(self, Self::Finish(_))
    }
}

/// Trait for the host submission function
pub trait Intake {
    /// Takes ownership of a document
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Document accepted
    /// * `Err(IntakeError::Finish)` - Run must stop (already seen, ceiling reached)
    /// * `Err(_)` - Document not accepted; the crawler moves on
    fn submit(&mut self, document: Document) -> Result<(), IntakeError>;
}

impl<I: Intake + ?Sized> Intake for &mut I {
    fn submit(&mut self, document: Document) -> Result<(), IntakeError> {
        (**self).submit(document)
    }
}
