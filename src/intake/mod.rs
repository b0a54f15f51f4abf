//! Intake module: where harvested documents go
//!
//! This module handles:
//! - The `Intake` submission trait and its run-ending `Finish` signal
//! - A SQLite store that filters already-seen documents and caps a run
//! - An in-memory collector for dry runs

mod memory;
mod schema;
mod sqlite;
mod traits;

pub use memory::CollectingIntake;
pub use schema::initialize_schema;
pub use sqlite::SqliteIntake;
pub use traits::{Intake, IntakeError, StorageError, StorageResult};
