//! Storage module for recorded simulation runs.
//!
//! This module provides SQLite-based persistence of landscapes and
//! population snapshots produced by an external simulator, so that analyses
//! can replay a run after the fact.

mod database;
mod query;
mod recorder;
pub mod types;

pub use database::{Database, DatabaseStats};
pub use query::QueryBuilder;
pub use recorder::{Recorder, RecorderStats};
pub use types::{IndividualSnapshot, RecordingStrategy, RunMetadata};
