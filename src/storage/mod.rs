//! Storage layer for takt
//!
//! SQLite holds imported project snapshots and every generated plan version.

pub mod migrations;
pub mod snapshot;
pub mod sqlite;

pub use snapshot::{ImportSummary, ProjectSnapshot};
pub use sqlite::Database;
