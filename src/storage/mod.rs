//! Storage module for the persisted price dataset
//!
//! This module handles all database operations, including:
//! - SQLite dataset initialization and schema verification
//! - Append-only persistence of scraped page batches
//! - Visited-set persistence for resumable runs
//! - Run bookkeeping

mod schema;
mod sqlite;
mod traits;

pub use schema::{initialize_schema, verify_items_schema, ITEM_COLUMNS};
pub use sqlite::SqliteStore;
pub use traits::{PriceStore, StorageError, StorageResult};

/// Represents one crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub categories_visited: u64,
    pub categories_failed: u64,
    pub records_written: u64,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Interrupted,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "interrupted" => Some(Self::Interrupted),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
