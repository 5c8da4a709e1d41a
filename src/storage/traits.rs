//! Storage traits and error types

use crate::crawler::PageBatch;
use crate::storage::{RunRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// A pre-existing dataset's column set differs from the item record
    /// shape. Fatal: silently coercing would corrupt historical data.
    #[error("Schema mismatch in items table: expected [{expected}], found [{found}]")]
    SchemaMismatch { expected: String, found: String },

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for the persisted price dataset
///
/// Appends are insert-only: records are never updated or deleted, and
/// re-scraping a category produces new rows. Concurrent writers are not
/// supported; the orchestrator serializes all access.
pub trait PriceStore {
    // ===== Run Management =====

    /// Creates a new crawl run, returning its ID
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Finishes a run with its final status and counters
    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        categories_visited: u64,
        categories_failed: u64,
        records_written: u64,
    ) -> StorageResult<()>;

    // ===== Dataset Appends =====

    /// Appends a page batch's records to the dataset
    ///
    /// The batch is written in one transaction so an interrupted run never
    /// leaves a partially written page. Returns the number of rows appended.
    fn append_batch(&mut self, batch: &PageBatch) -> StorageResult<u64>;

    /// Total number of records in the dataset
    fn count_records(&self) -> StorageResult<u64>;

    /// Number of records stored under the given category
    fn count_records_for_category(&self, category: &str) -> StorageResult<u64>;

    /// Record counts per category, ordered by count descending
    fn category_breakdown(&self) -> StorageResult<Vec<(String, u64)>>;

    // ===== Visited-Set Persistence =====

    /// Loads the persisted visited-set for resume seeding
    fn load_visited(&self) -> StorageResult<Vec<String>>;

    /// Records a category as visited
    fn mark_visited(&mut self, category: &str) -> StorageResult<()>;

    /// Clears the visited-set (fresh crawl)
    fn clear_visited(&mut self) -> StorageResult<()>;
}
