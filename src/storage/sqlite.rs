//! SQLite storage implementation

use crate::crawler::PageBatch;
use crate::storage::schema::{initialize_schema, verify_items_schema};
use crate::storage::traits::{PriceStore, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite dataset backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates the dataset at the given path
    ///
    /// A pre-existing `items` table is verified against the expected column
    /// set before anything is written; a mismatch fails with
    /// [`StorageError::SchemaMismatch`].
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        verify_items_schema(&conn)?;
        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory dataset (for testing)
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl PriceStore for SqliteStore {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, started_at, finished_at, config_hash, status,
             categories_visited, categories_failed, records_written
             FROM runs ORDER BY id DESC LIMIT 1",
        )?;

        let run = stmt
            .query_row([], |row| {
                let status_str: String = row.get(4)?;
                let status = RunStatus::from_db_string(&status_str).ok_or_else(|| {
                    // A status outside the known set means the row is corrupt
                    rusqlite::Error::FromSqlConversionFailure(
                        4,
                        rusqlite::types::Type::Text,
                        format!("unknown run status '{}'", status_str).into(),
                    )
                })?;
                Ok(RunRecord {
                    id: row.get(0)?,
                    started_at: row.get(1)?,
                    finished_at: row.get(2)?,
                    config_hash: row.get(3)?,
                    status,
                    categories_visited: row.get(5)?,
                    categories_failed: row.get(6)?,
                    records_written: row.get(7)?,
                })
            })
            .optional()?;

        Ok(run)
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        categories_visited: u64,
        categories_failed: u64,
        records_written: u64,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2,
             categories_visited = ?3, categories_failed = ?4, records_written = ?5
             WHERE id = ?6",
            params![
                status.to_db_string(),
                now,
                categories_visited,
                categories_failed,
                records_written,
                run_id
            ],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Dataset Appends =====

    fn append_batch(&mut self, batch: &PageBatch) -> StorageResult<u64> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO items (title, thumbnail, price_per_unit, price_per_measure,
                 scraped_at, category) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for record in &batch.records {
                stmt.execute(params![
                    record.title,
                    record.thumbnail,
                    record.price_per_unit,
                    record.price_per_measure,
                    record.scraped_at,
                    record.category,
                ])?;
            }
        }
        tx.commit()?;
        Ok(batch.records.len() as u64)
    }

    fn count_records(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_records_for_category(&self, category: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM items WHERE category = ?1",
            params![category],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn category_breakdown(&self) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT COALESCE(category, '(uncategorized)') AS cat, COUNT(*)
             FROM items GROUP BY cat ORDER BY COUNT(*) DESC, cat ASC",
        )?;

        let breakdown = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(breakdown)
    }

    // ===== Visited-Set Persistence =====

    fn load_visited(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT category FROM visited_categories ORDER BY visited_at ASC")?;

        let visited = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(visited)
    }

    fn mark_visited(&mut self, category: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO visited_categories (category, visited_at) VALUES (?1, ?2)
             ON CONFLICT(category) DO UPDATE SET visited_at = ?2",
            params![category, now],
        )?;
        Ok(())
    }

    fn clear_visited(&mut self) -> StorageResult<()> {
        self.conn.execute("DELETE FROM visited_categories", [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::ItemRecord;

    fn record(title: &str, category: &str) -> ItemRecord {
        ItemRecord {
            title: title.to_string(),
            thumbnail: String::new(),
            price_per_unit: "£1.50".to_string(),
            price_per_measure: "£3.00/kg".to_string(),
            scraped_at: "2024-01-01T00:00:00+00:00".to_string(),
            category: Some(category.to_string()),
        }
    }

    fn batch(records: Vec<ItemRecord>) -> PageBatch {
        PageBatch {
            records,
            failures: vec![],
        }
    }

    #[test]
    fn test_append_and_count() {
        let mut store = SqliteStore::new_in_memory().unwrap();

        let appended = store
            .append_batch(&batch(vec![
                record("Apples 6 pack", "Apples"),
                record("Bramley Apples", "Apples"),
            ]))
            .unwrap();

        assert_eq!(appended, 2);
        assert_eq!(store.count_records().unwrap(), 2);
        assert_eq!(store.count_records_for_category("Apples").unwrap(), 2);
        assert_eq!(store.count_records_for_category("Pears").unwrap(), 0);
    }

    #[test]
    fn test_append_never_overwrites() {
        let mut store = SqliteStore::new_in_memory().unwrap();

        store
            .append_batch(&batch(vec![record("First", "Apples")]))
            .unwrap();
        store
            .append_batch(&batch(vec![record("Second", "Apples")]))
            .unwrap();
        // Re-scraping the same title appends a new row, never upserts
        store
            .append_batch(&batch(vec![record("First", "Apples")]))
            .unwrap();

        assert_eq!(store.count_records().unwrap(), 3);
    }

    #[test]
    fn test_empty_batch_appends_nothing() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        let appended = store.append_batch(&batch(vec![])).unwrap();
        assert_eq!(appended, 0);
        assert_eq!(store.count_records().unwrap(), 0);
    }

    #[test]
    fn test_category_breakdown() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        store
            .append_batch(&batch(vec![
                record("A", "Apples"),
                record("B", "Apples"),
                record("C", "Beef"),
            ]))
            .unwrap();

        let breakdown = store.category_breakdown().unwrap();
        assert_eq!(breakdown[0], ("Apples".to_string(), 2));
        assert_eq!(breakdown[1], ("Beef".to_string(), 1));
    }

    #[test]
    fn test_visited_set_roundtrip() {
        let mut store = SqliteStore::new_in_memory().unwrap();

        store.mark_visited("Apples").unwrap();
        store.mark_visited("Pears").unwrap();
        // Marking twice is fine
        store.mark_visited("Apples").unwrap();

        let visited = store.load_visited().unwrap();
        assert_eq!(visited.len(), 2);
        assert!(visited.contains(&"Apples".to_string()));
        assert!(visited.contains(&"Pears".to_string()));

        store.clear_visited().unwrap();
        assert!(store.load_visited().unwrap().is_empty());
    }

    #[test]
    fn test_run_lifecycle() {
        let mut store = SqliteStore::new_in_memory().unwrap();

        let run_id = store.create_run("abc123").unwrap();
        let latest = store.get_latest_run().unwrap().unwrap();
        assert_eq!(latest.id, run_id);
        assert_eq!(latest.status, RunStatus::Running);
        assert_eq!(latest.config_hash, "abc123");
        assert!(latest.finished_at.is_none());

        store
            .finish_run(run_id, RunStatus::Completed, 3, 1, 420)
            .unwrap();
        let finished = store.get_latest_run().unwrap().unwrap();
        assert_eq!(finished.status, RunStatus::Completed);
        assert_eq!(finished.categories_visited, 3);
        assert_eq!(finished.categories_failed, 1);
        assert_eq!(finished.records_written, 420);
        assert!(finished.finished_at.is_some());
    }

    #[test]
    fn test_unrecognized_run_status_is_an_error() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        store.create_run("abc123").unwrap();
        store
            .conn
            .execute("UPDATE runs SET status = 'bogus'", [])
            .unwrap();

        assert!(store.get_latest_run().is_err());
    }

    #[test]
    fn test_finish_unknown_run_fails() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        let result = store.finish_run(999, RunStatus::Completed, 0, 0, 0);
        assert!(matches!(result, Err(StorageError::RunNotFound(999))));
    }

    #[test]
    fn test_schema_mismatch_on_foreign_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foreign.db");

        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch("CREATE TABLE items (id INTEGER PRIMARY KEY, payload BLOB);")
                .unwrap();
        }

        let result = SqliteStore::new(&path);
        assert!(matches!(
            result,
            Err(StorageError::SchemaMismatch { .. })
        ));
    }
}
