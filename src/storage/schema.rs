//! Database schema definitions
//!
//! This module contains the SQL schema for the Pricewalk dataset and the
//! schema verification performed before appending to a pre-existing file.

use crate::storage::StorageError;
use rusqlite::Connection;

/// Columns of the `items` table, in declared order
///
/// These mirror the item record shape exactly; a pre-existing dataset with a
/// different column set is rejected rather than coerced.
pub const ITEM_COLUMNS: [&str; 7] = [
    "id",
    "title",
    "thumbnail",
    "price_per_unit",
    "price_per_measure",
    "scraped_at",
    "category",
];

/// SQL schema for the dataset
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    categories_visited INTEGER NOT NULL DEFAULT 0,
    categories_failed INTEGER NOT NULL DEFAULT 0,
    records_written INTEGER NOT NULL DEFAULT 0
);

-- Scraped price records; append-only, re-scrapes add rows rather than upsert
CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    thumbnail TEXT NOT NULL,
    price_per_unit TEXT NOT NULL,
    price_per_measure TEXT NOT NULL,
    scraped_at TEXT NOT NULL,
    category TEXT
);

CREATE INDEX IF NOT EXISTS idx_items_category ON items(category);
CREATE INDEX IF NOT EXISTS idx_items_scraped_at ON items(scraped_at);

-- Persisted visited-set for resumable runs
CREATE TABLE IF NOT EXISTS visited_categories (
    category TEXT PRIMARY KEY,
    visited_at TEXT NOT NULL
);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// Verifies that a pre-existing `items` table matches the expected columns
///
/// A missing table is fine (it will be created); a table with a different
/// column set fails with `SchemaMismatch` so historical data is never
/// silently coerced.
pub fn verify_items_schema(conn: &Connection) -> Result<(), StorageError> {
    let table_exists: bool = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='items'",
            [],
            |row| row.get::<_, i64>(0),
        )
        .map(|count| count > 0)?;

    if !table_exists {
        return Ok(());
    }

    let mut stmt = conn.prepare("PRAGMA table_info(items)")?;
    let found: Vec<String> = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;

    if found != ITEM_COLUMNS {
        return Err(StorageError::SchemaMismatch {
            expected: ITEM_COLUMNS.join(", "),
            found: found.join(", "),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_initializes() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(initialize_schema(&conn).is_ok());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        assert!(initialize_schema(&conn).is_ok());
    }

    #[test]
    fn test_tables_exist_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        for table in ["runs", "items", "visited_categories"] {
            let count: i64 = conn
                .query_row(
                    &format!(
                        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='{}'",
                        table
                    ),
                    [],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "Table {} should exist", table);
        }
    }

    #[test]
    fn test_verify_accepts_own_schema() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        assert!(verify_items_schema(&conn).is_ok());
    }

    #[test]
    fn test_verify_accepts_missing_table() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(verify_items_schema(&conn).is_ok());
    }

    #[test]
    fn test_verify_rejects_foreign_schema() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE items (id INTEGER PRIMARY KEY, something_else TEXT);")
            .unwrap();

        let result = verify_items_schema(&conn);
        assert!(matches!(result, Err(StorageError::SchemaMismatch { .. })));
    }
}
