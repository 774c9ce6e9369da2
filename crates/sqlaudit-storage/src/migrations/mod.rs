//! Capture schema migrations using PRAGMA user_version.

pub mod v001_capture_schema;

use rusqlite::Connection;
use sqlaudit_core::errors::StorageError;

/// Newest capture schema this build understands.
pub const CAPTURE_SCHEMA_VERSION: u32 = 1;

/// Catalog tables. Missing any of these means metadata is unreadable.
pub const CATALOG_TABLES: [&str; 5] = ["tables", "columns", "indexes", "index_columns", "statistics"];

/// Run all pending migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), StorageError> {
    let current = current_version(conn)?;

    let migrations: &[(&str, u32)] = &[(v001_capture_schema::MIGRATION_SQL, 1)];

    for (sql, version) in migrations {
        if current < *version {
            conn.execute_batch(sql)
                .map_err(|e| StorageError::MigrationFailed {
                    version: *version,
                    message: e.to_string(),
                })?;
            conn.pragma_update(None, "user_version", version)
                .map_err(|e| StorageError::MigrationFailed {
                    version: *version,
                    message: e.to_string(),
                })?;
            tracing::info!(version = version, "applied capture migration");
        }
    }

    Ok(())
}

/// Current capture schema version. Exporters that skip versioning report 0.
pub fn current_version(conn: &Connection) -> Result<u32, StorageError> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })
}

/// Whether `table` exists in the capture.
pub fn table_exists(conn: &Connection, table: &str) -> Result<bool, StorageError> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |row| row.get(0),
        )
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;
    Ok(count > 0)
}

/// Fail with `MissingTable` unless `table` exists.
pub fn require_table(conn: &Connection, table: &str) -> Result<(), StorageError> {
    if table_exists(conn, table)? {
        Ok(())
    } else {
        Err(StorageError::MissingTable {
            table: table.to_string(),
        })
    }
}
