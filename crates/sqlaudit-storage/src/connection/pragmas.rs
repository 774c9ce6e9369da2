//! PRAGMA configuration for capture connections.
//!
//! Capture files use a rollback journal so they stay a single portable
//! file; readers are `query_only`.

use rusqlite::Connection;
use sqlaudit_core::errors::StorageError;

/// Pragmas for the connection that creates and loads a capture.
pub fn apply_write_pragmas(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = DELETE;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = OFF;
        PRAGMA busy_timeout = 5000;
        PRAGMA temp_store = MEMORY;
        ",
    )
    .map_err(|e| StorageError::SqliteError {
        message: format!("failed to apply write pragmas: {e}"),
    })
}

/// Pragmas for read connections. `query_only` rejects any write.
pub fn apply_read_pragmas(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "
        PRAGMA query_only = ON;
        PRAGMA cache_size = -16000;
        PRAGMA busy_timeout = 5000;
        PRAGMA temp_store = MEMORY;
        ",
    )
    .map_err(|e| StorageError::SqliteError {
        message: format!("failed to apply read pragmas: {e}"),
    })
}

/// Whether `query_only` is active on the connection.
pub fn is_query_only(conn: &Connection) -> Result<bool, StorageError> {
    let on: i64 = conn
        .pragma_query_value(None, "query_only", |row| row.get(0))
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;
    Ok(on == 1)
}
