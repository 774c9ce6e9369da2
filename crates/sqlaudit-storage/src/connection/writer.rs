//! CaptureWriter: creates capture files and loads exported rows.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, Transaction};
use sqlaudit_core::errors::StorageError;

use super::pragmas::apply_write_pragmas;
use super::sqlite_error;
use crate::migrations;

/// Single serialized write connection to a capture file.
pub struct CaptureWriter {
    conn: Mutex<Connection>,
}

impl CaptureWriter {
    /// Create (or open) a capture file and bring its schema up to date.
    pub fn create(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(sqlite_error)?;
        Self::init(conn)
    }

    /// In-memory capture (for testing).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(sqlite_error)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        apply_write_pragmas(&conn)?;
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let guard = self.conn.lock().map_err(|_| StorageError::SqliteError {
            message: "write lock poisoned".to_string(),
        })?;
        f(&guard)
    }

    /// Run `f` inside one transaction; commits only if `f` succeeds.
    pub fn with_transaction<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, StorageError>,
    {
        let mut guard = self.conn.lock().map_err(|_| StorageError::SqliteError {
            message: "write lock poisoned".to_string(),
        })?;
        let tx = guard.transaction().map_err(sqlite_error)?;
        let value = f(&tx)?;
        tx.commit().map_err(sqlite_error)?;
        Ok(value)
    }
}
