//! Connection management: a read-only pool for audits, a writer for loading captures.

pub mod pool;
pub mod pragmas;
pub mod writer;

use std::path::{Path, PathBuf};

use rusqlite::{Connection, ErrorCode};
use sqlaudit_core::constants::COLLECTOR_COUNT;
use sqlaudit_core::errors::StorageError;

use self::pool::ReadPool;
use crate::migrations::{self, CAPTURE_SCHEMA_VERSION};

/// A capture file opened for auditing. Every connection is read-only.
pub struct CaptureDatabase {
    readers: ReadPool,
    path: PathBuf,
}

impl CaptureDatabase {
    /// Open an existing capture read-only with one connection per collector.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        Self::open_with_pool_size(path, COLLECTOR_COUNT)
    }

    pub fn open_with_pool_size(path: &Path, pool_size: usize) -> Result<Self, StorageError> {
        if !path.is_file() {
            return Err(StorageError::NotFound {
                path: path.display().to_string(),
            });
        }
        let readers = ReadPool::open(path, pool_size)?;

        let version = readers.with_conn(migrations::current_version)?;
        if version > CAPTURE_SCHEMA_VERSION {
            return Err(StorageError::SchemaVersion {
                found: version,
                supported: CAPTURE_SCHEMA_VERSION,
            });
        }
        tracing::debug!(path = %path.display(), version, pool = readers.size(), "opened capture");

        Ok(Self {
            readers,
            path: path.to_path_buf(),
        })
    }

    /// Execute a read with a pooled connection.
    pub fn with_reader<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        self.readers.with_conn(f)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Map a rusqlite error, separating "cannot read the file at all" from
/// ordinary query failures.
pub(crate) fn sqlite_error(e: rusqlite::Error) -> StorageError {
    match e.sqlite_error_code() {
        Some(ErrorCode::CannotOpen | ErrorCode::NotADatabase | ErrorCode::DatabaseCorrupt) => {
            StorageError::Unavailable {
                message: e.to_string(),
            }
        }
        _ => StorageError::SqliteError {
            message: e.to_string(),
        },
    }
}

pub(crate) fn classify_open_error(e: rusqlite::Error) -> StorageError {
    StorageError::Unavailable {
        message: e.to_string(),
    }
}
