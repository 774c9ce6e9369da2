//! Capture store errors.

use super::error_code::{self, AuditErrorCode};

/// Errors raised by the SQLite capture store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("Capture file not found: {path}")]
    NotFound { path: String },

    #[error("Capture file unreadable: {message}")]
    Unavailable { message: String },

    #[error("Capture table missing: {table}")]
    MissingTable { table: String },

    #[error("Migration to version {version} failed: {message}")]
    MigrationFailed { version: u32, message: String },

    #[error("Unsupported capture schema version {found} (expected at most {supported})")]
    SchemaVersion { found: u32, supported: u32 },

    #[error("Invalid capture value in {table}.{column}: {message}")]
    InvalidValue {
        table: String,
        column: String,
        message: String,
    },
}

impl AuditErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MigrationFailed { .. } | Self::SchemaVersion { .. } => {
                error_code::MIGRATION_FAILED
            }
            _ => error_code::STORAGE_ERROR,
        }
    }
}
