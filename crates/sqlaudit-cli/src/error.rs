//! CLI errors.

use sqlaudit_core::errors::error_code;
use sqlaudit_core::{AuditErrorCode, CollectError, ConfigError, ScanError, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("No capture file given (use --capture or set source.capture_path)")]
    MissingCapture,

    #[error("Table not found in capture: {table}")]
    TableNotFound { table: String },

    #[error("Invalid table name: {table}")]
    InvalidTableName { table: String },

    #[error("Unknown report format: {format}")]
    UnknownFormat { format: String },

    #[error("Report rendering failed: {message}")]
    Render { message: String },

    #[error("Cannot write {path}: {message}")]
    Io { path: String, message: String },
}

impl From<CollectError> for CliError {
    fn from(e: CollectError) -> Self {
        Self::Scan(ScanError::Collect(e))
    }
}

impl AuditErrorCode for CliError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Scan(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            Self::MissingCapture | Self::InvalidTableName { .. } | Self::UnknownFormat { .. } => {
                error_code::CONFIG_ERROR
            }
            Self::TableNotFound { .. } => error_code::STORAGE_ERROR,
            Self::Render { .. } => error_code::RENDER_ERROR,
            Self::Io { .. } => error_code::STORAGE_ERROR,
        }
    }
}
