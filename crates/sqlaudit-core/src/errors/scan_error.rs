//! Top-level scan errors.

use super::error_code::{self, AuditErrorCode};
use super::{CollectError, ConfigError, StorageError};

/// Fatal errors that abort a scan with no partial report.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Collection error: {0}")]
    Collect(#[from] CollectError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Scan cancelled")]
    Cancelled,

    #[error("Scan timed out after {after_ms} ms")]
    TimedOut { after_ms: u64 },

    #[error("Collector worker failed: {message}")]
    Worker { message: String },
}

impl AuditErrorCode for ScanError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Collect(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            Self::Cancelled => error_code::CANCELLED,
            Self::TimedOut { .. } => error_code::TIMED_OUT,
            Self::Worker { .. } => error_code::WORKER_ERROR,
        }
    }
}
