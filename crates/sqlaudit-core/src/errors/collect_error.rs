//! Collector errors.

use super::error_code::{self, AuditErrorCode};
use crate::types::{Phase, SkipReason};

/// Errors a collector can raise while reading from an [`AuditSource`](crate::traits::AuditSource).
///
/// `ConnectionFailure` is always fatal. `AccessDenied` is fatal for the
/// metadata phase only; signal phases report `SignalUnavailable` instead.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("Connection failure: {message}")]
    ConnectionFailure { message: String },

    #[error("Access denied reading {object}: {message}")]
    AccessDenied { object: String, message: String },

    #[error("Signal unavailable for {phase}: {reason} ({detail})")]
    SignalUnavailable {
        phase: Phase,
        reason: SkipReason,
        detail: String,
    },

    #[error("Query failed during {phase}: {message}")]
    Query { phase: Phase, message: String },

    #[error("Collection cancelled")]
    Cancelled,

    #[error("Collection timed out after {after_ms} ms")]
    TimedOut { after_ms: u64 },
}

impl CollectError {
    /// Fatal errors abort the scan regardless of the phase that raised them.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ConnectionFailure { .. })
    }

    /// The skip reason a signal phase reports when this error stops it.
    pub fn skip_reason(&self) -> SkipReason {
        match self {
            Self::AccessDenied { .. } => SkipReason::InsufficientPermission,
            Self::SignalUnavailable { reason, .. } => *reason,
            Self::Cancelled => SkipReason::Cancelled,
            Self::TimedOut { .. } => SkipReason::TimedOut,
            Self::ConnectionFailure { .. } | Self::Query { .. } => SkipReason::SourceError,
        }
    }
}

impl AuditErrorCode for CollectError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ConnectionFailure { .. } => error_code::CONNECTION_FAILURE,
            Self::AccessDenied { .. } => error_code::ACCESS_DENIED,
            Self::SignalUnavailable { .. } => error_code::SIGNAL_UNAVAILABLE,
            Self::Query { .. } => error_code::COLLECTOR_ERROR,
            Self::Cancelled => error_code::CANCELLED,
            Self::TimedOut { .. } => error_code::TIMED_OUT,
        }
    }
}
