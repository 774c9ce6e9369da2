//! AuditErrorCode trait: stable machine-readable codes for every error enum.

/// Every error enum implements this to expose a stable code string that
/// callers (the CLI exit path, JSON consumers) can match on.
pub trait AuditErrorCode {
    /// Returns the error code string (e.g., "ACCESS_DENIED").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const CONNECTION_FAILURE: &str = "CONNECTION_FAILURE";
pub const ACCESS_DENIED: &str = "ACCESS_DENIED";
pub const SIGNAL_UNAVAILABLE: &str = "SIGNAL_UNAVAILABLE";
pub const COLLECTOR_ERROR: &str = "COLLECTOR_ERROR";
pub const CANCELLED: &str = "CANCELLED";
pub const TIMED_OUT: &str = "TIMED_OUT";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
pub const RENDER_ERROR: &str = "RENDER_ERROR";
pub const WORKER_ERROR: &str = "WORKER_ERROR";
