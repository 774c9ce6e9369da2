//! Error handling for sqlaudit.
//! One error enum per subsystem, `thiserror` only.

pub mod collect_error;
pub mod config_error;
pub mod error_code;
pub mod render_error;
pub mod scan_error;
pub mod storage_error;

pub use collect_error::CollectError;
pub use config_error::ConfigError;
pub use error_code::AuditErrorCode;
pub use render_error::RenderError;
pub use scan_error::ScanError;
pub use storage_error::StorageError;
