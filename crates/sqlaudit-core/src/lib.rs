//! sqlaudit-core: shared foundation for the audit engine.
//!
//! Errors, layered configuration, tracing setup, the event system,
//! cooperative cancellation, the `AuditSource` capability trait and the
//! raw row types every collector produces.

pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod tracing;
pub mod traits;
pub mod types;

pub use config::AuditConfig;
pub use errors::{AuditErrorCode, CollectError, ConfigError, RenderError, ScanError, StorageError};
pub use traits::{AuditSource, Cancellable, CancellationToken};
pub use types::{ObjectKey, ObjectName, Phase, SkipReason};
