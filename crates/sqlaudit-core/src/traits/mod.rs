//! Seams between the engine and its collaborators.

pub mod cancellation;
pub mod source;

pub use cancellation::{Cancellable, CancellationToken};
pub use source::AuditSource;
