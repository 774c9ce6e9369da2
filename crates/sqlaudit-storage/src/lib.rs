//! sqlaudit-storage: the SQLite capture store.
//!
//! A capture file is a point-in-time export of an audited server's catalog
//! and dynamic views. [`CaptureSource`] reads it through a read-only
//! connection pool and implements [`AuditSource`](sqlaudit_core::AuditSource).
//! [`CaptureWriter`] creates capture files and loads rows into them.

pub mod connection;
pub mod migrations;
pub mod queries;
pub mod source;

pub use connection::writer::CaptureWriter;
pub use connection::CaptureDatabase;
pub use source::CaptureSource;
