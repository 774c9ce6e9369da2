//! sqlaudit-analysis: the audit pipeline.
//!
//! Collectors → Normalizer → Scoring → Deduplicator → Prioritizer → Report.
//! Collection runs concurrently against an [`AuditSource`](sqlaudit_core::AuditSource);
//! every later stage is a single-threaded pure reduction over an immutable
//! [`Snapshot`](normalize::Snapshot).

pub mod collect;
pub mod dedup;
pub mod normalize;
pub mod pipeline;
pub mod prioritize;
pub mod report;
pub mod reporters;
pub mod request;
pub mod scoring;

pub use pipeline::AuditEngine;
pub use report::AuditReport;
pub use request::ScanRequest;
pub use scoring::{Finding, FindingKind, ScoringConfig, Severity};
