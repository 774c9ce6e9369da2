//! Structured span and event field names.
//!
//! Shared so log queries can rely on one spelling per measurement.

/// Phase being collected (`metadata`, `index-usage`, ...).
pub const PHASE: &str = "phase";

/// Rows returned by a collector.
pub const ROWS_COLLECTED: &str = "rows_collected";

/// Collector wall time in milliseconds.
pub const COLLECT_DURATION_MS: &str = "collect_duration_ms";

/// Rows dropped by the normalizer because their object vanished.
pub const ROWS_DISCARDED: &str = "rows_discarded";

/// Findings produced by the scoring engine before deduplication.
pub const FINDINGS_SCORED: &str = "findings_scored";

/// Findings collapsed or dropped by the deduplicator.
pub const FINDINGS_DEDUPLICATED: &str = "findings_deduplicated";

/// Findings withheld because they failed rendering.
pub const FINDINGS_WITHHELD: &str = "findings_withheld";

/// Total scan wall time in milliseconds.
pub const SCAN_DURATION_MS: &str = "scan_duration_ms";
