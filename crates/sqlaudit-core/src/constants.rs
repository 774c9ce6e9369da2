//! Shared constants for the audit engine.

/// sqlaudit version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ---- Scan ----

/// Number of collector types (metadata + four signal collectors).
pub const COLLECTOR_COUNT: usize = 5;

/// Default collector concurrency: one worker per collector type.
pub const DEFAULT_CONCURRENCY: usize = COLLECTOR_COUNT;

/// Default scan timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Poll interval used while waiting on collectors, in milliseconds.
pub const COLLECTOR_POLL_INTERVAL_MS: u64 = 50;

// ---- Unused indexes ----

/// Writes above this count on a never-read index make it an unused-index candidate.
pub const DEFAULT_UNUSED_WRITE_THRESHOLD: u64 = 100;

/// Multiplier over the write threshold at which an unused index becomes Critical.
pub const DEFAULT_UNUSED_CRITICAL_MULTIPLIER: u64 = 10;

// ---- Missing indexes ----

/// Maximum missing-index recommendations kept per table.
pub const DEFAULT_MISSING_INDEX_PER_TABLE_CAP: usize = 5;

/// Minimum average impact percent for a missing-index candidate.
pub const DEFAULT_MISSING_INDEX_MIN_IMPACT: f64 = 0.0;

/// Impact percent at or above which a candidate can be Critical.
pub const DEFAULT_MISSING_INDEX_CRITICAL_IMPACT: f64 = 80.0;

/// Query count at or above which a high-impact candidate is Critical.
pub const DEFAULT_MISSING_INDEX_CRITICAL_QUERY_COUNT: u64 = 500;

/// Impact percent at or above which a candidate is Important.
pub const DEFAULT_MISSING_INDEX_IMPORTANT_IMPACT: f64 = 50.0;

// ---- Query hotspots ----

/// Number of top CPU consumers reported as hotspots.
pub const DEFAULT_QUERY_HOTSPOT_TOP_N: usize = 20;

/// Average duration (ms) above which a hotspot is Critical.
pub const DEFAULT_HIGH_LATENCY_MS: f64 = 1000.0;

// ---- Waits ----

/// Number of wait categories scored after exclusion filtering.
pub const DEFAULT_WAIT_TOP_N: usize = 10;

/// Cumulative wait time (ms) at which a mapped wait is Critical.
pub const DEFAULT_WAIT_CRITICAL_MS: u64 = 60_000;

/// Cumulative wait time (ms) at which a mapped wait is Important.
pub const DEFAULT_WAIT_IMPORTANT_MS: u64 = 10_000;

// ---- Design ----

/// Column count above which a table is considered wide.
pub const DEFAULT_WIDE_TABLE_COLUMNS: usize = 50;

/// Schemas whose tables are treated as staging tables.
pub const DEFAULT_STAGING_SCHEMAS: [&str; 3] = ["staging", "stg", "etl"];

/// Table name prefixes treated as staging tables.
pub const DEFAULT_STAGING_PREFIXES: [&str; 4] = ["stg_", "staging_", "tmp_", "load_"];

/// Column names accepted as a "created" audit column, compared lowercase with
/// underscores removed.
pub const DEFAULT_AUDIT_CREATED_COLUMNS: [&str; 6] = [
    "createdat",
    "createddate",
    "createdon",
    "datecreated",
    "insertedat",
    "insertdate",
];

/// Column names accepted as a "modified" audit column.
pub const DEFAULT_AUDIT_MODIFIED_COLUMNS: [&str; 8] = [
    "modifiedat",
    "modifieddate",
    "modifiedon",
    "updatedat",
    "updateddate",
    "lastmodified",
    "datemodified",
    "lastupdated",
];

/// Deprecated large-object column types.
pub const DEFAULT_DEPRECATED_TYPES: [&str; 3] = ["text", "ntext", "image"];

// ---- Fragmentation & statistics ----

/// Fragmentation percent at or above which an index should be rebuilt.
pub const DEFAULT_FRAGMENTATION_REBUILD_PERCENT: f64 = 30.0;

/// Fragmentation percent at or above which an index should be reorganized.
pub const DEFAULT_FRAGMENTATION_REORGANIZE_PERCENT: f64 = 5.0;

/// Indexes smaller than this page count are never reported as fragmented.
pub const DEFAULT_FRAGMENTATION_MIN_PAGES: u64 = 1000;

/// Modification ratio (modifications / rows) above which statistics are stale.
pub const DEFAULT_STALE_STATISTICS_RATIO: f64 = 0.20;

// ---- Report ----

/// Default report format.
pub const DEFAULT_REPORT_FORMAT: &str = "console";

/// Report formats understood by the reporters.
pub const REPORT_FORMATS: [&str; 3] = ["json", "console", "markdown"];

/// Schemas never audited.
pub const SYSTEM_SCHEMAS: [&str; 3] = ["sys", "information_schema", "guest"];

/// Schema assumed for single-part object names.
pub const DEFAULT_SCHEMA: &str = "dbo";
