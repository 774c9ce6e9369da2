//! Raw collector rows, shaped after the catalog and dynamic views they mirror.
//!
//! These are deliberately flat and stringly-named: identifier resolution and
//! joining happens in the normalizer, not at collection time.

use serde::{Deserialize, Serialize};

/// One user table (`sys.tables` joined with partition and space statistics).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub schema: String,
    pub table: String,
    pub row_count: u64,
    pub size_bytes: u64,
    /// `heap`, `clustered` or `columnstore`.
    pub storage: String,
    pub has_primary_key: bool,
    pub trigger_count: u32,
}

/// One column (`INFORMATION_SCHEMA.COLUMNS`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnRow {
    pub schema: String,
    pub table: String,
    pub column: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub ordinal: u32,
    pub is_primary_key: bool,
}

/// One index (`sys.indexes`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexRow {
    pub schema: String,
    pub table: String,
    pub index_name: String,
    /// `clustered`, `nonclustered`, `clustered columnstore`, `nonclustered columnstore`.
    pub index_type: String,
    pub is_unique: bool,
    pub is_primary_key: bool,
    pub is_unique_constraint: bool,
}

/// One index column (`sys.index_columns`). Included columns carry `key_ordinal = 0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexColumnRow {
    pub schema: String,
    pub table: String,
    pub index_name: String,
    pub column: String,
    pub key_ordinal: u32,
    pub is_included: bool,
}

/// One statistics object (`sys.stats` + `sys.dm_db_stats_properties`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsRow {
    pub schema: String,
    pub table: String,
    pub stats_name: String,
    pub rows: u64,
    pub modification_counter: u64,
    /// Unix seconds of the last statistics update, if ever updated.
    pub last_updated: Option<i64>,
}

/// Everything the metadata collector reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogRows {
    pub tables: Vec<TableRow>,
    pub columns: Vec<ColumnRow>,
    pub indexes: Vec<IndexRow>,
    pub index_columns: Vec<IndexColumnRow>,
    pub statistics: Vec<StatisticsRow>,
}

impl CatalogRows {
    pub fn row_count(&self) -> usize {
        self.tables.len()
            + self.columns.len()
            + self.indexes.len()
            + self.index_columns.len()
            + self.statistics.len()
    }
}

/// One index usage row (`sys.dm_db_index_usage_stats`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexUsageRow {
    pub schema: String,
    pub table: String,
    pub index_name: String,
    pub user_seeks: u64,
    pub user_scans: u64,
    pub user_lookups: u64,
    pub user_updates: u64,
}

/// One physical stats row (`sys.dm_db_index_physical_stats`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexPhysicalRow {
    pub schema: String,
    pub table: String,
    pub index_name: String,
    pub avg_fragmentation_percent: f64,
    pub page_count: u64,
}

/// Everything the index-usage collector reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexUsageRows {
    /// Seconds of telemetry accumulation (time since the server started).
    pub window_secs: Option<u64>,
    pub usage: Vec<IndexUsageRow>,
    pub physical: Vec<IndexPhysicalRow>,
}

/// One missing-index suggestion (`sys.dm_db_missing_index_details` + group stats).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissingIndexRow {
    /// Multi-part object name, e.g. `[Sales].[dbo].[Orders]`.
    pub statement: String,
    pub equality_columns: Option<String>,
    pub inequality_columns: Option<String>,
    pub included_columns: Option<String>,
    pub avg_user_impact: f64,
    pub user_seeks: u64,
    pub user_scans: u64,
}

/// One cached query plan aggregate (`sys.dm_exec_query_stats` or the query store).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryStatRow {
    pub query_id: String,
    pub avg_cpu_ms: f64,
    pub avg_logical_reads: f64,
    pub avg_duration_ms: f64,
    pub execution_count: u64,
    pub query_text: Option<String>,
    pub plan_ref: Option<String>,
}

/// One wait category (`sys.dm_os_wait_stats`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaitStatRow {
    pub wait_type: String,
    pub wait_time_ms: u64,
    pub signal_wait_time_ms: u64,
    pub waiting_tasks_count: u64,
}
