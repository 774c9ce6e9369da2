//! Canonical entities and the immutable snapshot they live in.
//!
//! Entities are stored in per-kind arenas and referenced by typed ids.
//! Findings carry ids, never pointers, so the snapshot stays the single
//! owner of everything a scan observed.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use sqlaudit_core::{ObjectKey, ObjectName};

use crate::report::{Caveat, PhaseReport};

macro_rules! arena_id {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
            pub struct $name(pub u32);

            impl $name {
                pub fn index(self) -> usize {
                    self.0 as usize
                }

                pub(crate) fn from_len(len: usize) -> Self {
                    Self(u32::try_from(len).unwrap_or(u32::MAX))
                }
            }
        )*
    };
}

arena_id!(
    TableId,
    IndexId,
    UsageId,
    PhysicalId,
    StatsId,
    MissingId,
    QueryStatId,
    WaitId,
);

/// Column lists are short; four inline slots cover nearly every index.
pub type ColumnList = SmallVec<[String; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    Heap,
    Clustered,
    Columnstore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub is_primary_key: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditColumnFlags {
    pub has_created: bool,
    pub has_modified: bool,
}

impl AuditColumnFlags {
    pub fn complete(&self) -> bool {
        self.has_created && self.has_modified
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub id: TableId,
    pub name: ObjectName,
    pub row_count: u64,
    pub size_bytes: u64,
    pub storage: StorageType,
    pub columns: Vec<ColumnDescriptor>,
    pub audit_columns: AuditColumnFlags,
    pub has_primary_key: bool,
    pub trigger_count: u32,
    pub is_staging: bool,
    pub indexes: Vec<IndexId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    Clustered,
    Nonclustered,
    ClusteredColumnstore,
    NonclusteredColumnstore,
    /// XML, spatial, full-text and anything else the catalog reports.
    Other,
}

impl IndexKind {
    /// `None` for heap rows, which describe the table rather than an index.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace('_', " ");
        let kind = match normalized.as_str() {
            "heap" => return None,
            "clustered" => Self::Clustered,
            "nonclustered" => Self::Nonclustered,
            "clustered columnstore" => Self::ClusteredColumnstore,
            "nonclustered columnstore" => Self::NonclusteredColumnstore,
            _ => Self::Other,
        };
        Some(kind)
    }

    pub fn is_clustered(&self) -> bool {
        matches!(self, Self::Clustered | Self::ClusteredColumnstore)
    }

    pub fn is_columnstore(&self) -> bool {
        matches!(self, Self::ClusteredColumnstore | Self::NonclusteredColumnstore)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    pub id: IndexId,
    pub table: TableId,
    pub name: String,
    pub kind: IndexKind,
    pub key_columns: ColumnList,
    pub included_columns: ColumnList,
    pub is_unique: bool,
    pub is_primary_key: bool,
    pub is_unique_constraint: bool,
    pub usage: Option<UsageId>,
    pub physical: Option<PhysicalId>,
}

impl IndexDescriptor {
    /// Indexes that are never drop candidates: dropping them changes
    /// constraints or the table's physical layout.
    pub fn is_protected(&self) -> bool {
        self.is_primary_key
            || self.is_unique_constraint
            || self.kind.is_clustered()
            || self.kind.is_columnstore()
            || self.kind == IndexKind::Other
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexUsageStat {
    pub id: UsageId,
    pub index: IndexId,
    /// Seeks + scans + lookups.
    pub reads: u64,
    pub writes: u64,
    pub window_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexPhysicalStat {
    pub id: PhysicalId,
    pub index: IndexId,
    pub fragmentation_percent: f64,
    pub page_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsDescriptor {
    pub id: StatsId,
    pub table: TableId,
    pub name: String,
    pub rows: u64,
    pub modification_counter: u64,
    pub last_updated: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingIndexCandidate {
    pub id: MissingId,
    pub table: TableId,
    pub equality_columns: ColumnList,
    pub inequality_columns: ColumnList,
    pub included_columns: ColumnList,
    pub avg_impact_percent: f64,
    /// Seeks + scans that would have used the index.
    pub query_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryOrigin {
    PlanCache,
    QueryStore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryStat {
    pub id: QueryStatId,
    pub query_id: String,
    pub avg_cpu_ms: f64,
    pub avg_logical_reads: f64,
    pub avg_duration_ms: f64,
    pub execution_count: u64,
    pub query_text: Option<String>,
    pub plan_ref: Option<String>,
    pub origin: QueryOrigin,
}

impl QueryStat {
    pub fn total_cpu_ms(&self) -> f64 {
        self.avg_cpu_ms * self.execution_count as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitStat {
    pub id: WaitId,
    pub wait_type: String,
    pub wait_time_ms: u64,
    pub signal_wait_time_ms: u64,
    pub waiting_tasks_count: u64,
}

/// Everything one scan observed, resolved and immutable.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub source: String,
    pub scanned_at: i64,
    pub tables: Vec<TableDescriptor>,
    pub indexes: Vec<IndexDescriptor>,
    pub usage: Vec<IndexUsageStat>,
    pub physical: Vec<IndexPhysicalStat>,
    pub statistics: Vec<StatisticsDescriptor>,
    pub missing: Vec<MissingIndexCandidate>,
    pub queries: Vec<QueryStat>,
    pub waits: Vec<WaitStat>,
    pub phases: Vec<PhaseReport>,
    pub caveats: Vec<Caveat>,
    pub(crate) table_lookup: FxHashMap<ObjectKey, TableId>,
    pub(crate) index_lookup: FxHashMap<(TableId, String), IndexId>,
}

impl Snapshot {
    pub fn table(&self, id: TableId) -> &TableDescriptor {
        &self.tables[id.index()]
    }

    pub fn index(&self, id: IndexId) -> &IndexDescriptor {
        &self.indexes[id.index()]
    }

    pub fn usage_of(&self, id: IndexId) -> Option<&IndexUsageStat> {
        self.index(id).usage.map(|u| &self.usage[u.index()])
    }

    pub fn physical_of(&self, id: IndexId) -> Option<&IndexPhysicalStat> {
        self.index(id).physical.map(|p| &self.physical[p.index()])
    }

    /// Case-insensitive table lookup.
    pub fn find_table(&self, name: &ObjectName) -> Option<TableId> {
        self.table_lookup.get(&name.key()).copied()
    }

    /// Case-insensitive index lookup within one table.
    pub fn find_index(&self, table: TableId, name: &str) -> Option<IndexId> {
        self.index_lookup
            .get(&(table, name.to_lowercase()))
            .copied()
    }

    pub fn indexes_of(&self, table: TableId) -> impl Iterator<Item = &IndexDescriptor> {
        self.table(table).indexes.iter().map(|id| self.index(*id))
    }

    /// Display name of an index: `schema.table.index`.
    pub fn index_subject(&self, id: IndexId) -> String {
        let index = self.index(id);
        format!("{}.{}", self.table(index.table).name, index.name)
    }

    pub fn total_size_bytes(&self) -> u64 {
        self.tables
            .iter()
            .fold(0u64, |acc, t| acc.saturating_add(t.size_bytes))
    }
}
