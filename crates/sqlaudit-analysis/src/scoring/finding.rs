//! Finding types.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::normalize::{
    ColumnList, IndexId, MissingId, PhysicalId, QueryStatId, StatsId, TableId, UsageId, WaitId,
};

/// Priority bucket. Declaration order is severity order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Important,
    Advisory,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::Important => write!(f, "important"),
            Self::Advisory => write!(f, "advisory"),
        }
    }
}

/// Finding category. Declaration order breaks magnitude ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    UnusedIndex,
    MissingIndex,
    RedundantIndex,
    QueryHotspot,
    WaitBottleneck,
    DesignSmell,
    FragmentedIndex,
    StaleStatistics,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Self::UnusedIndex => "unused index",
            Self::MissingIndex => "missing index",
            Self::RedundantIndex => "redundant index",
            Self::QueryHotspot => "query hotspot",
            Self::WaitBottleneck => "wait bottleneck",
            Self::DesignSmell => "design smell",
            Self::FragmentedIndex => "fragmented index",
            Self::StaleStatistics => "stale statistics",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesignSmellKind {
    HeapWithoutKey,
    WideTable,
    DeprecatedTypes,
    MissingAuditColumns,
    Triggers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceAction {
    Rebuild,
    Reorganize,
}

/// Back-reference into the snapshot's arenas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EvidenceRef {
    Table(TableId),
    Index(IndexId),
    Usage(UsageId),
    Physical(PhysicalId),
    Statistics(StatsId),
    MissingIndex(MissingId),
    Query(QueryStatId),
    Wait(WaitId),
}

/// One variant per category, each carrying only its own evidence.
#[derive(Debug, Clone, PartialEq)]
pub enum FindingKind {
    UnusedIndex {
        index: IndexId,
        usage: UsageId,
        writes: u64,
    },
    MissingIndex {
        table: TableId,
        /// Every candidate merged into this finding, ascending.
        candidates: SmallVec<[MissingId; 2]>,
        equality: ColumnList,
        inequality: ColumnList,
        included: ColumnList,
        impact_percent: f64,
        query_count: u64,
        score: f64,
    },
    RedundantIndex {
        index: IndexId,
        superseded_by: IndexId,
        usage: Option<UsageId>,
        writes: u64,
    },
    QueryHotspot {
        query: QueryStatId,
        total_cpu_ms: f64,
    },
    WaitBottleneck {
        wait: WaitId,
        share_percent: f64,
        cause: Option<String>,
    },
    DesignSmell {
        table: TableId,
        smell: DesignSmellKind,
    },
    FragmentedIndex {
        index: IndexId,
        physical: PhysicalId,
        action: MaintenanceAction,
        page_count: u64,
    },
    StaleStatistics {
        statistics: StatsId,
        table: TableId,
        modification_ratio: f64,
    },
}

impl FindingKind {
    pub fn category(&self) -> Category {
        match self {
            Self::UnusedIndex { .. } => Category::UnusedIndex,
            Self::MissingIndex { .. } => Category::MissingIndex,
            Self::RedundantIndex { .. } => Category::RedundantIndex,
            Self::QueryHotspot { .. } => Category::QueryHotspot,
            Self::WaitBottleneck { .. } => Category::WaitBottleneck,
            Self::DesignSmell { .. } => Category::DesignSmell,
            Self::FragmentedIndex { .. } => Category::FragmentedIndex,
            Self::StaleStatistics { .. } => Category::StaleStatistics,
        }
    }

    /// Every arena id this finding rests on. Never empty.
    pub fn evidence(&self) -> Vec<EvidenceRef> {
        match self {
            Self::UnusedIndex { index, usage, .. } => {
                vec![EvidenceRef::Index(*index), EvidenceRef::Usage(*usage)]
            }
            Self::MissingIndex {
                table, candidates, ..
            } => std::iter::once(EvidenceRef::Table(*table))
                .chain(candidates.iter().map(|c| EvidenceRef::MissingIndex(*c)))
                .collect(),
            Self::RedundantIndex {
                index,
                superseded_by,
                usage,
                ..
            } => {
                let mut refs = vec![EvidenceRef::Index(*index), EvidenceRef::Index(*superseded_by)];
                refs.extend(usage.map(EvidenceRef::Usage));
                refs
            }
            Self::QueryHotspot { query, .. } => vec![EvidenceRef::Query(*query)],
            Self::WaitBottleneck { wait, .. } => vec![EvidenceRef::Wait(*wait)],
            Self::DesignSmell { table, .. } => vec![EvidenceRef::Table(*table)],
            Self::FragmentedIndex {
                index, physical, ..
            } => vec![EvidenceRef::Index(*index), EvidenceRef::Physical(*physical)],
            Self::StaleStatistics {
                statistics, table, ..
            } => vec![EvidenceRef::Table(*table), EvidenceRef::Statistics(*statistics)],
        }
    }
}

/// A scored observation, before deduplication and rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub kind: FindingKind,
    pub subject: String,
    pub severity: Severity,
    /// What the evidence shows.
    pub reason: String,
    /// Imperative, starts with the category's action verb.
    pub action: String,
    /// Consequence of not acting, continues "otherwise ...".
    pub risk: String,
    /// Evidence magnitude used for ordering within a bucket.
    pub magnitude: f64,
    pub ddl: Option<String>,
}

impl Finding {
    pub fn category(&self) -> Category {
        self.kind.category()
    }

    pub fn evidence(&self) -> Vec<EvidenceRef> {
        self.kind.evidence()
    }
}
