//! The raw, unresolved result of one collection pass.

use sqlaudit_core::types::{
    CatalogRows, IndexUsageRows, MissingIndexRow, QueryStatRow, WaitStatRow,
};
use sqlaudit_core::Phase;

use super::outcome::PhaseOutcome;
use crate::normalize::QueryOrigin;
use crate::report::Caveat;

/// Rows exactly as the source returned them, one slot per phase.
///
/// Metadata is not wrapped: a scan without a catalog never gets this far.
#[derive(Debug, Clone)]
pub struct RawSnapshot {
    pub source: String,
    pub scanned_at: i64,
    pub catalog: CatalogRows,
    pub index_usage: PhaseOutcome<IndexUsageRows>,
    pub missing_indexes: PhaseOutcome<Vec<MissingIndexRow>>,
    pub query_stats: PhaseOutcome<Vec<QueryStatRow>>,
    pub query_origin: QueryOrigin,
    pub wait_stats: PhaseOutcome<Vec<WaitStatRow>>,
    /// Caveats raised while collecting (query store fallback, interrupts).
    pub caveats: Vec<Caveat>,
}

impl RawSnapshot {
    /// A snapshot holding only `catalog`, every signal unrequested.
    pub fn from_catalog(source: impl Into<String>, scanned_at: i64, catalog: CatalogRows) -> Self {
        Self {
            source: source.into(),
            scanned_at,
            catalog,
            index_usage: PhaseOutcome::not_requested(),
            missing_indexes: PhaseOutcome::not_requested(),
            query_stats: PhaseOutcome::not_requested(),
            query_origin: QueryOrigin::PlanCache,
            wait_stats: PhaseOutcome::not_requested(),
            caveats: Vec::new(),
        }
    }

    /// Row count for a collected phase, `None` when it is empty or unavailable.
    pub fn rows(&self, phase: Phase) -> Option<usize> {
        match phase {
            Phase::Metadata => Some(self.catalog.row_count()),
            Phase::IndexUsage => self.index_usage.collected().map(RowCount::row_count),
            Phase::MissingIndex => self.missing_indexes.collected().map(RowCount::row_count),
            Phase::QueryStats => self.query_stats.collected().map(RowCount::row_count),
            Phase::WaitStats => self.wait_stats.collected().map(RowCount::row_count),
        }
    }
}

/// Number of raw rows a collector produced.
pub trait RowCount {
    fn row_count(&self) -> usize;
}

impl RowCount for CatalogRows {
    fn row_count(&self) -> usize {
        CatalogRows::row_count(self)
    }
}

impl RowCount for IndexUsageRows {
    fn row_count(&self) -> usize {
        self.usage.len() + self.physical.len()
    }
}

impl<T> RowCount for Vec<T> {
    fn row_count(&self) -> usize {
        self.len()
    }
}
