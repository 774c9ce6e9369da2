//! Scoring engine: one rule module per finding category.
//!
//! Rules read the immutable [`Snapshot`] and append [`Finding`]s. They run in
//! a fixed order so the pre-dedup finding list is deterministic.

mod design;
mod finding;
mod maintenance;
mod missing;
mod query;
mod unused;
mod waits;

pub use design::{DesignRule, DESIGN_RULES};
pub use finding::*;
pub use missing::{esr_key_columns, index_name_for};
pub(crate) use missing::{missing_finding, MissingEvidence};
pub(crate) use unused::drop_index_ddl;
pub use waits::{is_excluded_wait, lookup_wait, WaitMatch, WaitRule, EXCLUDED_WAITS, WAIT_RULES};

use sqlaudit_core::config::AuditConfig;

use crate::normalize::Snapshot;
use crate::request::ScanRequest;

/// Every threshold the rules and the deduplicator consult.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    pub unused_write_threshold: u64,
    pub unused_critical_multiplier: u64,
    pub min_impact: f64,
    pub critical_impact: f64,
    pub critical_query_count: u64,
    pub important_impact: f64,
    pub missing_index_per_table_cap: usize,
    pub top_n: usize,
    pub high_latency_ms: f64,
    pub wait_top_n: usize,
    pub wait_critical_ms: u64,
    pub wait_important_ms: u64,
    pub wide_table_columns: usize,
    pub deprecated_types: Vec<String>,
    pub fragmentation_rebuild_percent: f64,
    pub fragmentation_reorganize_percent: f64,
    pub fragmentation_min_pages: u64,
    pub stale_statistics_ratio: f64,
}

impl ScoringConfig {
    /// Thresholds from `config`; the request's top-N and minimum impact win.
    pub fn new(config: &AuditConfig, request: &ScanRequest) -> Self {
        let t = &config.thresholds;
        Self {
            unused_write_threshold: t.effective_unused_write_threshold(),
            unused_critical_multiplier: t.effective_unused_critical_multiplier(),
            min_impact: request.min_impact,
            critical_impact: t.effective_critical_impact(),
            critical_query_count: t.effective_critical_query_count(),
            important_impact: t.effective_important_impact(),
            missing_index_per_table_cap: t.effective_missing_index_per_table_cap(),
            top_n: request.top_n,
            high_latency_ms: t.effective_high_latency_ms(),
            wait_top_n: t.effective_wait_top_n(),
            wait_critical_ms: t.effective_wait_critical_ms(),
            wait_important_ms: t.effective_wait_important_ms(),
            wide_table_columns: config.design.effective_wide_table_columns(),
            deprecated_types: config.design.effective_deprecated_types(),
            fragmentation_rebuild_percent: t.effective_fragmentation_rebuild_percent(),
            fragmentation_reorganize_percent: t.effective_fragmentation_reorganize_percent(),
            fragmentation_min_pages: t.effective_fragmentation_min_pages(),
            stale_statistics_ratio: t.effective_stale_statistics_ratio(),
        }
    }

    /// Writes above which an unused index is Critical.
    pub fn unused_critical_writes(&self) -> u64 {
        self.unused_write_threshold
            .saturating_mul(self.unused_critical_multiplier)
    }

    /// Grades a mapped wait by its own cumulative wait time.
    pub fn wait_severity(&self, wait_time_ms: u64) -> Severity {
        if wait_time_ms >= self.wait_critical_ms {
            Severity::Critical
        } else if wait_time_ms >= self.wait_important_ms {
            Severity::Important
        } else {
            Severity::Advisory
        }
    }

    pub fn missing_index_severity(&self, impact_percent: f64, query_count: u64) -> Severity {
        if impact_percent >= self.critical_impact && query_count >= self.critical_query_count {
            Severity::Critical
        } else if impact_percent >= self.important_impact {
            Severity::Important
        } else {
            Severity::Advisory
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let config = AuditConfig::default();
        Self::new(&config, &ScanRequest::from_config(&config))
    }
}

/// Run every rule over `snapshot`.
pub fn score(snapshot: &Snapshot, config: &ScoringConfig) -> Vec<Finding> {
    let mut findings = Vec::new();
    unused::score(snapshot, config, &mut findings);
    missing::score(snapshot, config, &mut findings);
    query::score(snapshot, config, &mut findings);
    waits::score(snapshot, config, &mut findings);
    design::score(snapshot, config, &mut findings);
    maintenance::score(snapshot, config, &mut findings);
    tracing::debug!(findings_scored = findings.len(), "scoring complete");
    findings
}
