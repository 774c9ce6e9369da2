//! The scan invocation contract.

use std::collections::BTreeSet;
use std::time::Duration;

use sqlaudit_core::config::AuditConfig;
use sqlaudit_core::Phase;

/// What one scan collects and how long it may take.
///
/// Metadata is always collected: every signal is resolved against it.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub phases: BTreeSet<Phase>,
    /// Number of query hotspots reported.
    pub top_n: usize,
    /// Minimum average impact percent for missing-index candidates.
    pub min_impact: f64,
    /// Signal phases that may be skipped if the scan is interrupted.
    pub degraded_phases: BTreeSet<Phase>,
    pub timeout: Duration,
    pub concurrency: usize,
    pub use_query_store: bool,
}

impl ScanRequest {
    pub fn from_config(config: &AuditConfig) -> Self {
        let mut phases = config.scan.effective_phases();
        phases.insert(Phase::Metadata);
        Self {
            phases,
            top_n: config.thresholds.effective_top_n(),
            min_impact: config.thresholds.effective_min_impact(),
            degraded_phases: config
                .scan
                .effective_degraded_phases()
                .into_iter()
                .filter(Phase::is_signal)
                .collect(),
            timeout: Duration::from_secs(config.scan.effective_timeout_secs()),
            concurrency: config.scan.effective_concurrency().max(1),
            use_query_store: config.source.effective_use_query_store(),
        }
    }

    pub fn is_requested(&self, phase: Phase) -> bool {
        phase == Phase::Metadata || self.phases.contains(&phase)
    }
}

impl Default for ScanRequest {
    fn default() -> Self {
        Self::from_config(&AuditConfig::default())
    }
}
