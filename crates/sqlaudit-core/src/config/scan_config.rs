//! Scan configuration.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT_SECS};
use crate::types::Phase;

/// Which phases run, how many collectors run at once, and how long a scan may take.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScanConfig {
    /// Phases to run. Empty selects every phase.
    pub phases: Vec<String>,
    /// Collector worker count. Default: one per collector type.
    pub concurrency: Option<usize>,
    /// Scan deadline in seconds. Default: 300.
    pub timeout_secs: Option<u64>,
    /// Signal phases allowed to be skipped when the scan is cancelled or
    /// times out before they finish.
    pub degraded_phases: Vec<String>,
}

impl ScanConfig {
    pub fn effective_phases(&self) -> BTreeSet<Phase> {
        let parsed: BTreeSet<Phase> = self.phases.iter().filter_map(|p| p.parse().ok()).collect();
        if parsed.is_empty() {
            Phase::all().iter().copied().collect()
        } else {
            parsed
        }
    }

    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.unwrap_or(DEFAULT_CONCURRENCY)
    }

    pub fn effective_timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    pub fn effective_degraded_phases(&self) -> BTreeSet<Phase> {
        self.degraded_phases
            .iter()
            .filter_map(|p| p.parse().ok())
            .collect()
    }

    pub(crate) fn merge_from(&mut self, other: &ScanConfig) {
        if !other.phases.is_empty() {
            self.phases = other.phases.clone();
        }
        if other.concurrency.is_some() {
            self.concurrency = other.concurrency;
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
        if !other.degraded_phases.is_empty() {
            self.degraded_phases = other.degraded_phases.clone();
        }
    }
}
