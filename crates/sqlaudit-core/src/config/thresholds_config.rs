//! Scoring thresholds.

use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Every scoring threshold, each optional with a compiled default.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ThresholdsConfig {
    /// Writes above which a never-read index is unused. Default: 100.
    pub unused_write_threshold: Option<u64>,
    /// Multiple of the write threshold at which unused becomes Critical. Default: 10.
    pub unused_critical_multiplier: Option<u64>,
    /// Missing-index recommendations kept per table. Default: 5.
    pub missing_index_per_table_cap: Option<usize>,
    /// Minimum average impact percent for a missing index. Default: 0.
    pub min_impact: Option<f64>,
    /// Default: 80.
    pub critical_impact: Option<f64>,
    /// Default: 500.
    pub critical_query_count: Option<u64>,
    /// Default: 50.
    pub important_impact: Option<f64>,
    /// Number of query hotspots reported. Default: 20.
    pub top_n: Option<usize>,
    /// Average duration (ms) above which a hotspot is Critical. Default: 1000.
    pub high_latency_ms: Option<f64>,
    /// Default: 10.
    pub wait_top_n: Option<usize>,
    /// Cumulative wait time (ms) at which a mapped wait is Critical. Default: 60000.
    pub wait_critical_ms: Option<u64>,
    /// Default: 10000.
    pub wait_important_ms: Option<u64>,
    /// Default: 30.
    pub fragmentation_rebuild_percent: Option<f64>,
    /// Default: 5.
    pub fragmentation_reorganize_percent: Option<f64>,
    /// Default: 1000.
    pub fragmentation_min_pages: Option<u64>,
    /// Default: 0.20.
    pub stale_statistics_ratio: Option<f64>,
}

impl ThresholdsConfig {
    pub fn effective_unused_write_threshold(&self) -> u64 {
        self.unused_write_threshold
            .unwrap_or(DEFAULT_UNUSED_WRITE_THRESHOLD)
    }

    pub fn effective_unused_critical_multiplier(&self) -> u64 {
        self.unused_critical_multiplier
            .unwrap_or(DEFAULT_UNUSED_CRITICAL_MULTIPLIER)
    }

    pub fn effective_missing_index_per_table_cap(&self) -> usize {
        self.missing_index_per_table_cap
            .unwrap_or(DEFAULT_MISSING_INDEX_PER_TABLE_CAP)
    }

    pub fn effective_min_impact(&self) -> f64 {
        self.min_impact.unwrap_or(DEFAULT_MISSING_INDEX_MIN_IMPACT)
    }

    pub fn effective_critical_impact(&self) -> f64 {
        self.critical_impact
            .unwrap_or(DEFAULT_MISSING_INDEX_CRITICAL_IMPACT)
    }

    pub fn effective_critical_query_count(&self) -> u64 {
        self.critical_query_count
            .unwrap_or(DEFAULT_MISSING_INDEX_CRITICAL_QUERY_COUNT)
    }

    pub fn effective_important_impact(&self) -> f64 {
        self.important_impact
            .unwrap_or(DEFAULT_MISSING_INDEX_IMPORTANT_IMPACT)
    }

    pub fn effective_top_n(&self) -> usize {
        self.top_n.unwrap_or(DEFAULT_QUERY_HOTSPOT_TOP_N)
    }

    pub fn effective_high_latency_ms(&self) -> f64 {
        self.high_latency_ms.unwrap_or(DEFAULT_HIGH_LATENCY_MS)
    }

    pub fn effective_wait_top_n(&self) -> usize {
        self.wait_top_n.unwrap_or(DEFAULT_WAIT_TOP_N)
    }

    pub fn effective_wait_critical_ms(&self) -> u64 {
        self.wait_critical_ms.unwrap_or(DEFAULT_WAIT_CRITICAL_MS)
    }

    pub fn effective_wait_important_ms(&self) -> u64 {
        self.wait_important_ms.unwrap_or(DEFAULT_WAIT_IMPORTANT_MS)
    }

    pub fn effective_fragmentation_rebuild_percent(&self) -> f64 {
        self.fragmentation_rebuild_percent
            .unwrap_or(DEFAULT_FRAGMENTATION_REBUILD_PERCENT)
    }

    pub fn effective_fragmentation_reorganize_percent(&self) -> f64 {
        self.fragmentation_reorganize_percent
            .unwrap_or(DEFAULT_FRAGMENTATION_REORGANIZE_PERCENT)
    }

    pub fn effective_fragmentation_min_pages(&self) -> u64 {
        self.fragmentation_min_pages
            .unwrap_or(DEFAULT_FRAGMENTATION_MIN_PAGES)
    }

    pub fn effective_stale_statistics_ratio(&self) -> f64 {
        self.stale_statistics_ratio
            .unwrap_or(DEFAULT_STALE_STATISTICS_RATIO)
    }

    pub(crate) fn merge_from(&mut self, other: &ThresholdsConfig) {
        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $(if other.$field.is_some() {
                    self.$field = other.$field;
                })*
            };
        }
        take!(
            unused_write_threshold,
            unused_critical_multiplier,
            missing_index_per_table_cap,
            min_impact,
            critical_impact,
            critical_query_count,
            important_impact,
            top_n,
            high_latency_ms,
            wait_top_n,
            wait_critical_ms,
            wait_important_ms,
            fragmentation_rebuild_percent,
            fragmentation_reorganize_percent,
            fragmentation_min_pages,
            stale_statistics_ratio,
        );
    }
}
