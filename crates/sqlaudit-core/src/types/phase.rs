//! Scan phases and the reasons a phase can be skipped.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// The five collection phases a scan request can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Metadata,
    IndexUsage,
    MissingIndex,
    QueryStats,
    WaitStats,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Metadata => "metadata",
            Self::IndexUsage => "index-usage",
            Self::MissingIndex => "missing-index",
            Self::QueryStats => "query-stats",
            Self::WaitStats => "wait-stats",
        }
    }

    pub fn all() -> &'static [Phase] {
        &[
            Self::Metadata,
            Self::IndexUsage,
            Self::MissingIndex,
            Self::QueryStats,
            Self::WaitStats,
        ]
    }

    /// Every phase except metadata is a signal phase and may fail locally.
    pub fn is_signal(&self) -> bool {
        !matches!(self, Self::Metadata)
    }

    /// Parse a comma-separated phase list. An empty list selects every phase.
    pub fn parse_list(raw: &str) -> Result<BTreeSet<Phase>, ConfigError> {
        let mut phases = BTreeSet::new();
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            phases.insert(part.parse()?);
        }
        if phases.is_empty() {
            phases.extend(Self::all().iter().copied());
        }
        Ok(phases)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::all()
            .iter()
            .copied()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "phase".to_string(),
                message: format!(
                    "unknown phase '{s}' (expected one of: metadata, index-usage, missing-index, query-stats, wait-stats)"
                ),
            })
    }
}

/// Why a phase contributed no evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The scan request did not select the phase.
    NotRequested,
    /// The source refused access to the underlying view.
    InsufficientPermission,
    /// The telemetry feature is not enabled on the source.
    FeatureNotEnabled,
    /// The source returned an unexpected error for this phase.
    SourceError,
    /// The scan was cancelled before the phase finished (degraded mode only).
    Cancelled,
    /// The scan deadline passed before the phase finished (degraded mode only).
    TimedOut,
}

impl SkipReason {
    /// Human-readable reason used in the report header.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::NotRequested => "not requested",
            Self::InsufficientPermission => "insufficient permission",
            Self::FeatureNotEnabled => "feature not enabled",
            Self::SourceError => "source error",
            Self::Cancelled => "cancelled",
            Self::TimedOut => "timed out",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}
