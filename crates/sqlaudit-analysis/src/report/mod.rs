//! The audit report: header, severity buckets, index scorecard, caveats.
//!
//! Field order is declaration order in every serialized form so two
//! reports diff line-by-line.

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlaudit_core::{Phase, SkipReason};

use crate::scoring::{Category, EvidenceRef, Severity};

/// The only artifact a scan persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub header: ReportHeader,
    pub critical: Vec<Recommendation>,
    pub important: Vec<Recommendation>,
    pub advisory: Vec<Recommendation>,
    pub scorecard: IndexScorecard,
    pub caveats: Vec<Caveat>,
}

impl AuditReport {
    pub fn has_critical(&self) -> bool {
        !self.critical.is_empty()
    }

    pub fn total_recommendations(&self) -> usize {
        self.critical.len() + self.important.len() + self.advisory.len()
    }

    /// Every recommendation, most severe bucket first.
    pub fn recommendations(&self) -> impl Iterator<Item = &Recommendation> {
        self.critical
            .iter()
            .chain(self.important.iter())
            .chain(self.advisory.iter())
    }

    pub fn phase(&self, phase: Phase) -> Option<&PhaseReport> {
        self.header.phases.iter().find(|p| p.phase == phase)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportHeader {
    pub source: String,
    /// Unix seconds of the snapshot.
    pub scanned_at: i64,
    pub engine_version: String,
    pub table_count: usize,
    pub total_size_bytes: u64,
    /// One entry per phase, in phase order.
    pub phases: Vec<PhaseReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseReport {
    pub phase: Phase,
    pub status: PhaseStatus,
}

/// What happened to one phase. `Empty` (ran, nothing observed) and
/// `Skipped` (no evidence at all) are deliberately distinct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PhaseStatus {
    Ran { rows: usize },
    Empty,
    Skipped { reason: SkipReason, detail: String },
}

impl PhaseStatus {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

impl fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ran { rows } => write!(f, "ran ({rows} rows)"),
            Self::Empty => f.write_str("ran: no findings in this category (signal returned no rows)"),
            Self::Skipped { reason, .. } => write!(f, "skipped: {reason}"),
        }
    }
}

/// A finding promoted into the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: Category,
    pub subject: String,
    pub severity: Severity,
    /// One sentence: action verb first, risk of inaction stated.
    pub sentence: String,
    pub reason: String,
    pub magnitude: f64,
    pub ddl: Option<String>,
    pub evidence: Vec<EvidenceRef>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IndexScorecard {
    /// Unused and redundant indexes; impact is writes avoided.
    pub drop: ScorecardLine,
    /// Missing indexes; impact is summed impact score.
    pub create: ScorecardLine,
    /// Fragmented indexes; impact is pages to rebuild or reorganize.
    pub rebuild: ScorecardLine,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScorecardLine {
    pub count: usize,
    pub estimated_impact: f64,
}

/// A non-fatal problem surfaced to the reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caveat {
    pub kind: CaveatKind,
    pub message: String,
}

impl Caveat {
    pub fn new(kind: CaveatKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaveatKind {
    PhaseSkipped,
    EmptySignal,
    ObjectVanished,
    QueryStoreFallback,
    CapApplied,
    FindingWithheld,
}
