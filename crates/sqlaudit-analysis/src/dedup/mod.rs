//! Deduplicator: redundant-index collapse, missing-index convergence, and
//! the per-table missing-index cap, applied in that order.

pub mod redundancy;

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use sqlaudit_core::types::quote_identifier;

pub use redundancy::{find_redundant, Redundancy};

use crate::normalize::{Snapshot, TableId};
use crate::report::{Caveat, CaveatKind};
use crate::scoring::{
    drop_index_ddl, missing_finding, Finding, FindingKind, MissingEvidence, ScoringConfig, Severity,
};

/// Findings after deduplication plus the caveats it raised.
#[derive(Debug, Clone, Default)]
pub struct DedupOutcome {
    pub findings: Vec<Finding>,
    pub caveats: Vec<Caveat>,
}

pub struct Deduplicator<'a> {
    snapshot: &'a Snapshot,
    config: &'a ScoringConfig,
}

impl<'a> Deduplicator<'a> {
    pub fn new(snapshot: &'a Snapshot, config: &'a ScoringConfig) -> Self {
        Self { snapshot, config }
    }

    pub fn run(&self, findings: Vec<Finding>) -> DedupOutcome {
        let before = findings.len();
        let (missing, others): (Vec<Finding>, Vec<Finding>) = findings
            .into_iter()
            .partition(|f| matches!(f.kind, FindingKind::MissingIndex { .. }));

        let mut kept = self.collapse_redundant(others);
        let converged = self.converge(missing);
        let (capped, caveats) = self.cap_per_table(converged);
        kept.extend(capped);

        tracing::debug!(
            findings_deduplicated = before.saturating_sub(kept.len()),
            "deduplication complete"
        );
        DedupOutcome {
            findings: kept,
            caveats,
        }
    }

    /// Replace UnusedIndex findings for redundant indexes with RedundantIndex
    /// findings that name the superseding index.
    fn collapse_redundant(&self, findings: Vec<Finding>) -> Vec<Finding> {
        let redundant = find_redundant(self.snapshot);
        if redundant.is_empty() {
            return findings;
        }

        let mut kept: Vec<Finding> = findings
            .into_iter()
            .filter(|f| match &f.kind {
                FindingKind::UnusedIndex { index, .. } => {
                    !redundant.iter().any(|r| r.index.id == *index)
                }
                _ => true,
            })
            .collect();

        for Redundancy {
            index,
            superseded_by,
        } in redundant
        {
            let table = self.snapshot.table(index.table);
            let usage = self.snapshot.usage_of(index.id);
            let writes = usage.map_or(0, |u| u.writes);
            let severity = match usage {
                Some(u) if u.reads == 0 && u.writes > self.config.unused_write_threshold => {
                    Severity::Important
                }
                _ => Severity::Advisory,
            };
            kept.push(Finding {
                kind: FindingKind::RedundantIndex {
                    index: index.id,
                    superseded_by: superseded_by.id,
                    usage: usage.map(|u| u.id),
                    writes,
                },
                subject: self.snapshot.index_subject(index.id),
                severity,
                reason: format!(
                    "key ({}) is a prefix of {} ({})",
                    index.key_columns.join(", "),
                    quote_identifier(&superseded_by.name),
                    superseded_by.key_columns.join(", ")
                ),
                action: format!("Drop redundant index {} on {}", index.name, table.name),
                risk: format!(
                    "every write keeps maintaining a second copy of what {} already covers",
                    superseded_by.name
                ),
                magnitude: writes as f64,
                ddl: Some(drop_index_ddl(&index.name, &table.name)),
            });
        }
        kept
    }

    /// Merge candidates with the same key shape. Equality columns compare as
    /// a set; inequality and included columns compare in order.
    fn converge(&self, findings: Vec<Finding>) -> Vec<MissingEvidence> {
        let mut merged: Vec<MissingEvidence> = Vec::new();
        let mut positions: FxHashMap<ConvergenceKey, usize> = FxHashMap::default();

        for finding in findings {
            let FindingKind::MissingIndex {
                table,
                candidates,
                equality,
                inequality,
                included,
                impact_percent,
                query_count,
                score,
            } = finding.kind
            else {
                continue;
            };
            let evidence = MissingEvidence {
                table,
                candidates,
                equality,
                inequality,
                included,
                impact_percent,
                query_count,
                score,
            };
            let key = ConvergenceKey::of(&evidence);
            match positions.get(&key) {
                Some(&at) => {
                    let into = &mut merged[at];
                    into.candidates.extend(evidence.candidates);
                    into.candidates.sort();
                    into.query_count = into.query_count.saturating_add(evidence.query_count);
                    into.impact_percent = into.impact_percent.max(evidence.impact_percent);
                    into.score = into.score.max(evidence.score);
                }
                None => {
                    positions.insert(key, merged.len());
                    merged.push(evidence);
                }
            }
        }
        merged
    }

    /// Keep the top-scoring candidates per table.
    fn cap_per_table(&self, merged: Vec<MissingEvidence>) -> (Vec<Finding>, Vec<Caveat>) {
        let cap = self.config.missing_index_per_table_cap;
        let mut by_table: BTreeMap<TableId, Vec<Finding>> = BTreeMap::new();
        for evidence in merged {
            let table = self.snapshot.table(evidence.table);
            let table_id = evidence.table;
            by_table
                .entry(table_id)
                .or_default()
                .push(missing_finding(table, evidence, self.config));
        }

        let mut kept = Vec::new();
        let mut caveats = Vec::new();
        for (table, mut findings) in by_table {
            findings.sort_by(|a, b| {
                b.magnitude
                    .total_cmp(&a.magnitude)
                    .then_with(|| a.subject.cmp(&b.subject))
            });
            if findings.len() > cap {
                let dropped = findings.len() - cap;
                findings.truncate(cap);
                caveats.push(Caveat::new(
                    CaveatKind::CapApplied,
                    format!(
                        "{}: {dropped} lower-ranked missing-index candidate(s) dropped by the per-table cap of {cap}",
                        self.snapshot.table(table).name
                    ),
                ));
            }
            kept.extend(findings);
        }
        (kept, caveats)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ConvergenceKey {
    table: TableId,
    equality: Vec<String>,
    inequality: Vec<String>,
    included: Vec<String>,
}

impl ConvergenceKey {
    fn of(evidence: &MissingEvidence) -> Self {
        let lower = |cols: &[String]| cols.iter().map(|c| c.to_lowercase()).collect::<Vec<_>>();
        let mut equality = lower(&evidence.equality);
        equality.sort();
        Self {
            table: evidence.table,
            equality,
            inequality: lower(&evidence.inequality),
            included: lower(&evidence.included),
        }
    }
}

/// Run all three deduplication steps.
pub fn deduplicate(
    findings: Vec<Finding>,
    snapshot: &Snapshot,
    config: &ScoringConfig,
) -> DedupOutcome {
    Deduplicator::new(snapshot, config).run(findings)
}
