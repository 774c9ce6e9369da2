//! Index fragmentation and stale statistics.

use sqlaudit_core::types::quote_identifier;

use super::{Finding, FindingKind, MaintenanceAction, ScoringConfig, Severity};
use crate::normalize::Snapshot;

pub(super) fn score(snapshot: &Snapshot, config: &ScoringConfig, out: &mut Vec<Finding>) {
    fragmented_indexes(snapshot, config, out);
    stale_statistics(snapshot, config, out);
}

fn fragmented_indexes(snapshot: &Snapshot, config: &ScoringConfig, out: &mut Vec<Finding>) {
    for index in &snapshot.indexes {
        let Some(physical) = snapshot.physical_of(index.id) else {
            continue;
        };
        if physical.page_count < config.fragmentation_min_pages {
            continue;
        }
        let fragmentation = physical.fragmentation_percent;
        let (action, severity, verb, keyword) =
            if fragmentation >= config.fragmentation_rebuild_percent {
                (MaintenanceAction::Rebuild, Severity::Important, "Rebuild", "REBUILD")
            } else if fragmentation >= config.fragmentation_reorganize_percent {
                (MaintenanceAction::Reorganize, Severity::Advisory, "Reorganize", "REORGANIZE")
            } else {
                continue;
            };

        let table = snapshot.table(index.table);
        out.push(Finding {
            kind: FindingKind::FragmentedIndex {
                index: index.id,
                physical: physical.id,
                action,
                page_count: physical.page_count,
            },
            subject: snapshot.index_subject(index.id),
            severity,
            reason: format!(
                "{fragmentation:.1}% fragmented across {} pages",
                physical.page_count
            ),
            action: format!("{verb} index {} on {}", index.name, table.name),
            risk: format!(
                "range scans keep reading {} pages out of order",
                physical.page_count
            ),
            magnitude: physical.page_count as f64,
            ddl: Some(format!(
                "ALTER INDEX {} ON {} {keyword};",
                quote_identifier(&index.name),
                table.name.quoted()
            )),
        });
    }
}

fn stale_statistics(snapshot: &Snapshot, config: &ScoringConfig, out: &mut Vec<Finding>) {
    for stats in &snapshot.statistics {
        if stats.rows == 0 {
            continue;
        }
        let ratio = stats.modification_counter as f64 / stats.rows as f64;
        if ratio <= config.stale_statistics_ratio {
            continue;
        }
        let severity = if ratio > config.stale_statistics_ratio * 2.0 {
            Severity::Important
        } else {
            Severity::Advisory
        };

        let table = snapshot.table(stats.table);
        out.push(Finding {
            kind: FindingKind::StaleStatistics {
                statistics: stats.id,
                table: stats.table,
                modification_ratio: ratio,
            },
            subject: format!("{}.{}", table.name, stats.name),
            severity,
            reason: format!(
                "{} modifications against {} rows ({:.0}%)",
                stats.modification_counter,
                stats.rows,
                ratio * 100.0
            ),
            action: format!("Update statistics {} on {}", stats.name, table.name),
            risk: "the optimizer keeps planning from row estimates that no longer match the data"
                .to_string(),
            magnitude: stats.modification_counter as f64,
            ddl: Some(format!(
                "UPDATE STATISTICS {} {};",
                table.name.quoted(),
                quote_identifier(&stats.name)
            )),
        });
    }
}
