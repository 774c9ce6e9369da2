//! Unused indexes: maintained on every write, never read.

use super::{Finding, FindingKind, ScoringConfig, Severity};
use crate::normalize::Snapshot;

pub(super) fn score(snapshot: &Snapshot, config: &ScoringConfig, out: &mut Vec<Finding>) {
    for index in &snapshot.indexes {
        if index.is_protected() {
            continue;
        }
        // No telemetry is "unknown", not "unused".
        let Some(usage) = snapshot.usage_of(index.id) else {
            continue;
        };
        if usage.reads > 0 || usage.writes <= config.unused_write_threshold {
            continue;
        }

        let table = snapshot.table(index.table);
        let severity = if usage.writes > config.unused_critical_writes() {
            Severity::Critical
        } else {
            Severity::Important
        };
        let window = match usage.window_secs {
            Some(secs) => format!(" over {}", describe_window(secs)),
            None => String::new(),
        };

        out.push(Finding {
            kind: FindingKind::UnusedIndex {
                index: index.id,
                usage: usage.id,
                writes: usage.writes,
            },
            subject: snapshot.index_subject(index.id),
            severity,
            reason: format!("0 reads and {} writes{window}", usage.writes),
            action: format!("Drop index {} on {}", index.name, table.name),
            risk: "every write to the table keeps paying to maintain an index no query reads"
                .to_string(),
            magnitude: usage.writes as f64,
            ddl: Some(drop_index_ddl(&index.name, &table.name)),
        });
    }
}

pub(crate) fn drop_index_ddl(index: &str, table: &sqlaudit_core::ObjectName) -> String {
    format!(
        "DROP INDEX {} ON {};",
        sqlaudit_core::types::quote_identifier(index),
        table.quoted()
    )
}

fn describe_window(secs: u64) -> String {
    const DAY: u64 = 86_400;
    const HOUR: u64 = 3_600;
    if secs >= DAY {
        format!("{} day(s)", secs / DAY)
    } else if secs >= HOUR {
        format!("{} hour(s)", secs / HOUR)
    } else {
        format!("{} minute(s)", secs / 60)
    }
}
