//! Per-table design smells, driven by [`DESIGN_RULES`].
//!
//! Each rule fires at most once per table.

use super::{DesignSmellKind, Finding, FindingKind, ScoringConfig, Severity};
use crate::normalize::{Snapshot, StorageType, TableDescriptor};

/// One design rule: a check returning the reason it fired, plus the
/// rendered action and risk. `{table}` in `action` is the table name.
pub struct DesignRule {
    pub smell: DesignSmellKind,
    pub severity: Severity,
    pub check: fn(&TableDescriptor, &ScoringConfig) -> Option<String>,
    pub action: &'static str,
    pub risk: &'static str,
}

pub static DESIGN_RULES: &[DesignRule] = &[
    DesignRule {
        smell: DesignSmellKind::HeapWithoutKey,
        severity: Severity::Important,
        check: heap_without_key,
        action: "Add a clustered primary key to {table}",
        risk: "forwarded records and full scans keep growing with the table",
    },
    DesignRule {
        smell: DesignSmellKind::WideTable,
        severity: Severity::Advisory,
        check: wide_table,
        action: "Split {table} into narrower tables along its access patterns",
        risk: "every row read keeps dragging unused columns through the buffer pool",
    },
    DesignRule {
        smell: DesignSmellKind::DeprecatedTypes,
        severity: Severity::Important,
        check: deprecated_types,
        action: "Replace the deprecated large-object columns on {table} with max-length types",
        risk: "the columns keep blocking online operations and will break on a future upgrade",
    },
    DesignRule {
        smell: DesignSmellKind::MissingAuditColumns,
        severity: Severity::Advisory,
        check: missing_audit_columns,
        action: "Add created and modified timestamp columns to {table}",
        risk: "row changes on the table cannot be traced or loaded incrementally",
    },
    DesignRule {
        smell: DesignSmellKind::Triggers,
        severity: Severity::Advisory,
        check: has_triggers,
        action: "Review the triggers on {table}",
        risk: "hidden per-row work keeps adding latency to every write",
    },
];

fn heap_without_key(table: &TableDescriptor, _: &ScoringConfig) -> Option<String> {
    (table.storage == StorageType::Heap && !table.has_primary_key && !table.is_staging)
        .then(|| "heap with no clustered index and no primary key".to_string())
}

fn wide_table(table: &TableDescriptor, config: &ScoringConfig) -> Option<String> {
    (table.columns.len() > config.wide_table_columns).then(|| {
        format!(
            "{} columns, more than {}",
            table.columns.len(),
            config.wide_table_columns
        )
    })
}

fn deprecated_types(table: &TableDescriptor, config: &ScoringConfig) -> Option<String> {
    let offenders: Vec<String> = table
        .columns
        .iter()
        .filter(|c| {
            let ty = c.data_type.to_lowercase();
            config.deprecated_types.iter().any(|d| *d == ty)
        })
        .map(|c| format!("{} ({})", c.name, c.data_type))
        .collect();
    (!offenders.is_empty()).then(|| format!("deprecated column types: {}", offenders.join(", ")))
}

fn missing_audit_columns(table: &TableDescriptor, _: &ScoringConfig) -> Option<String> {
    let flags = table.audit_columns;
    match (flags.has_created, flags.has_modified) {
        (true, true) => None,
        (false, false) => Some("no created or modified audit column".to_string()),
        (true, false) => Some("no modified audit column".to_string()),
        (false, true) => Some("no created audit column".to_string()),
    }
}

fn has_triggers(table: &TableDescriptor, _: &ScoringConfig) -> Option<String> {
    (table.trigger_count > 0).then(|| format!("{} trigger(s) defined", table.trigger_count))
}

pub(super) fn score(snapshot: &Snapshot, config: &ScoringConfig, out: &mut Vec<Finding>) {
    for table in &snapshot.tables {
        for rule in DESIGN_RULES {
            let Some(reason) = (rule.check)(table, config) else {
                continue;
            };
            let name = table.name.to_string();
            out.push(Finding {
                kind: FindingKind::DesignSmell {
                    table: table.id,
                    smell: rule.smell,
                },
                subject: name.clone(),
                severity: rule.severity,
                reason,
                action: rule.action.replace("{table}", &name),
                risk: rule.risk.to_string(),
                magnitude: table.size_bytes as f64,
                ddl: None,
            });
        }
    }
}
