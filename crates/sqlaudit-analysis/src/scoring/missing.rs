//! Missing indexes suggested by the optimizer.
//!
//! Score is `avg_impact_percent × (seeks + scans)`. Candidates are scored
//! one by one here; convergence and the per-table cap happen in dedup.

use smallvec::{smallvec, SmallVec};
use sqlaudit_core::types::quote_identifier;

use super::{Finding, FindingKind, ScoringConfig};
use crate::normalize::{ColumnList, MissingId, Snapshot, TableDescriptor, TableId};

pub(super) fn score(snapshot: &Snapshot, config: &ScoringConfig, out: &mut Vec<Finding>) {
    for candidate in &snapshot.missing {
        if candidate.avg_impact_percent < config.min_impact {
            continue;
        }
        out.push(missing_finding(
            snapshot.table(candidate.table),
            MissingEvidence {
                table: candidate.table,
                candidates: smallvec![candidate.id],
                equality: candidate.equality_columns.clone(),
                inequality: candidate.inequality_columns.clone(),
                included: candidate.included_columns.clone(),
                impact_percent: candidate.avg_impact_percent,
                query_count: candidate.query_count,
                score: candidate.avg_impact_percent * candidate.query_count as f64,
            },
            config,
        ));
    }
}

/// The evidence behind one missing-index finding, possibly merged from
/// several converging candidates.
#[derive(Debug, Clone)]
pub(crate) struct MissingEvidence {
    pub table: TableId,
    pub candidates: SmallVec<[MissingId; 2]>,
    pub equality: ColumnList,
    pub inequality: ColumnList,
    pub included: ColumnList,
    pub impact_percent: f64,
    pub query_count: u64,
    pub score: f64,
}

pub(crate) fn missing_finding(
    table: &TableDescriptor,
    evidence: MissingEvidence,
    config: &ScoringConfig,
) -> Finding {
    let keys = esr_key_columns(&evidence.equality, &evidence.inequality);
    let name = index_name_for(&table.name.name, &keys);
    let key_list = keys.join(", ");
    let mut ddl = format!(
        "CREATE NONCLUSTERED INDEX {} ON {} ({})",
        quote_identifier(&name),
        table.name.quoted(),
        quoted_list(&keys)
    );
    if !evidence.included.is_empty() {
        ddl.push_str(&format!(" INCLUDE ({})", quoted_list(&evidence.included)));
    }
    ddl.push(';');

    let MissingEvidence {
        table: table_id,
        candidates,
        equality,
        inequality,
        included,
        impact_percent,
        query_count,
        score,
    } = evidence;

    Finding {
        kind: FindingKind::MissingIndex {
            table: table_id,
            candidates,
            equality,
            inequality,
            included,
            impact_percent,
            query_count,
            score,
        },
        subject: format!("{} ({key_list})", table.name),
        severity: config.missing_index_severity(impact_percent, query_count),
        reason: format!(
            "optimizer estimates {impact_percent:.0}% improvement for {query_count} queries"
        ),
        action: format!("Create index {name} on {} ({key_list})", table.name),
        risk: format!("queries keep scanning {} for rows an index would seek to", table.name),
        magnitude: score,
        ddl: Some(ddl),
    }
}

fn quoted_list(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Equality columns first, then inequality columns, duplicates dropped.
pub fn esr_key_columns(equality: &[String], inequality: &[String]) -> ColumnList {
    let mut keys = ColumnList::new();
    for column in equality.iter().chain(inequality) {
        if !keys.iter().any(|k: &String| k.eq_ignore_ascii_case(column)) {
            keys.push(column.clone());
        }
    }
    keys
}

/// `IX_<table>_<col>_<col>`, restricted to identifier-safe characters.
pub fn index_name_for(table: &str, keys: &[String]) -> String {
    let mut name = format!("IX_{}", sanitize(table));
    for key in keys {
        name.push('_');
        name.push_str(&sanitize(key));
    }
    name
}

fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn equality_columns_lead_the_key() {
        let keys = esr_key_columns(&cols(&["Status", "CustomerID"]), &cols(&["OrderDate"]));
        assert_eq!(keys.as_slice(), cols(&["Status", "CustomerID", "OrderDate"]).as_slice());
    }

    #[test]
    fn repeated_columns_appear_once() {
        let keys = esr_key_columns(&cols(&["CustomerID"]), &cols(&["customerid", "OrderDate"]));
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn index_names_are_identifier_safe() {
        assert_eq!(
            index_name_for("Order Lines", &cols(&["Customer-ID", "Date"])),
            "IX_Order_Lines_Customer_ID_Date"
        );
    }
}
