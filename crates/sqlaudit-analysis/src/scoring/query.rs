//! Query hotspots: the top CPU consumers, plus any slow query outside them.

use super::{Finding, FindingKind, ScoringConfig, Severity};
use crate::normalize::{QueryOrigin, QueryStat, Snapshot};

pub(super) fn score(snapshot: &Snapshot, config: &ScoringConfig, out: &mut Vec<Finding>) {
    let mut ranked: Vec<&QueryStat> = snapshot
        .queries
        .iter()
        .filter(|q| q.total_cpu_ms() > 0.0)
        .collect();
    ranked.sort_by(|a, b| {
        b.total_cpu_ms()
            .total_cmp(&a.total_cpu_ms())
            .then_with(|| a.query_id.cmp(&b.query_id))
    });

    // Slow queries stay reported when heavier queries push them past the top N.
    let scored = ranked
        .into_iter()
        .enumerate()
        .filter(|(rank, q)| *rank < config.top_n || q.avg_duration_ms > config.high_latency_ms);

    for (_, query) in scored {
        let total = query.total_cpu_ms();
        let slow = query.avg_duration_ms > config.high_latency_ms;
        let severity = if slow {
            Severity::Critical
        } else {
            Severity::Important
        };
        let origin = match query.origin {
            QueryOrigin::PlanCache => "plan cache",
            QueryOrigin::QueryStore => "query store",
        };
        let risk = if slow {
            format!(
                "each execution keeps taking {:.0} ms while the query holds its share of server CPU",
                query.avg_duration_ms
            )
        } else {
            "the query keeps holding one of the largest shares of server CPU".to_string()
        };

        out.push(Finding {
            kind: FindingKind::QueryHotspot {
                query: query.id,
                total_cpu_ms: total,
            },
            subject: format!("query {}", query.query_id),
            severity,
            reason: format!(
                "{total:.0} ms total CPU over {} executions (avg {:.1} ms CPU, {:.1} ms duration, {:.0} logical reads; {origin})",
                query.execution_count,
                query.avg_cpu_ms,
                query.avg_duration_ms,
                query.avg_logical_reads
            ),
            action: format!("Tune query {}", query.query_id),
            risk,
            magnitude: total,
            ddl: None,
        });
    }
}
