//! End-to-end engine behavior: phase outcomes, interrupts, determinism.

mod common;

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use common::{scan, scan_with, Fixture};
use proptest::prelude::*;
use sqlaudit_analysis::collect::collect;
use sqlaudit_analysis::report::{CaveatKind, PhaseStatus};
use sqlaudit_analysis::scoring::Category;
use sqlaudit_analysis::{AuditEngine, ScanRequest, Severity};
use sqlaudit_core::config::AuditConfig;
use sqlaudit_core::events::{
    AuditEventHandler, EventDispatcher, PhaseSkippedEvent, ScanCompleteEvent,
};
use sqlaudit_core::types::QueryStatRow;
use sqlaudit_core::{Cancellable, CancellationToken, CollectError, Phase, ScanError, SkipReason};

fn busy_fixture() -> Fixture {
    let mut fx = Fixture::new();
    fx.table("Orders", 50_000)
        .index("Orders", "IX_Orders_Status", &["Status"], &[])
        .usage("Orders", "IX_Orders_Status", 0, 800)
        .index("Orders", "IX_A", &["CustomerID"], &[])
        .index("Orders", "IX_AB", &["CustomerID", "OrderDate"], &[])
        .missing("Orders", "[ShipDate]", None, 85.0, 700, 0)
        .query("q1", 900.0, 50, 1_200.0)
        .query("q2", 10.0, 10, 5.0)
        .wait("PAGEIOLATCH_SH", 60_000)
        .wait("LCK_M_X", 40_000)
        .statistics("Orders", "ST_Orders_Status", 50_000, 30_000);
    fx
}

fn keys(report: &sqlaudit_analysis::AuditReport) -> BTreeSet<(Category, String)> {
    report
        .recommendations()
        .map(|r| (r.category, r.subject.clone()))
        .collect()
}

#[test]
fn test_full_scan_reports_every_phase() {
    let report = scan(busy_fixture().source()).unwrap();
    assert_eq!(report.header.source, "fixture/Sales");
    assert_eq!(report.header.scanned_at, common::SNAPSHOT_TIME);
    assert_eq!(report.header.table_count, 1);
    assert_eq!(report.header.phases.len(), 5);
    for phase in &report.header.phases {
        assert!(
            matches!(phase.status, PhaseStatus::Ran { .. }),
            "{} did not run",
            phase.phase
        );
    }
    assert!(report.has_critical());
    assert!(report.caveats.is_empty());
}

#[test]
fn test_reduce_is_deterministic() {
    let request = ScanRequest::default();
    let source = Arc::new(busy_fixture().source());
    let raw = collect(
        source,
        &request,
        &CancellationToken::new(),
        &EventDispatcher::new(),
    )
    .unwrap();

    let engine = AuditEngine::default();
    let first = engine.reduce(&raw, &request);
    let second = engine.reduce(&raw, &request);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_scanning_twice_gives_identical_reports() {
    let first = scan(busy_fixture().source()).unwrap();
    let second = scan(busy_fixture().source()).unwrap();
    assert_eq!(first, second);
}

/// Scenario D: a denied signal is skipped, not fatal.
#[test]
fn test_denied_missing_index_phase_is_skipped() {
    let report = scan(busy_fixture().source().deny(Phase::MissingIndex)).unwrap();

    let status = &report.phase(Phase::MissingIndex).unwrap().status;
    assert!(matches!(
        status,
        PhaseStatus::Skipped {
            reason: SkipReason::InsufficientPermission,
            ..
        }
    ));
    assert_eq!(status.to_string(), "skipped: insufficient permission");
    assert!(report
        .caveats
        .iter()
        .any(|c| c.kind == CaveatKind::PhaseSkipped && c.message.starts_with("missing-index skipped")));
    assert!(!report
        .recommendations()
        .any(|r| r.category == Category::MissingIndex));
    // Other phases still produce findings.
    assert!(report
        .recommendations()
        .any(|r| r.category == Category::UnusedIndex));
}

#[test]
fn test_fewer_phases_never_add_findings() {
    let full = scan(busy_fixture().source()).unwrap();
    let full_keys = keys(&full);

    for dropped in [
        Phase::IndexUsage,
        Phase::MissingIndex,
        Phase::QueryStats,
        Phase::WaitStats,
    ] {
        let mut request = ScanRequest::default();
        request.phases.remove(&dropped);
        let partial = scan_with(busy_fixture().source(), &request).unwrap();
        assert!(
            keys(&partial).is_subset(&full_keys),
            "dropping {dropped} added findings"
        );
        assert!(matches!(
            partial.phase(dropped).unwrap().status,
            PhaseStatus::Skipped {
                reason: SkipReason::NotRequested,
                ..
            }
        ));
        assert!(!partial
            .caveats
            .iter()
            .any(|c| c.kind == CaveatKind::PhaseSkipped));
    }
}

#[test]
fn test_empty_signal_differs_from_skipped_signal() {
    let mut fx = Fixture::new();
    fx.table("Orders", 100);
    let empty = scan(fx.source()).unwrap();
    assert_eq!(empty.phase(Phase::WaitStats).unwrap().status, PhaseStatus::Empty);
    assert!(empty
        .caveats
        .iter()
        .any(|c| c.kind == CaveatKind::EmptySignal && c.message.starts_with("wait-stats")));

    let skipped = scan(fx.source().disable(Phase::WaitStats)).unwrap();
    let status = &skipped.phase(Phase::WaitStats).unwrap().status;
    assert_eq!(status.to_string(), "skipped: feature not enabled");
}

#[test]
fn test_metadata_failure_is_fatal() {
    let err = scan(busy_fixture().source().deny(Phase::Metadata)).unwrap_err();
    assert!(matches!(
        err,
        ScanError::Collect(CollectError::AccessDenied { .. })
    ));
}

#[test]
fn test_connection_failure_is_fatal() {
    let err = scan(busy_fixture().source().offline()).unwrap_err();
    assert!(matches!(
        err,
        ScanError::Collect(CollectError::ConnectionFailure { .. })
    ));
}

#[test]
fn test_cancelled_before_start() {
    let token = CancellationToken::new();
    token.cancel();
    let err = AuditEngine::default()
        .run(
            Arc::new(busy_fixture().source()),
            &ScanRequest::default(),
            &token,
        )
        .unwrap_err();
    assert!(matches!(err, ScanError::Cancelled));
}

#[test]
fn test_cancel_during_collection_discards_snapshot() {
    let source = busy_fixture()
        .source()
        .delay(Phase::WaitStats, Duration::from_millis(1_500));
    let token = CancellationToken::new();
    let canceller = token.clone();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        canceller.cancel();
    });

    let err = AuditEngine::default()
        .run(Arc::new(source), &ScanRequest::default(), &token)
        .unwrap_err();
    handle.join().unwrap();
    assert!(matches!(err, ScanError::Cancelled));
}

#[test]
fn test_cancel_with_degraded_phase_keeps_partial_report() {
    let source = busy_fixture()
        .source()
        .delay(Phase::WaitStats, Duration::from_millis(1_500));
    let mut request = ScanRequest::default();
    request.degraded_phases.insert(Phase::WaitStats);
    let token = CancellationToken::new();
    let canceller = token.clone();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(300));
        canceller.cancel();
    });

    let report = AuditEngine::default()
        .run(Arc::new(source), &request, &token)
        .unwrap();
    handle.join().unwrap();
    assert!(matches!(
        report.phase(Phase::WaitStats).unwrap().status,
        PhaseStatus::Skipped {
            reason: SkipReason::Cancelled,
            ..
        }
    ));
    assert!(report
        .recommendations()
        .any(|r| r.category == Category::UnusedIndex));
}

#[test]
fn test_timeout_without_degraded_phases_fails() {
    let source = busy_fixture()
        .source()
        .delay(Phase::QueryStats, Duration::from_millis(1_500));
    let mut request = ScanRequest::default();
    request.timeout = Duration::from_millis(200);

    let err = scan_with(source, &request).unwrap_err();
    assert!(matches!(err, ScanError::TimedOut { .. }));
}

#[test]
fn test_timeout_with_degraded_phase_skips_it() {
    let source = busy_fixture()
        .source()
        .delay(Phase::QueryStats, Duration::from_millis(1_500));
    let mut request = ScanRequest::default();
    request.timeout = Duration::from_millis(500);
    request.degraded_phases.insert(Phase::QueryStats);

    let report = scan_with(source, &request).unwrap();
    let status = &report.phase(Phase::QueryStats).unwrap().status;
    assert_eq!(status.to_string(), "skipped: timed out");
    assert!(!report
        .recommendations()
        .any(|r| r.category == Category::QueryHotspot));
    assert!(matches!(
        report.phase(Phase::WaitStats).unwrap().status,
        PhaseStatus::Ran { .. }
    ));
}

#[test]
fn test_query_store_fallback_adds_caveat() {
    let mut request = ScanRequest::default();
    request.use_query_store = true;

    let report = scan_with(busy_fixture().source(), &request).unwrap();
    let fallback: Vec<_> = report
        .caveats
        .iter()
        .filter(|c| c.kind == CaveatKind::QueryStoreFallback)
        .collect();
    assert_eq!(fallback.len(), 1);
    assert!(fallback[0].message.contains("feature not enabled"));
    assert!(report.recommendations().any(|r| r.subject == "query q1"));
}

#[test]
fn test_query_store_is_preferred_when_available() {
    let mut fx = busy_fixture();
    fx.query_store = Some(vec![QueryStatRow {
        query_id: "qs-42".into(),
        avg_cpu_ms: 500.0,
        avg_logical_reads: 10.0,
        avg_duration_ms: 600.0,
        execution_count: 100,
        query_text: None,
        plan_ref: None,
    }]);
    let mut request = ScanRequest::default();
    request.use_query_store = true;

    let report = scan_with(fx.source(), &request).unwrap();
    assert!(!report
        .caveats
        .iter()
        .any(|c| c.kind == CaveatKind::QueryStoreFallback));
    let hotspots: Vec<_> = report
        .recommendations()
        .filter(|r| r.category == Category::QueryHotspot)
        .collect();
    assert_eq!(hotspots.len(), 1);
    assert_eq!(hotspots[0].subject, "query qs-42");
}

#[test]
fn test_rows_for_vanished_objects_are_discarded() {
    let mut fx = busy_fixture();
    fx.usage("Dropped", "IX_Gone", 0, 10_000);

    let report = scan(fx.source()).unwrap();
    let vanished: Vec<_> = report
        .caveats
        .iter()
        .filter(|c| c.kind == CaveatKind::ObjectVanished)
        .collect();
    assert_eq!(vanished.len(), 1);
    assert!(vanished[0].message.starts_with("1 index-usage row(s)"));
    assert!(!report.recommendations().any(|r| r.subject.contains("IX_Gone")));
}

#[test]
fn test_invalid_config_fails_before_collection() {
    let mut config = AuditConfig::default();
    config.scan.concurrency = Some(0);
    let err = AuditEngine::new(config)
        .run(
            Arc::new(busy_fixture().source()),
            &ScanRequest::default(),
            &CancellationToken::new(),
        )
        .unwrap_err();
    assert!(matches!(err, ScanError::Config(_)));
}

#[derive(Default)]
struct Counter {
    skipped: AtomicUsize,
    completed: AtomicUsize,
}

impl AuditEventHandler for Counter {
    fn on_phase_skipped(&self, _event: &PhaseSkippedEvent) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
    }

    fn on_scan_complete(&self, _event: &ScanCompleteEvent) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_events_reach_registered_handlers() {
    let counter = Arc::new(Counter::default());
    let mut events = EventDispatcher::new();
    events.register(counter.clone());
    let engine = AuditEngine::default().with_events(events);

    engine
        .run(
            Arc::new(
                busy_fixture()
                    .source()
                    .deny(Phase::WaitStats)
                    .disable(Phase::QueryStats),
            ),
            &ScanRequest::default(),
            &CancellationToken::new(),
        )
        .unwrap();
    assert_eq!(counter.skipped.load(Ordering::SeqCst), 2);
    assert_eq!(counter.completed.load(Ordering::SeqCst), 1);
}

/// One Critical finding in each of four categories.
fn critical_fixture() -> Fixture {
    let mut fx = Fixture::new();
    fx.table("Orders", 50_000)
        .index("Orders", "IX_Orders_Status", &["Status"], &[])
        .usage("Orders", "IX_Orders_Status", 0, 5_000)
        .missing("Orders", "[ShipDate]", None, 85.0, 700, 0)
        .query("slow", 50.0, 100, 2_000.0)
        .wait("PAGEIOLATCH_SH", 90_000);
    fx
}

fn critical_keys(report: &sqlaudit_analysis::AuditReport) -> BTreeSet<(Category, String)> {
    report
        .critical
        .iter()
        .map(|r| (r.category, r.subject.clone()))
        .collect()
}

#[test]
fn test_heavy_unrelated_wait_keeps_critical_wait() {
    let base = scan(critical_fixture().source()).unwrap();
    let mut fx = critical_fixture();
    fx.wait("LCK_M_X", 200_000);
    let extended = scan(fx.source()).unwrap();

    let severity_of = |report: &sqlaudit_analysis::AuditReport| {
        report
            .recommendations()
            .find(|r| r.subject == "PAGEIOLATCH_SH")
            .map(|r| r.severity)
    };
    assert_eq!(severity_of(&base), Some(Severity::Critical));
    assert_eq!(severity_of(&extended), Some(Severity::Critical));
}

#[test]
fn test_many_heavier_queries_keep_slow_hotspot() {
    let mut fx = critical_fixture();
    for i in 0..30 {
        fx.query(&format!("heavy{i:02}"), 1_000.0, 1_000, 20.0);
    }
    let report = scan(fx.source()).unwrap();
    assert!(report
        .critical
        .iter()
        .any(|r| r.subject == "query slow"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Unrelated high-severity evidence never removes or downgrades a Critical finding.
    #[test]
    fn prop_unrelated_signals_keep_criticals(
        waits in prop::collection::vec(
            (
                prop::sample::select(vec!["LCK_M_X", "WRITELOG", "CXPACKET", "RESOURCE_SEMAPHORE", "ODD_WAIT"]),
                1u64..50_000_000,
            ),
            0..15,
        ),
        queries in prop::collection::vec((1.0f64..10_000.0, 1u64..100_000, 0.0f64..5_000.0), 0..30),
        tables in prop::collection::vec((50.0f64..100.0, 1u64..5_000), 0..8),
    ) {
        let base = critical_keys(&scan(critical_fixture().source()).unwrap());
        prop_assert_eq!(base.len(), 4);

        let mut fx = critical_fixture();
        for (wait, ms) in &waits {
            fx.wait(wait, *ms);
        }
        for (i, (cpu, executions, duration)) in queries.iter().enumerate() {
            fx.query(&format!("extra{i:02}"), *cpu, *executions, *duration);
        }
        for (i, (impact, seeks)) in tables.iter().enumerate() {
            let table = format!("Other{i}");
            fx.table(&table, 10_000);
            fx.missing(&table, "[Region]", None, *impact, *seeks, 0);
        }

        let extended = critical_keys(&scan(fx.source()).unwrap());
        prop_assert!(
            base.is_subset(&extended),
            "lost critical findings: {:?}",
            base.difference(&extended).collect::<Vec<_>>()
        );
    }
}
