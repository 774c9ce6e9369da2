//! Redundant-index collapse, missing-index convergence, per-table cap.

mod common;

use common::{scan, Fixture};
use proptest::prelude::*;
use sqlaudit_analysis::report::{AuditReport, CaveatKind, Recommendation};
use sqlaudit_analysis::scoring::Category;
use sqlaudit_analysis::Severity;

fn of_category(report: &AuditReport, category: Category) -> Vec<&Recommendation> {
    report
        .recommendations()
        .filter(|r| r.category == category)
        .collect()
}

#[test]
fn test_prefix_index_is_one_redundant_finding() {
    let mut fx = Fixture::new();
    fx.table("Orders", 10_000)
        .index("Orders", "IX_A", &["CustomerID"], &[])
        .usage("Orders", "IX_A", 0, 500)
        .index("Orders", "IX_AB", &["CustomerID", "OrderDate"], &[])
        .usage("Orders", "IX_AB", 900, 500);

    let report = scan(fx.source()).unwrap();
    let redundant = of_category(&report, Category::RedundantIndex);
    assert_eq!(redundant.len(), 1);
    assert_eq!(redundant[0].subject, "dbo.Orders.IX_A");
    assert_eq!(redundant[0].severity, Severity::Important);
    assert!(redundant[0].reason.contains("[IX_AB]"));
    assert!(of_category(&report, Category::UnusedIndex).is_empty());
    assert_eq!(report.scorecard.drop.count, 1);
}

#[test]
fn test_read_redundant_index_is_advisory() {
    let mut fx = Fixture::new();
    fx.table("Orders", 10_000)
        .index("Orders", "IX_A", &["CustomerID"], &[])
        .usage("Orders", "IX_A", 50, 500)
        .index("Orders", "IX_AB", &["CustomerID", "OrderDate"], &[]);

    let report = scan(fx.source()).unwrap();
    let redundant = of_category(&report, Category::RedundantIndex);
    assert_eq!(redundant.len(), 1);
    assert_eq!(redundant[0].severity, Severity::Advisory);
}

#[test]
fn test_non_prefix_overlap_is_not_redundant() {
    let mut fx = Fixture::new();
    fx.table("Orders", 10_000)
        .index("Orders", "IX_B", &["OrderDate"], &[])
        .index("Orders", "IX_AB", &["CustomerID", "OrderDate"], &[]);

    let report = scan(fx.source()).unwrap();
    assert!(of_category(&report, Category::RedundantIndex).is_empty());
}

#[test]
fn test_unique_narrow_index_is_kept() {
    let mut fx = Fixture::new();
    fx.table("Orders", 10_000)
        .unique_index("Orders", "UX_A", &["CustomerID"])
        .index("Orders", "IX_AB", &["CustomerID", "OrderDate"], &[]);

    let report = scan(fx.source()).unwrap();
    assert!(of_category(&report, Category::RedundantIndex).is_empty());
}

#[test]
fn test_identical_keys_flag_only_one_index() {
    let mut fx = Fixture::new();
    fx.table("Orders", 10_000)
        .index("Orders", "IX_First", &["Status"], &[])
        .index("Orders", "IX_Second", &["Status"], &[]);

    let report = scan(fx.source()).unwrap();
    let redundant = of_category(&report, Category::RedundantIndex);
    assert_eq!(redundant.len(), 1);
    assert_eq!(redundant[0].subject, "dbo.Orders.IX_Second");
}

#[test]
fn test_converging_candidates_merge_query_counts() {
    let mut fx = Fixture::new();
    fx.table("Orders", 10_000)
        .missing("Orders", "[CustomerID], [Status]", None, 60.0, 300, 0)
        .missing("Orders", "[Status], [CustomerID]", None, 70.0, 250, 0)
        .missing("Orders", "[OrderDate]", None, 40.0, 10, 0);

    let report = scan(fx.source()).unwrap();
    let missing = of_category(&report, Category::MissingIndex);
    assert_eq!(missing.len(), 2);
    let merged = missing
        .iter()
        .find(|r| r.subject.contains("CustomerID"))
        .unwrap();
    assert!(merged.reason.contains("550 queries"));
    assert!(merged.reason.contains("70%"));
    // Both source candidates stay as evidence.
    assert_eq!(merged.evidence.len(), 3);
}

#[test]
fn test_cap_adds_a_caveat() {
    let mut fx = Fixture::new();
    fx.table("Orders", 10_000);
    for i in 0..8 {
        fx.missing("Orders", &format!("[Col{i}]"), None, 30.0 + i as f64, 10, 0);
    }

    let report = scan(fx.source()).unwrap();
    let missing = of_category(&report, Category::MissingIndex);
    assert_eq!(missing.len(), 5);
    // The three lowest-impact candidates are the ones dropped.
    assert!(!missing.iter().any(|r| r.subject.contains("(Col0)")));
    assert!(missing.iter().any(|r| r.subject.contains("(Col7)")));
    let caps: Vec<_> = report
        .caveats
        .iter()
        .filter(|c| c.kind == CaveatKind::CapApplied)
        .collect();
    assert_eq!(caps.len(), 1);
    assert!(caps[0].message.contains("dbo.Orders: 3 lower-ranked"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_missing_indexes_never_exceed_cap(counts in prop::collection::vec(1usize..12, 1..4)) {
        let mut fx = Fixture::new();
        for (t, count) in counts.iter().enumerate() {
            let table = format!("T{t}");
            fx.table(&table, 1_000);
            for c in 0..*count {
                fx.missing(&table, &format!("[C{c}]"), None, 20.0 + c as f64, 5, 0);
            }
        }

        let report = scan(fx.source()).unwrap();
        for (t, count) in counts.iter().enumerate() {
            let prefix = format!("dbo.T{t} (");
            let kept = report
                .recommendations()
                .filter(|r| r.category == Category::MissingIndex && r.subject.starts_with(&prefix))
                .count();
            prop_assert_eq!(kept, (*count).min(5));
        }
        let capped_tables = counts.iter().filter(|c| **c > 5).count();
        let cap_caveats = report
            .caveats
            .iter()
            .filter(|c| c.kind == CaveatKind::CapApplied)
            .count();
        prop_assert_eq!(cap_caveats, capped_tables);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// The same telemetry always produces the same report.
    #[test]
    fn prop_scans_are_idempotent(
        usage in prop::collection::vec((0u64..50, 0u64..2_000), 1..6),
        impacts in prop::collection::vec(1.0f64..99.0, 0..4),
    ) {
        let build = || {
            let mut fx = Fixture::new();
            fx.table("Orders", 50_000);
            for (i, (reads, writes)) in usage.iter().enumerate() {
                let name = format!("IX_Orders_{i}");
                let key = format!("K{i}");
                fx.index("Orders", &name, &[key.as_str()], &[]);
                fx.usage("Orders", &name, *reads, *writes);
            }
            for (i, impact) in impacts.iter().enumerate() {
                fx.missing("Orders", &format!("[M{i}]"), None, *impact, 100, 0);
            }
            fx
        };

        let first = scan(build().source()).unwrap();
        let second = scan(build().source()).unwrap();
        prop_assert_eq!(first, second);
    }
}
