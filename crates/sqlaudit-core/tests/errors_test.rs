//! Tests for error codes and phase parsing.

use proptest::prelude::*;

use sqlaudit_core::errors::*;
use sqlaudit_core::types::{ObjectName, Phase, SkipReason};

/// Codes are stable and prefixed in coded strings.
#[test]
fn test_error_codes() {
    let err = CollectError::AccessDenied {
        object: "sys.tables".into(),
        message: "denied".into(),
    };
    assert_eq!(err.error_code(), "ACCESS_DENIED");
    assert!(err.coded_string().starts_with("[ACCESS_DENIED] "));

    let scan: ScanError = CollectError::ConnectionFailure {
        message: "refused".into(),
    }
    .into();
    assert_eq!(scan.error_code(), "CONNECTION_FAILURE");

    let scan: ScanError = ConfigError::InvalidValue {
        field: "phase".into(),
        message: "bad".into(),
    }
    .into();
    assert_eq!(scan.error_code(), "CONFIG_ERROR");
    assert_eq!(ScanError::Cancelled.error_code(), "CANCELLED");
    assert_eq!(ScanError::TimedOut { after_ms: 10 }.error_code(), "TIMED_OUT");
}

/// Collector errors map to the skip reason the header reports.
#[test]
fn test_skip_reasons() {
    let denied = CollectError::AccessDenied {
        object: "sys.dm_db_missing_index_details".into(),
        message: "denied".into(),
    };
    assert_eq!(denied.skip_reason(), SkipReason::InsufficientPermission);
    assert!(!denied.is_fatal());

    let off = CollectError::SignalUnavailable {
        phase: Phase::QueryStats,
        reason: SkipReason::FeatureNotEnabled,
        detail: "query store off".into(),
    };
    assert_eq!(off.skip_reason(), SkipReason::FeatureNotEnabled);
    assert!(CollectError::ConnectionFailure { message: "x".into() }.is_fatal());
    assert_eq!(SkipReason::InsufficientPermission.to_string(), "insufficient permission");
}

/// Phase lists parse with either separator style and default to all phases.
#[test]
fn test_phase_list_parsing() {
    let all = Phase::parse_list("").unwrap();
    assert_eq!(all.len(), 5);

    let some = Phase::parse_list("metadata,query_stats, Wait-Stats").unwrap();
    assert_eq!(some.len(), 3);
    assert!(some.contains(&Phase::QueryStats));
    assert!(Phase::parse_list("metadata,bogus").is_err());
}

fn ident() -> impl Strategy<Value = String> {
    "[A-Za-z_][A-Za-z0-9_ .\\]]{0,12}"
}

proptest! {
    /// Any quoted schema/name pair resolves back to itself.
    #[test]
    fn prop_quoted_names_resolve(schema in ident(), name in ident()) {
        prop_assume!(!schema.trim().is_empty() && !name.trim().is_empty());
        prop_assume!(schema.trim() == schema && name.trim() == name);
        let original = ObjectName::new(schema, name);
        let parsed = ObjectName::parse(&original.quoted()).unwrap();
        prop_assert_eq!(parsed.key(), original.key());
    }

    /// Keys ignore case.
    #[test]
    fn prop_keys_case_insensitive(schema in "[a-z]{1,8}", name in "[a-z]{1,8}") {
        let lower = ObjectName::new(schema.clone(), name.clone());
        let upper = ObjectName::new(schema.to_uppercase(), name.to_uppercase());
        prop_assert_eq!(lower.key(), upper.key());
    }

    /// Every phase name parses back to itself.
    #[test]
    fn prop_phase_round_trip(idx in 0usize..5) {
        let phase = Phase::all()[idx];
        prop_assert_eq!(phase.as_str().parse::<Phase>().unwrap(), phase);
    }
}
