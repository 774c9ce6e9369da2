//! Tests for the layered configuration system.

use std::sync::Mutex;

use sqlaudit_core::config::{AuditConfig, CliOverrides};
use sqlaudit_core::errors::ConfigError;
use sqlaudit_core::Phase;

/// Serializes tests that touch process environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn tempdir() -> tempfile::TempDir {
    tempfile::TempDir::new().unwrap()
}

/// Clear SQLAUDIT_ variables and point HOME at an empty directory so the
/// developer's own user config never leaks into a test.
fn isolate_env(home: &std::path::Path) {
    for key in [
        "SQLAUDIT_CAPTURE",
        "SQLAUDIT_PHASES",
        "SQLAUDIT_TOP_N",
        "SQLAUDIT_MIN_IMPACT",
        "SQLAUDIT_CONCURRENCY",
        "SQLAUDIT_TIMEOUT_SECS",
        "SQLAUDIT_UNUSED_WRITE_THRESHOLD",
        "SQLAUDIT_USE_QUERY_STORE",
        "SQLAUDIT_FORMAT",
    ] {
        std::env::remove_var(key);
    }
    std::env::set_var("HOME", home);
    std::env::remove_var("USERPROFILE");
}

/// Every layer contributes, and the highest one wins.
#[test]
fn test_layered_resolution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempdir();
    isolate_env(home.path());

    std::fs::create_dir_all(home.path().join(".sqlaudit")).unwrap();
    std::fs::write(
        home.path().join(".sqlaudit/config.toml"),
        r#"
[thresholds]
unused_write_threshold = 250
top_n = 5
"#,
    )
    .unwrap();

    let project = tempdir();
    std::fs::write(
        project.path().join("sqlaudit.toml"),
        r#"
[thresholds]
top_n = 8
min_impact = 10.0
"#,
    )
    .unwrap();

    std::env::set_var("SQLAUDIT_MIN_IMPACT", "25");

    let cli = CliOverrides {
        format: Some("json".to_string()),
        ..Default::default()
    };
    let config = AuditConfig::load(project.path(), Some(&cli)).unwrap();

    assert_eq!(config.thresholds.effective_unused_write_threshold(), 250);
    assert_eq!(config.thresholds.effective_top_n(), 8);
    assert_eq!(config.thresholds.effective_min_impact(), 25.0);
    assert_eq!(config.report.effective_format(), "json");

    isolate_env(home.path());
}

/// Missing files fall back to compiled defaults.
#[test]
fn test_defaults_when_no_files() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempdir();
    isolate_env(home.path());

    let config = AuditConfig::load(tempdir().path(), None).unwrap();
    assert_eq!(config.thresholds.effective_top_n(), 20);
    assert_eq!(config.thresholds.effective_min_impact(), 0.0);
    assert_eq!(config.thresholds.effective_unused_write_threshold(), 100);
    assert_eq!(config.thresholds.effective_missing_index_per_table_cap(), 5);
    assert_eq!(config.scan.effective_concurrency(), 5);
    assert_eq!(config.scan.effective_phases().len(), 5);
    assert!(config.scan.effective_degraded_phases().is_empty());
    assert!(!config.source.effective_use_query_store());
    assert_eq!(config.report.effective_format(), "console");
}

/// CLI flags beat environment variables.
#[test]
fn test_cli_over_env() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempdir();
    isolate_env(home.path());

    std::env::set_var("SQLAUDIT_TOP_N", "3");
    let cli = CliOverrides {
        top_n: Some(7),
        phases: Some(vec!["metadata".into(), "wait-stats".into()]),
        ..Default::default()
    };
    let config = AuditConfig::load(tempdir().path(), Some(&cli)).unwrap();
    assert_eq!(config.thresholds.effective_top_n(), 7);
    let phases = config.scan.effective_phases();
    assert_eq!(phases.len(), 2);
    assert!(phases.contains(&Phase::WaitStats));

    isolate_env(home.path());
}

/// Environment phase lists are comma-separated.
#[test]
fn test_env_phase_list() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempdir();
    isolate_env(home.path());

    std::env::set_var("SQLAUDIT_PHASES", "metadata, missing_index");
    let config = AuditConfig::load(tempdir().path(), None).unwrap();
    let phases = config.scan.effective_phases();
    assert!(phases.contains(&Phase::MissingIndex));
    assert!(!phases.contains(&Phase::QueryStats));

    isolate_env(home.path());
}

/// Invalid TOML in the project file is a parse error.
#[test]
fn test_invalid_toml_syntax() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempdir();
    isolate_env(home.path());

    let project = tempdir();
    std::fs::write(project.path().join("sqlaudit.toml"), "not = [valid toml").unwrap();

    match AuditConfig::load(project.path(), None) {
        Err(ConfigError::ParseError { .. }) => {}
        other => panic!("Expected ParseError, got: {:?}", other),
    }
}

/// Metadata can never be listed as a degraded phase.
#[test]
fn test_metadata_cannot_be_degraded() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempdir();
    isolate_env(home.path());

    let cli = CliOverrides {
        degraded_phases: Some(vec!["metadata".into()]),
        ..Default::default()
    };
    match AuditConfig::load(tempdir().path(), Some(&cli)) {
        Err(ConfigError::ValidationFailed { field, .. }) => {
            assert_eq!(field, "scan.degraded_phases");
        }
        other => panic!("Expected ValidationFailed, got: {:?}", other),
    }
}

/// Out-of-range thresholds are rejected after merging.
#[test]
fn test_invalid_values() {
    let config = AuditConfig::from_toml(
        r#"
[thresholds]
critical_impact = 140.0
"#,
    )
    .unwrap();
    match AuditConfig::validate(&config) {
        Err(ConfigError::ValidationFailed { field, .. }) => {
            assert_eq!(field, "thresholds.critical_impact");
        }
        other => panic!("Expected ValidationFailed, got: {:?}", other),
    }

    let config = AuditConfig::from_toml(
        r#"
[thresholds]
important_impact = 90.0
critical_impact = 80.0
"#,
    )
    .unwrap();
    assert!(AuditConfig::validate(&config).is_err());

    let config = AuditConfig::from_toml("[thresholds]\nmissing_index_per_table_cap = 0\n").unwrap();
    assert!(AuditConfig::validate(&config).is_err());

    let config = AuditConfig::from_toml(
        "[thresholds]\nwait_critical_ms = 5000\nwait_important_ms = 20000\n",
    )
    .unwrap();
    assert!(AuditConfig::validate(&config).is_err());
    let config = AuditConfig::from_toml("[thresholds]\nwait_critical_ms = 120000\n").unwrap();
    assert_eq!(config.thresholds.effective_wait_critical_ms(), 120_000);
    assert!(AuditConfig::validate(&config).is_ok());
}

/// Unknown phases and formats are invalid values.
#[test]
fn test_unknown_phase_and_format() {
    let config = AuditConfig::from_toml("[scan]\nphases = [\"plan-cache\"]\n").unwrap();
    assert!(matches!(
        AuditConfig::validate(&config),
        Err(ConfigError::InvalidValue { .. })
    ));

    let config = AuditConfig::from_toml("[report]\nformat = \"xml\"\n").unwrap();
    assert!(matches!(
        AuditConfig::validate(&config),
        Err(ConfigError::InvalidValue { .. })
    ));
}

/// Unknown keys are ignored.
#[test]
fn test_unrecognized_keys_accepted() {
    let config = AuditConfig::from_toml(
        r#"
[scan]
timeout_secs = 60
future_key = "x"

[future_section]
answer = 42
"#,
    )
    .unwrap();
    assert_eq!(config.scan.effective_timeout_secs(), 60);
}

/// Serializing and re-parsing preserves every set value.
#[test]
fn test_config_round_trip() {
    let config = AuditConfig::from_toml(
        r#"
[scan]
phases = ["metadata", "index-usage"]
degraded_phases = ["index-usage"]

[thresholds]
unused_write_threshold = 42
stale_statistics_ratio = 0.5

[design]
staging_schemas = ["landing"]

[source]
use_query_store = true
"#,
    )
    .unwrap();

    let text = config.to_toml().unwrap();
    let back = AuditConfig::from_toml(&text).unwrap();
    assert_eq!(back.scan.phases, config.scan.phases);
    assert_eq!(back.thresholds.effective_unused_write_threshold(), 42);
    assert_eq!(back.thresholds.effective_stale_statistics_ratio(), 0.5);
    assert_eq!(back.design.effective_staging_schemas(), vec!["landing".to_string()]);
    assert!(back.source.effective_use_query_store());
}

/// Audit column names are normalized to lowercase without underscores.
#[test]
fn test_audit_columns_normalized() {
    let config = AuditConfig::from_toml("[design]\naudit_created_columns = [\"Created_At\"]\n").unwrap();
    assert_eq!(config.design.effective_audit_created_columns(), vec!["createdat".to_string()]);
    assert!(config
        .design
        .effective_audit_modified_columns()
        .contains(&"updatedat".to_string()));
}
