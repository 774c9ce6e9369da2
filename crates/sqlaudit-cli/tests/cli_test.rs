//! Command tests driven through `sqlaudit_cli::run`.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use sqlaudit_analysis::AuditReport;
use sqlaudit_cli::{run, Cli, CliError, Outcome};
use sqlaudit_core::types::*;
use sqlaudit_storage::queries::{catalog, index_usage, missing_index};
use sqlaudit_storage::CaptureWriter;

fn invoke(args: &[&str]) -> (Result<Outcome, CliError>, String) {
    let cli = Cli::parse_from(std::iter::once("sqlaudit").chain(args.iter().copied()));
    let mut out = Vec::new();
    let result = run(&cli, &mut out);
    (result, String::from_utf8(out).unwrap())
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn sample_catalog() -> CatalogRows {
    let table = |name: &str| TableRow {
        schema: "dbo".into(),
        table: name.into(),
        row_count: 10_000,
        size_bytes: 1_000_000,
        storage: "clustered".into(),
        has_primary_key: true,
        trigger_count: 0,
    };
    let column = |table: &str, name: &str, ordinal: u32, pk: bool| ColumnRow {
        schema: "dbo".into(),
        table: table.into(),
        column: name.into(),
        data_type: if pk { "int".into() } else { "datetime2".into() },
        is_nullable: !pk,
        ordinal,
        is_primary_key: pk,
    };
    CatalogRows {
        tables: vec![table("Orders"), table("Customers")],
        columns: vec![
            column("Orders", "OrderID", 1, true),
            column("Orders", "CreatedAt", 2, false),
            column("Orders", "ModifiedAt", 3, false),
            column("Customers", "CustomerID", 1, true),
            column("Customers", "CreatedAt", 2, false),
            column("Customers", "ModifiedAt", 3, false),
        ],
        indexes: vec![IndexRow {
            schema: "dbo".into(),
            table: "Orders".into(),
            index_name: "IX_Orders_Created".into(),
            index_type: "nonclustered".into(),
            is_unique: false,
            is_primary_key: false,
            is_unique_constraint: false,
        }],
        index_columns: vec![IndexColumnRow {
            schema: "dbo".into(),
            table: "Orders".into(),
            index_name: "IX_Orders_Created".into(),
            column: "CreatedAt".into(),
            key_ordinal: 1,
            is_included: false,
        }],
        statistics: Vec::new(),
    }
}

/// A capture with one unused index and, optionally, a Critical missing index.
fn write_capture(dir: &Path, critical: bool) -> PathBuf {
    let path = dir.join("sales.sqlaudit");
    let writer = CaptureWriter::create(&path).unwrap();
    writer
        .with_transaction(|tx| {
            catalog::insert_catalog(tx, &sample_catalog())?;
            index_usage::insert_usage(
                tx,
                &[IndexUsageRow {
                    schema: "dbo".into(),
                    table: "Orders".into(),
                    index_name: "IX_Orders_Created".into(),
                    user_seeks: 0,
                    user_scans: 0,
                    user_lookups: 0,
                    user_updates: 400,
                }],
            )?;
            if critical {
                missing_index::insert_missing_indexes(
                    tx,
                    &[MissingIndexRow {
                        statement: "[Sales].[dbo].[Customers]".into(),
                        equality_columns: Some("[Region]".into()),
                        inequality_columns: None,
                        included_columns: None,
                        avg_user_impact: 92.0,
                        user_seeks: 900,
                        user_scans: 0,
                    }],
                )?;
            }
            Ok(())
        })
        .unwrap();
    path
}

#[test]
fn test_capture_init_creates_file_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("new.sqlaudit");

    let (result, out) = invoke(&["capture", "init", path_str(&path), "--database", "Sales"]);
    assert_eq!(result.unwrap(), Outcome::Clean);
    assert!(path.is_file());
    assert!(out.starts_with("Initialized capture at"));

    let (again, _) = invoke(&["capture", "init", path_str(&path)]);
    assert!(matches!(again, Err(CliError::Io { .. })));
}

#[test]
fn test_tables_lists_captured_tables() {
    let dir = tempfile::tempdir().unwrap();
    let capture = write_capture(dir.path(), false);

    let (result, out) = invoke(&["tables", "--capture", path_str(&capture)]);
    result.unwrap();
    assert!(out.contains("dbo.Orders"));
    assert!(out.contains("dbo.Customers"));
    assert!(out.ends_with("2 table(s)\n"));

    let (result, out) = invoke(&["tables", "--capture", path_str(&capture), "--schema", "sales"]);
    result.unwrap();
    assert!(out.ends_with("0 table(s)\n"));
}

#[test]
fn test_schemas_lists_captured_schemas() {
    let dir = tempfile::tempdir().unwrap();
    let capture = write_capture(dir.path(), false);

    let (result, out) = invoke(&["schemas", "--capture", path_str(&capture)]);
    assert_eq!(result.unwrap(), Outcome::Clean);
    assert!(out.starts_with("SCHEMA"));
    assert!(out.contains("dbo"));
    assert!(out.ends_with("1 schema(s)\n"));

    let (result, out) = invoke(&["schemas", "--capture", path_str(&capture), "--json"]);
    result.unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed[0]["schema"], "dbo");
    assert_eq!(parsed[0]["table_count"], 2);
    assert_eq!(parsed[0]["row_count"], 20_000);
}

#[test]
fn test_describe_shows_columns_and_indexes() {
    let dir = tempfile::tempdir().unwrap();
    let capture = write_capture(dir.path(), false);

    let (result, out) = invoke(&["describe", "--capture", path_str(&capture), "--table", "dbo.orders"]);
    result.unwrap();
    assert!(out.starts_with("dbo.Orders (10000 rows"));
    assert!(out.contains("OrderID"));
    assert!(out.contains("NOT NULL  PK"));
    assert!(out.contains("IX_Orders_Created [nonclustered] (CreatedAt)"));

    let (missing, _) = invoke(&["describe", "--capture", path_str(&capture), "--table", "Nope"]);
    assert!(matches!(missing, Err(CliError::TableNotFound { table }) if table == "dbo.Nope"));
}

#[test]
fn test_scan_exit_code_reflects_critical_findings() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_str().unwrap();

    let clean = write_capture(dir.path(), false);
    let (result, out) = invoke(&["--root", root, "scan", "--capture", path_str(&clean), "--no-color"]);
    assert_eq!(result.unwrap(), Outcome::Clean);
    assert!(out.contains("IX_Orders_Created"));
    assert!(out.contains("missing-index"));

    let other = tempfile::tempdir().unwrap();
    let critical = write_capture(other.path(), true);
    let (result, _) = invoke(&["--root", root, "scan", "--capture", path_str(&critical)]);
    let outcome = result.unwrap();
    assert_eq!(outcome, Outcome::CriticalFindings);
    assert_eq!(outcome.exit_code(), 2);
}

#[test]
fn test_scan_json_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_str().unwrap();
    let capture = write_capture(dir.path(), true);
    let output = dir.path().join("report.json");

    let (result, out) = invoke(&[
        "--root",
        root,
        "scan",
        "--capture",
        path_str(&capture),
        "--format",
        "json",
        "--phases",
        "metadata,missing-index",
        "--output",
        path_str(&output),
    ]);
    result.unwrap();
    assert!(out.starts_with("Report written to"));

    let report: AuditReport = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(report.critical.len(), 1);
    // index-usage was not requested, so the unused index is not reported.
    assert!(!report
        .recommendations()
        .any(|r| r.subject.contains("IX_Orders_Created")));
}

#[test]
fn test_scan_uses_project_config_capture_path() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_str().unwrap();
    write_capture(dir.path(), false);
    fs::write(
        dir.path().join("sqlaudit.toml"),
        "[source]\ncapture_path = \"sales.sqlaudit\"\n\n[report]\nformat = \"markdown\"\n",
    )
    .unwrap();

    let (result, out) = invoke(&["--root", root, "scan"]);
    result.unwrap();
    assert!(out.starts_with("# sqlaudit report"));
}

#[test]
fn test_scan_without_capture_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (result, _) = invoke(&["--root", dir.path().to_str().unwrap(), "scan"]);
    assert!(matches!(result, Err(CliError::MissingCapture)));
}

#[test]
fn test_scan_rejects_unknown_format() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_str().unwrap();
    let capture = write_capture(dir.path(), false);
    let (result, _) = invoke(&["--root", root, "scan", "--capture", path_str(&capture), "--format", "sarif"]);
    assert!(matches!(result, Err(CliError::Config(_))));
}

#[test]
fn test_scan_missing_capture_file_is_connection_failure() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_str().unwrap();
    let missing = dir.path().join("absent.sqlaudit");
    let (result, _) = invoke(&["--root", root, "scan", "--capture", path_str(&missing)]);
    let err = result.unwrap_err();
    assert!(matches!(
        err,
        CliError::Scan(sqlaudit_core::ScanError::Collect(
            sqlaudit_core::CollectError::ConnectionFailure { .. }
        ))
    ));
}

#[test]
fn test_scan_timeout_flag_is_validated() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_str().unwrap();
    let capture = write_capture(dir.path(), false);
    let (result, _) = invoke(&[
        "--root",
        root,
        "scan",
        "--capture",
        path_str(&capture),
        "--timeout-secs",
        "0",
    ]);
    assert!(matches!(result, Err(CliError::Config(_))));
}
