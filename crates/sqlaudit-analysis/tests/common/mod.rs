//! Shared fixtures: an in-memory `AuditSource` with per-phase failure and
//! delay injection.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use sqlaudit_analysis::{AuditEngine, AuditReport, ScanRequest};
use sqlaudit_core::types::*;
use sqlaudit_core::{AuditSource, CancellationToken, CollectError, Phase, ScanError, SkipReason};

pub const SNAPSHOT_TIME: i64 = 1_700_000_000;

/// Raw rows a fixture source serves.
#[derive(Debug, Clone, Default)]
pub struct Fixture {
    pub catalog: CatalogRows,
    pub usage: IndexUsageRows,
    pub missing: Vec<MissingIndexRow>,
    pub queries: Vec<QueryStatRow>,
    pub query_store: Option<Vec<QueryStatRow>>,
    pub waits: Vec<WaitStatRow>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clustered table with a primary key and both audit columns.
    pub fn table(&mut self, name: &str, rows: u64) -> &mut Self {
        self.catalog.tables.push(TableRow {
            schema: "dbo".into(),
            table: name.into(),
            row_count: rows,
            size_bytes: rows * 100,
            storage: "clustered".into(),
            has_primary_key: true,
            trigger_count: 0,
        });
        self.columns(name, &[("Id", "int"), ("CreatedAt", "datetime2"), ("ModifiedAt", "datetime2")])
    }

    /// A table with no primary key, no indexes and no columns.
    pub fn bare_table(&mut self, name: &str, rows: u64) -> &mut Self {
        self.catalog.tables.push(TableRow {
            schema: "dbo".into(),
            table: name.into(),
            row_count: rows,
            size_bytes: rows * 100,
            storage: "heap".into(),
            has_primary_key: false,
            trigger_count: 0,
        });
        self
    }

    pub fn columns(&mut self, table: &str, columns: &[(&str, &str)]) -> &mut Self {
        let start = self
            .catalog
            .columns
            .iter()
            .filter(|c| c.table == table)
            .count() as u32;
        for (i, (name, ty)) in columns.iter().enumerate() {
            self.catalog.columns.push(ColumnRow {
                schema: "dbo".into(),
                table: table.into(),
                column: (*name).into(),
                data_type: (*ty).into(),
                is_nullable: true,
                ordinal: start + i as u32 + 1,
                is_primary_key: false,
            });
        }
        self
    }

    pub fn index(&mut self, table: &str, name: &str, keys: &[&str], included: &[&str]) -> &mut Self {
        self.index_row(table, name, "nonclustered", false, false, keys, included)
    }

    pub fn unique_index(&mut self, table: &str, name: &str, keys: &[&str]) -> &mut Self {
        self.index_row(table, name, "nonclustered", true, false, keys, &[])
    }

    pub fn primary_key(&mut self, table: &str, name: &str, keys: &[&str]) -> &mut Self {
        self.index_row(table, name, "clustered", true, true, keys, &[])
    }

    #[allow(clippy::too_many_arguments)]
    fn index_row(
        &mut self,
        table: &str,
        name: &str,
        kind: &str,
        unique: bool,
        primary: bool,
        keys: &[&str],
        included: &[&str],
    ) -> &mut Self {
        self.catalog.indexes.push(IndexRow {
            schema: "dbo".into(),
            table: table.into(),
            index_name: name.into(),
            index_type: kind.into(),
            is_unique: unique,
            is_primary_key: primary,
            is_unique_constraint: false,
        });
        for (i, key) in keys.iter().enumerate() {
            self.catalog.index_columns.push(IndexColumnRow {
                schema: "dbo".into(),
                table: table.into(),
                index_name: name.into(),
                column: (*key).into(),
                key_ordinal: i as u32 + 1,
                is_included: false,
            });
        }
        for col in included {
            self.catalog.index_columns.push(IndexColumnRow {
                schema: "dbo".into(),
                table: table.into(),
                index_name: name.into(),
                column: (*col).into(),
                key_ordinal: 0,
                is_included: true,
            });
        }
        self
    }

    pub fn usage(&mut self, table: &str, index: &str, reads: u64, writes: u64) -> &mut Self {
        self.usage.usage.push(IndexUsageRow {
            schema: "dbo".into(),
            table: table.into(),
            index_name: index.into(),
            user_seeks: reads,
            user_scans: 0,
            user_lookups: 0,
            user_updates: writes,
        });
        self
    }

    pub fn fragmentation(&mut self, table: &str, index: &str, percent: f64, pages: u64) -> &mut Self {
        self.usage.physical.push(IndexPhysicalRow {
            schema: "dbo".into(),
            table: table.into(),
            index_name: index.into(),
            avg_fragmentation_percent: percent,
            page_count: pages,
        });
        self
    }

    pub fn statistics(&mut self, table: &str, name: &str, rows: u64, modifications: u64) -> &mut Self {
        self.catalog.statistics.push(StatisticsRow {
            schema: "dbo".into(),
            table: table.into(),
            stats_name: name.into(),
            rows,
            modification_counter: modifications,
            last_updated: Some(SNAPSHOT_TIME - 86_400),
        });
        self
    }

    pub fn missing(
        &mut self,
        table: &str,
        equality: &str,
        inequality: Option<&str>,
        impact: f64,
        seeks: u64,
        scans: u64,
    ) -> &mut Self {
        self.missing.push(MissingIndexRow {
            statement: format!("[Sales].[dbo].[{table}]"),
            equality_columns: Some(equality.into()).filter(|e: &String| !e.is_empty()),
            inequality_columns: inequality.map(str::to_string),
            included_columns: None,
            avg_user_impact: impact,
            user_seeks: seeks,
            user_scans: scans,
        });
        self
    }

    pub fn query(&mut self, id: &str, avg_cpu_ms: f64, executions: u64, avg_duration_ms: f64) -> &mut Self {
        self.queries.push(QueryStatRow {
            query_id: id.into(),
            avg_cpu_ms,
            avg_logical_reads: 1000.0,
            avg_duration_ms,
            execution_count: executions,
            query_text: Some(format!("SELECT /* {id} */ 1")),
            plan_ref: None,
        });
        self
    }

    pub fn wait(&mut self, wait_type: &str, wait_time_ms: u64) -> &mut Self {
        self.waits.push(WaitStatRow {
            wait_type: wait_type.into(),
            wait_time_ms,
            signal_wait_time_ms: wait_time_ms / 10,
            waiting_tasks_count: 100,
        });
        self
    }

    pub fn source(&self) -> FixtureSource {
        FixtureSource::new(self.clone())
    }
}

#[derive(Debug, Clone, Copy)]
enum Failure {
    Denied,
    Disabled,
}

/// In-memory source. Clones of the fixture are served on every read.
pub struct FixtureSource {
    fixture: Fixture,
    failures: HashMap<Phase, Failure>,
    delays: HashMap<Phase, Duration>,
    offline: bool,
}

impl FixtureSource {
    pub fn new(fixture: Fixture) -> Self {
        Self {
            fixture,
            failures: HashMap::new(),
            delays: HashMap::new(),
            offline: false,
        }
    }

    pub fn deny(mut self, phase: Phase) -> Self {
        self.failures.insert(phase, Failure::Denied);
        self
    }

    pub fn disable(mut self, phase: Phase) -> Self {
        self.failures.insert(phase, Failure::Disabled);
        self
    }

    pub fn delay(mut self, phase: Phase, delay: Duration) -> Self {
        self.delays.insert(phase, delay);
        self
    }

    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    fn gate(&self, phase: Phase) -> Result<(), CollectError> {
        if let Some(delay) = self.delays.get(&phase) {
            thread::sleep(*delay);
        }
        match self.failures.get(&phase) {
            Some(Failure::Denied) if phase == Phase::Metadata => Err(CollectError::AccessDenied {
                object: "catalog".into(),
                message: "VIEW DEFINITION denied".into(),
            }),
            Some(Failure::Denied) => Err(CollectError::SignalUnavailable {
                phase,
                reason: SkipReason::InsufficientPermission,
                detail: "VIEW SERVER STATE denied".into(),
            }),
            Some(Failure::Disabled) => Err(CollectError::SignalUnavailable {
                phase,
                reason: SkipReason::FeatureNotEnabled,
                detail: "feature is off".into(),
            }),
            None => Ok(()),
        }
    }
}

impl AuditSource for FixtureSource {
    fn describe(&self) -> String {
        "fixture/Sales".to_string()
    }

    fn snapshot_time(&self) -> Option<i64> {
        Some(SNAPSHOT_TIME)
    }

    fn ping(&self) -> Result<(), CollectError> {
        if self.offline {
            return Err(CollectError::ConnectionFailure {
                message: "server unreachable".into(),
            });
        }
        Ok(())
    }

    fn read_catalog(&self) -> Result<CatalogRows, CollectError> {
        self.gate(Phase::Metadata)?;
        Ok(self.fixture.catalog.clone())
    }

    fn read_index_usage(&self) -> Result<IndexUsageRows, CollectError> {
        self.gate(Phase::IndexUsage)?;
        Ok(self.fixture.usage.clone())
    }

    fn read_missing_indexes(&self) -> Result<Vec<MissingIndexRow>, CollectError> {
        self.gate(Phase::MissingIndex)?;
        Ok(self.fixture.missing.clone())
    }

    fn read_query_stats(&self) -> Result<Vec<QueryStatRow>, CollectError> {
        self.gate(Phase::QueryStats)?;
        Ok(self.fixture.queries.clone())
    }

    fn read_query_store(&self) -> Result<Vec<QueryStatRow>, CollectError> {
        match &self.fixture.query_store {
            Some(rows) => Ok(rows.clone()),
            None => Err(CollectError::SignalUnavailable {
                phase: Phase::QueryStats,
                reason: SkipReason::FeatureNotEnabled,
                detail: "query store is off".into(),
            }),
        }
    }

    fn read_wait_stats(&self) -> Result<Vec<WaitStatRow>, CollectError> {
        self.gate(Phase::WaitStats)?;
        Ok(self.fixture.waits.clone())
    }
}

/// Run a default-configured scan against `source`.
pub fn scan(source: FixtureSource) -> Result<AuditReport, ScanError> {
    scan_with(source, &ScanRequest::default())
}

pub fn scan_with(source: FixtureSource, request: &ScanRequest) -> Result<AuditReport, ScanError> {
    AuditEngine::default().run(Arc::new(source), request, &CancellationToken::new())
}
