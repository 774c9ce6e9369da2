//! Normalizer: raw collector rows → canonical entities.
//!
//! Every signal is resolved against the metadata snapshot by
//! case-insensitive [`ObjectKey`](sqlaudit_core::ObjectKey). Rows naming an
//! object the catalog does not contain are dropped, logged at debug, and
//! counted into a single caveat per phase.

pub mod model;

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use sqlaudit_core::config::DesignConfig;
use sqlaudit_core::events::{EventDispatcher, RowDiscardedEvent};
use sqlaudit_core::types::{parse_column_list, CatalogRows, IndexUsageRows};
use sqlaudit_core::{ObjectName, Phase, SkipReason};

pub use model::*;

use crate::collect::{PhaseOutcome, RawSnapshot, RowCount};
use crate::report::{Caveat, CaveatKind, PhaseReport, PhaseStatus};

/// Resolve a raw snapshot. Never fails: unresolvable rows become caveats.
pub fn normalize(raw: &RawSnapshot, design: &DesignConfig, events: &EventDispatcher) -> Snapshot {
    let mut builder = SnapshotBuilder {
        snapshot: Snapshot {
            source: raw.source.clone(),
            scanned_at: raw.scanned_at,
            caveats: raw.caveats.clone(),
            ..Snapshot::default()
        },
        discards: Discards {
            counts: BTreeMap::new(),
            events,
        },
    };

    builder.add_catalog(&raw.catalog, design);
    if let PhaseOutcome::Collected(rows) = &raw.index_usage {
        builder.add_index_usage(rows);
    }
    if let PhaseOutcome::Collected(rows) = &raw.missing_indexes {
        builder.add_missing_indexes(rows);
    }
    if let PhaseOutcome::Collected(rows) = &raw.query_stats {
        builder.add_query_stats(rows, raw.query_origin);
    }
    if let PhaseOutcome::Collected(rows) = &raw.wait_stats {
        builder.add_wait_stats(rows);
    }
    builder.finish(raw)
}

struct Discards<'a> {
    counts: BTreeMap<Phase, usize>,
    events: &'a EventDispatcher,
}

impl Discards<'_> {
    fn discard(&mut self, phase: Phase, object: String) {
        tracing::debug!(phase = %phase, object = %object, "object vanished, row discarded");
        self.events.emit_row_discarded(&RowDiscardedEvent { phase, object });
        *self.counts.entry(phase).or_default() += 1;
    }
}

struct SnapshotBuilder<'a> {
    snapshot: Snapshot,
    discards: Discards<'a>,
}

impl SnapshotBuilder<'_> {
    fn add_catalog(&mut self, catalog: &CatalogRows, design: &DesignConfig) {
        let staging_schemas = design.effective_staging_schemas();
        let staging_prefixes = design.effective_staging_prefixes();
        let created = design.effective_audit_created_columns();
        let modified = design.effective_audit_modified_columns();
        let snap = &mut self.snapshot;

        for row in &catalog.tables {
            let name = ObjectName::new(row.schema.clone(), row.table.clone());
            let key = name.key();
            if snap.table_lookup.contains_key(&key) {
                tracing::debug!(table = %name, "duplicate table row ignored");
                continue;
            }
            let id = TableId::from_len(snap.tables.len());
            let schema_lower = row.schema.to_lowercase();
            let table_lower = row.table.to_lowercase();
            let is_staging = staging_schemas.contains(&schema_lower)
                || staging_prefixes.iter().any(|p| table_lower.starts_with(p.as_str()));
            snap.table_lookup.insert(key, id);
            snap.tables.push(TableDescriptor {
                id,
                name,
                row_count: row.row_count,
                size_bytes: row.size_bytes,
                storage: parse_storage(&row.storage),
                columns: Vec::new(),
                audit_columns: AuditColumnFlags::default(),
                has_primary_key: row.has_primary_key,
                trigger_count: row.trigger_count,
                is_staging,
                indexes: Vec::new(),
            });
        }

        let mut ordinals: FxHashMap<TableId, Vec<(u32, ColumnDescriptor)>> = FxHashMap::default();
        for row in &catalog.columns {
            let name = ObjectName::new(row.schema.clone(), row.table.clone());
            let Some(table) = snap.find_table(&name) else {
                self.discards
                    .discard(Phase::Metadata, format!("{name}.{}", row.column));
                continue;
            };
            ordinals.entry(table).or_default().push((
                row.ordinal,
                ColumnDescriptor {
                    name: row.column.clone(),
                    data_type: row.data_type.clone(),
                    is_nullable: row.is_nullable,
                    is_primary_key: row.is_primary_key,
                },
            ));
        }
        for (table, mut columns) in ordinals {
            columns.sort_by_key(|(ordinal, _)| *ordinal);
            let descriptor = &mut snap.tables[table.index()];
            for (_, column) in columns {
                let folded = column.name.to_lowercase().replace('_', "");
                if created.contains(&folded) {
                    descriptor.audit_columns.has_created = true;
                }
                if modified.contains(&folded) {
                    descriptor.audit_columns.has_modified = true;
                }
                if column.is_primary_key {
                    descriptor.has_primary_key = true;
                }
                descriptor.columns.push(column);
            }
        }

        for row in &catalog.indexes {
            let name = ObjectName::new(row.schema.clone(), row.table.clone());
            let Some(kind) = IndexKind::parse(&row.index_type) else {
                continue;
            };
            let Some(table) = snap.find_table(&name) else {
                self.discards
                    .discard(Phase::Metadata, format!("{name}.{}", row.index_name));
                continue;
            };
            let lookup = (table, row.index_name.to_lowercase());
            if snap.index_lookup.contains_key(&lookup) {
                tracing::debug!(table = %name, index = %row.index_name, "duplicate index row ignored");
                continue;
            }
            let id = IndexId::from_len(snap.indexes.len());
            snap.index_lookup.insert(lookup, id);
            snap.indexes.push(IndexDescriptor {
                id,
                table,
                name: row.index_name.clone(),
                kind,
                key_columns: ColumnList::new(),
                included_columns: ColumnList::new(),
                is_unique: row.is_unique || row.is_primary_key || row.is_unique_constraint,
                is_primary_key: row.is_primary_key,
                is_unique_constraint: row.is_unique_constraint,
                usage: None,
                physical: None,
            });
            let table = &mut snap.tables[table.index()];
            table.indexes.push(id);
            if row.is_primary_key {
                table.has_primary_key = true;
            }
            // The index set is authoritative for the table's storage.
            match kind {
                IndexKind::ClusteredColumnstore => table.storage = StorageType::Columnstore,
                IndexKind::Clustered if table.storage == StorageType::Heap => {
                    table.storage = StorageType::Clustered;
                }
                _ => {}
            }
        }

        let mut keys: FxHashMap<IndexId, Vec<(u32, String)>> = FxHashMap::default();
        for row in &catalog.index_columns {
            let name = ObjectName::new(row.schema.clone(), row.table.clone());
            let Some(index) = snap
                .find_table(&name)
                .and_then(|t| snap.find_index(t, &row.index_name))
            else {
                self.discards
                    .discard(Phase::Metadata, format!("{name}.{}", row.index_name));
                continue;
            };
            if row.is_included {
                snap.indexes[index.index()]
                    .included_columns
                    .push(row.column.clone());
            } else {
                keys.entry(index)
                    .or_default()
                    .push((row.key_ordinal, row.column.clone()));
            }
        }
        for (index, mut columns) in keys {
            columns.sort_by_key(|(ordinal, _)| *ordinal);
            snap.indexes[index.index()].key_columns =
                columns.into_iter().map(|(_, c)| c).collect();
        }

        for row in &catalog.statistics {
            let name = ObjectName::new(row.schema.clone(), row.table.clone());
            let Some(table) = snap.find_table(&name) else {
                self.discards
                    .discard(Phase::Metadata, format!("{name}.{}", row.stats_name));
                continue;
            };
            let id = StatsId::from_len(snap.statistics.len());
            snap.statistics.push(StatisticsDescriptor {
                id,
                table,
                name: row.stats_name.clone(),
                rows: row.rows,
                modification_counter: row.modification_counter,
                last_updated: row.last_updated,
            });
        }
    }

    fn add_index_usage(&mut self, rows: &IndexUsageRows) {
        let snap = &mut self.snapshot;
        for row in &rows.usage {
            let name = ObjectName::new(row.schema.clone(), row.table.clone());
            let Some(index) = snap
                .find_table(&name)
                .and_then(|t| snap.find_index(t, &row.index_name))
            else {
                self.discards
                    .discard(Phase::IndexUsage, format!("{name}.{}", row.index_name));
                continue;
            };
            let reads = row
                .user_seeks
                .saturating_add(row.user_scans)
                .saturating_add(row.user_lookups);
            // Partitioned indexes report one row per partition; sum them.
            match snap.indexes[index.index()].usage {
                Some(existing) => {
                    let stat = &mut snap.usage[existing.index()];
                    stat.reads = stat.reads.saturating_add(reads);
                    stat.writes = stat.writes.saturating_add(row.user_updates);
                }
                None => {
                    let id = UsageId::from_len(snap.usage.len());
                    snap.usage.push(IndexUsageStat {
                        id,
                        index,
                        reads,
                        writes: row.user_updates,
                        window_secs: rows.window_secs,
                    });
                    snap.indexes[index.index()].usage = Some(id);
                }
            }
        }

        for row in &rows.physical {
            let name = ObjectName::new(row.schema.clone(), row.table.clone());
            let Some(index) = snap
                .find_table(&name)
                .and_then(|t| snap.find_index(t, &row.index_name))
            else {
                self.discards
                    .discard(Phase::IndexUsage, format!("{name}.{}", row.index_name));
                continue;
            };
            match snap.indexes[index.index()].physical {
                Some(existing) => {
                    // Page-weighted fragmentation across partitions.
                    let stat = &mut snap.physical[existing.index()];
                    let pages = stat.page_count.saturating_add(row.page_count);
                    if pages > 0 {
                        stat.fragmentation_percent = (stat.fragmentation_percent
                            * stat.page_count as f64
                            + row.avg_fragmentation_percent * row.page_count as f64)
                            / pages as f64;
                    }
                    stat.page_count = pages;
                }
                None => {
                    let id = PhysicalId::from_len(snap.physical.len());
                    snap.physical.push(IndexPhysicalStat {
                        id,
                        index,
                        fragmentation_percent: row.avg_fragmentation_percent,
                        page_count: row.page_count,
                    });
                    snap.indexes[index.index()].physical = Some(id);
                }
            }
        }
    }

    fn add_missing_indexes(&mut self, rows: &[sqlaudit_core::types::MissingIndexRow]) {
        let snap = &mut self.snapshot;
        for row in rows {
            let Some(table) = ObjectName::parse(&row.statement).and_then(|n| snap.find_table(&n))
            else {
                self.discards
                    .discard(Phase::MissingIndex, row.statement.clone());
                continue;
            };
            let equality: ColumnList = parse_column_list(row.equality_columns.as_deref())
                .into_iter()
                .collect();
            let inequality: ColumnList = parse_column_list(row.inequality_columns.as_deref())
                .into_iter()
                .collect();
            if equality.is_empty() && inequality.is_empty() {
                tracing::debug!(statement = %row.statement, "missing-index row without key columns ignored");
                continue;
            }
            let id = MissingId::from_len(snap.missing.len());
            snap.missing.push(MissingIndexCandidate {
                id,
                table,
                equality_columns: equality,
                inequality_columns: inequality,
                included_columns: parse_column_list(row.included_columns.as_deref())
                    .into_iter()
                    .collect(),
                avg_impact_percent: row.avg_user_impact.clamp(0.0, 100.0),
                query_count: row.user_seeks.saturating_add(row.user_scans),
            });
        }
    }

    fn add_query_stats(&mut self, rows: &[sqlaudit_core::types::QueryStatRow], origin: QueryOrigin) {
        let snap = &mut self.snapshot;
        for row in rows {
            let id = QueryStatId::from_len(snap.queries.len());
            snap.queries.push(QueryStat {
                id,
                query_id: row.query_id.clone(),
                avg_cpu_ms: row.avg_cpu_ms,
                avg_logical_reads: row.avg_logical_reads,
                avg_duration_ms: row.avg_duration_ms,
                execution_count: row.execution_count,
                query_text: row.query_text.clone(),
                plan_ref: row.plan_ref.clone(),
                origin,
            });
        }
    }

    fn add_wait_stats(&mut self, rows: &[sqlaudit_core::types::WaitStatRow]) {
        let snap = &mut self.snapshot;
        let mut by_type: FxHashMap<String, WaitId> = FxHashMap::default();
        for row in rows {
            let wait_type = row.wait_type.trim().to_uppercase();
            if let Some(existing) = by_type.get(&wait_type) {
                let stat = &mut snap.waits[existing.index()];
                stat.wait_time_ms = stat.wait_time_ms.saturating_add(row.wait_time_ms);
                stat.signal_wait_time_ms =
                    stat.signal_wait_time_ms.saturating_add(row.signal_wait_time_ms);
                stat.waiting_tasks_count =
                    stat.waiting_tasks_count.saturating_add(row.waiting_tasks_count);
                continue;
            }
            let id = WaitId::from_len(snap.waits.len());
            by_type.insert(wait_type.clone(), id);
            snap.waits.push(WaitStat {
                id,
                wait_type,
                wait_time_ms: row.wait_time_ms,
                signal_wait_time_ms: row.signal_wait_time_ms,
                waiting_tasks_count: row.waiting_tasks_count,
            });
        }
    }

    fn finish(self, raw: &RawSnapshot) -> Snapshot {
        let SnapshotBuilder {
            mut snapshot,
            discards,
        } = self;

        for &phase in Phase::all() {
            let status = phase_status(raw, phase);
            match &status {
                PhaseStatus::Skipped { reason, detail } if *reason != SkipReason::NotRequested => {
                    let message = if detail.is_empty() {
                        format!("{phase} skipped: {reason}")
                    } else {
                        format!("{phase} skipped: {reason} ({detail})")
                    };
                    snapshot
                        .caveats
                        .push(Caveat::new(CaveatKind::PhaseSkipped, message));
                }
                PhaseStatus::Empty => snapshot.caveats.push(Caveat::new(
                    CaveatKind::EmptySignal,
                    format!("{phase} returned no rows; no findings in this category"),
                )),
                _ => {}
            }
            snapshot.phases.push(PhaseReport { phase, status });
        }

        for (phase, count) in &discards.counts {
            tracing::info!(
                phase = %phase,
                rows_discarded = count,
                "discarded rows for objects missing from the metadata snapshot"
            );
            snapshot.caveats.push(Caveat::new(
                CaveatKind::ObjectVanished,
                format!(
                    "{count} {phase} row(s) referenced objects not in the metadata snapshot and were discarded"
                ),
            ));
        }

        snapshot
    }
}

fn parse_storage(raw: &str) -> StorageType {
    let lower = raw.to_ascii_lowercase();
    if lower.contains("columnstore") {
        StorageType::Columnstore
    } else if lower.contains("clustered") {
        StorageType::Clustered
    } else {
        StorageType::Heap
    }
}

fn phase_status(raw: &RawSnapshot, phase: Phase) -> PhaseStatus {
    fn from_outcome<T: RowCount>(outcome: &PhaseOutcome<T>) -> PhaseStatus {
        match outcome {
            PhaseOutcome::Collected(rows) => PhaseStatus::Ran {
                rows: rows.row_count(),
            },
            PhaseOutcome::Empty => PhaseStatus::Empty,
            PhaseOutcome::Unavailable { reason, detail } => PhaseStatus::Skipped {
                reason: *reason,
                detail: detail.clone(),
            },
        }
    }

    match phase {
        Phase::Metadata if raw.catalog.row_count() == 0 => PhaseStatus::Empty,
        Phase::Metadata => PhaseStatus::Ran {
            rows: raw.catalog.row_count(),
        },
        Phase::IndexUsage => from_outcome(&raw.index_usage),
        Phase::MissingIndex => from_outcome(&raw.missing_indexes),
        Phase::QueryStats => from_outcome(&raw.query_stats),
        Phase::WaitStats => from_outcome(&raw.wait_stats),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlaudit_core::types::{IndexRow, TableRow};

    fn catalog() -> CatalogRows {
        CatalogRows {
            tables: vec![TableRow {
                schema: "dbo".into(),
                table: "Orders".into(),
                row_count: 10,
                storage: "heap".into(),
                ..Default::default()
            }],
            indexes: vec![
                IndexRow {
                    schema: "dbo".into(),
                    table: "Orders".into(),
                    index_name: "HEAP".into(),
                    index_type: "heap".into(),
                    ..Default::default()
                },
                IndexRow {
                    schema: "DBO".into(),
                    table: "ORDERS".into(),
                    index_name: "CIX_Orders".into(),
                    index_type: "CLUSTERED".into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn heap_rows_are_not_indexes() {
        let raw = RawSnapshot::from_catalog("t", 0, catalog());
        let snap = normalize(&raw, &DesignConfig::default(), &EventDispatcher::new());
        assert_eq!(snap.indexes.len(), 1);
        assert_eq!(snap.tables[0].storage, StorageType::Clustered);
    }

    #[test]
    fn storage_strings_parse() {
        assert_eq!(parse_storage("Clustered Columnstore"), StorageType::Columnstore);
        assert_eq!(parse_storage("CLUSTERED"), StorageType::Clustered);
        assert_eq!(parse_storage(""), StorageType::Heap);
    }

    #[test]
    fn unrequested_phases_raise_no_caveats() {
        let raw = RawSnapshot::from_catalog("t", 0, catalog());
        let snap = normalize(&raw, &DesignConfig::default(), &EventDispatcher::new());
        assert!(snap.caveats.is_empty());
        assert_eq!(snap.phases.len(), Phase::all().len());
    }
}
