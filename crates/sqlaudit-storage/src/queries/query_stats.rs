//! Query statistics from the plan cache (`query_stats`) or the
//! historical store (`query_store`). Both tables share one shape.

use rusqlite::{params, Connection};
use sqlaudit_core::errors::StorageError;
use sqlaudit_core::types::QueryStatRow;

use super::{count, sql_count};
use crate::connection::sqlite_error;
use crate::migrations::require_table;

/// Which table a query statistics read targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatTable {
    PlanCache,
    QueryStore,
}

impl QueryStatTable {
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::PlanCache => "query_stats",
            Self::QueryStore => "query_store",
        }
    }
}

pub fn query_stats(conn: &Connection, table: QueryStatTable) -> Result<Vec<QueryStatRow>, StorageError> {
    let name = table.table_name();
    require_table(conn, name)?;
    let sql = format!(
        "SELECT query_id, avg_cpu_ms, avg_logical_reads, avg_duration_ms, execution_count,
                query_text, plan_ref
         FROM {name} ORDER BY query_id"
    );
    let mut stmt = conn.prepare_cached(&sql).map_err(sqlite_error)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(QueryStatRow {
                query_id: row.get(0)?,
                avg_cpu_ms: row.get(1)?,
                avg_logical_reads: row.get(2)?,
                avg_duration_ms: row.get(3)?,
                execution_count: count(row.get(4)?),
                query_text: row.get(5)?,
                plan_ref: row.get(6)?,
            })
        })
        .map_err(sqlite_error)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_error)
}

pub fn insert_query_stats(
    conn: &Connection,
    table: QueryStatTable,
    rows: &[QueryStatRow],
) -> Result<(), StorageError> {
    let sql = format!(
        "INSERT INTO {} (query_id, avg_cpu_ms, avg_logical_reads, avg_duration_ms,
                         execution_count, query_text, plan_ref)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        table.table_name()
    );
    let mut stmt = conn.prepare_cached(&sql).map_err(sqlite_error)?;
    for q in rows {
        stmt.execute(params![
            q.query_id,
            q.avg_cpu_ms,
            q.avg_logical_reads,
            q.avg_duration_ms,
            sql_count(table.table_name(), "execution_count", q.execution_count)?,
            q.query_text,
            q.plan_ref
        ])
        .map_err(sqlite_error)?;
    }
    Ok(())
}
