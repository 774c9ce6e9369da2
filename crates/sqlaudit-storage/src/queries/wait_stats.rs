//! Wait statistics queries.

use rusqlite::{params, Connection};
use sqlaudit_core::errors::StorageError;
use sqlaudit_core::types::WaitStatRow;

use super::{count, sql_count};
use crate::connection::sqlite_error;
use crate::migrations::require_table;

pub fn query_wait_stats(conn: &Connection) -> Result<Vec<WaitStatRow>, StorageError> {
    require_table(conn, "wait_stats")?;
    let mut stmt = conn
        .prepare_cached(
            "SELECT wait_type, wait_time_ms, signal_wait_time_ms, waiting_tasks_count
             FROM wait_stats ORDER BY wait_type",
        )
        .map_err(sqlite_error)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(WaitStatRow {
                wait_type: row.get(0)?,
                wait_time_ms: count(row.get(1)?),
                signal_wait_time_ms: count(row.get(2)?),
                waiting_tasks_count: count(row.get(3)?),
            })
        })
        .map_err(sqlite_error)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_error)
}

pub fn insert_wait_stats(conn: &Connection, rows: &[WaitStatRow]) -> Result<(), StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT OR REPLACE INTO wait_stats
                (wait_type, wait_time_ms, signal_wait_time_ms, waiting_tasks_count)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .map_err(sqlite_error)?;
    for w in rows {
        stmt.execute(params![
            w.wait_type,
            sql_count("wait_stats", "wait_time_ms", w.wait_time_ms)?,
            sql_count("wait_stats", "signal_wait_time_ms", w.signal_wait_time_ms)?,
            sql_count("wait_stats", "waiting_tasks_count", w.waiting_tasks_count)?
        ])
        .map_err(sqlite_error)?;
    }
    Ok(())
}
