//! Missing-index suggestion queries.

use rusqlite::{params, Connection};
use sqlaudit_core::errors::StorageError;
use sqlaudit_core::types::MissingIndexRow;

use super::{count, sql_count};
use crate::connection::sqlite_error;
use crate::migrations::require_table;

pub fn query_missing_indexes(conn: &Connection) -> Result<Vec<MissingIndexRow>, StorageError> {
    require_table(conn, "missing_indexes")?;
    let mut stmt = conn
        .prepare_cached(
            "SELECT statement, equality_columns, inequality_columns, included_columns,
                    avg_user_impact, user_seeks, user_scans
             FROM missing_indexes ORDER BY id",
        )
        .map_err(sqlite_error)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(MissingIndexRow {
                statement: row.get(0)?,
                equality_columns: row.get(1)?,
                inequality_columns: row.get(2)?,
                included_columns: row.get(3)?,
                avg_user_impact: row.get(4)?,
                user_seeks: count(row.get(5)?),
                user_scans: count(row.get(6)?),
            })
        })
        .map_err(sqlite_error)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_error)
}

pub fn insert_missing_indexes(conn: &Connection, rows: &[MissingIndexRow]) -> Result<(), StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO missing_indexes
                (statement, equality_columns, inequality_columns, included_columns,
                 avg_user_impact, user_seeks, user_scans)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .map_err(sqlite_error)?;
    for m in rows {
        stmt.execute(params![
            m.statement,
            m.equality_columns,
            m.inequality_columns,
            m.included_columns,
            m.avg_user_impact,
            sql_count("missing_indexes", "user_seeks", m.user_seeks)?,
            sql_count("missing_indexes", "user_scans", m.user_scans)?
        ])
        .map_err(sqlite_error)?;
    }
    Ok(())
}
