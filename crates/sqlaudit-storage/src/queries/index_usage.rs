//! Index usage and physical stats queries.

use rusqlite::{params, Connection};
use sqlaudit_core::errors::StorageError;
use sqlaudit_core::types::{IndexPhysicalRow, IndexUsageRow};

use super::{count, sql_count};
use crate::connection::sqlite_error;
use crate::migrations::require_table;

pub fn query_usage(conn: &Connection) -> Result<Vec<IndexUsageRow>, StorageError> {
    require_table(conn, "index_usage")?;
    let mut stmt = conn
        .prepare_cached(
            "SELECT schema_name, table_name, index_name, user_seeks, user_scans,
                    user_lookups, user_updates
             FROM index_usage ORDER BY schema_name, table_name, index_name",
        )
        .map_err(sqlite_error)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(IndexUsageRow {
                schema: row.get(0)?,
                table: row.get(1)?,
                index_name: row.get(2)?,
                user_seeks: count(row.get(3)?),
                user_scans: count(row.get(4)?),
                user_lookups: count(row.get(5)?),
                user_updates: count(row.get(6)?),
            })
        })
        .map_err(sqlite_error)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_error)
}

pub fn query_physical(conn: &Connection) -> Result<Vec<IndexPhysicalRow>, StorageError> {
    require_table(conn, "index_physical")?;
    let mut stmt = conn
        .prepare_cached(
            "SELECT schema_name, table_name, index_name, avg_fragmentation_percent, page_count
             FROM index_physical ORDER BY schema_name, table_name, index_name",
        )
        .map_err(sqlite_error)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(IndexPhysicalRow {
                schema: row.get(0)?,
                table: row.get(1)?,
                index_name: row.get(2)?,
                avg_fragmentation_percent: row.get(3)?,
                page_count: count(row.get(4)?),
            })
        })
        .map_err(sqlite_error)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_error)
}

pub fn insert_usage(conn: &Connection, rows: &[IndexUsageRow]) -> Result<(), StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO index_usage
                (schema_name, table_name, index_name, user_seeks, user_scans, user_lookups, user_updates)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .map_err(sqlite_error)?;
    for u in rows {
        stmt.execute(params![
            u.schema,
            u.table,
            u.index_name,
            sql_count("index_usage", "user_seeks", u.user_seeks)?,
            sql_count("index_usage", "user_scans", u.user_scans)?,
            sql_count("index_usage", "user_lookups", u.user_lookups)?,
            sql_count("index_usage", "user_updates", u.user_updates)?
        ])
        .map_err(sqlite_error)?;
    }
    Ok(())
}

pub fn insert_physical(conn: &Connection, rows: &[IndexPhysicalRow]) -> Result<(), StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO index_physical
                (schema_name, table_name, index_name, avg_fragmentation_percent, page_count)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .map_err(sqlite_error)?;
    for p in rows {
        stmt.execute(params![
            p.schema,
            p.table,
            p.index_name,
            p.avg_fragmentation_percent,
            sql_count("index_physical", "page_count", p.page_count)?
        ])
        .map_err(sqlite_error)?;
    }
    Ok(())
}
