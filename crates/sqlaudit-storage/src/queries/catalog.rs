//! Catalog queries: tables, columns, indexes, index columns, statistics.

use rusqlite::{params, Connection, OptionalExtension};
use sqlaudit_core::errors::StorageError;
use sqlaudit_core::types::{
    CatalogRows, ColumnRow, IndexColumnRow, IndexRow, StatisticsRow, TableRow,
};

use super::{count, sql_count};
use crate::connection::sqlite_error;
use crate::migrations::{require_table, CATALOG_TABLES};

/// Read every catalog table. Fails with `MissingTable` if any is absent.
pub fn read_catalog(conn: &Connection) -> Result<CatalogRows, StorageError> {
    for table in CATALOG_TABLES {
        require_table(conn, table)?;
    }
    Ok(CatalogRows {
        tables: query_tables(conn, None)?,
        columns: query_columns(conn)?,
        indexes: query_indexes(conn)?,
        index_columns: query_index_columns(conn)?,
        statistics: query_statistics(conn)?,
    })
}

/// Tables, optionally restricted to one schema (case-insensitive).
pub fn query_tables(conn: &Connection, schema: Option<&str>) -> Result<Vec<TableRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT schema_name, table_name, row_count, size_bytes, storage,
                    has_primary_key, trigger_count
             FROM tables
             WHERE ?1 IS NULL OR lower(schema_name) = lower(?1)
             ORDER BY schema_name, table_name",
        )
        .map_err(sqlite_error)?;

    let rows = stmt
        .query_map(params![schema], map_table)
        .map_err(sqlite_error)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_error)
}

/// One schema of the capture with its table count and totals.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SchemaSummary {
    pub schema: String,
    pub table_count: usize,
    pub row_count: u64,
    pub size_bytes: u64,
}

/// Every schema that owns at least one captured table, in name order.
pub fn query_schemas(conn: &Connection) -> Result<Vec<SchemaSummary>, StorageError> {
    require_table(conn, "tables")?;
    let mut schemas: Vec<SchemaSummary> = Vec::new();
    for table in query_tables(conn, None)? {
        match schemas.last_mut() {
            Some(last) if last.schema == table.schema => {
                last.table_count += 1;
                last.row_count = last.row_count.saturating_add(table.row_count);
                last.size_bytes = last.size_bytes.saturating_add(table.size_bytes);
            }
            _ => schemas.push(SchemaSummary {
                schema: table.schema,
                table_count: 1,
                row_count: table.row_count,
                size_bytes: table.size_bytes,
            }),
        }
    }
    Ok(schemas)
}

fn map_table(row: &rusqlite::Row<'_>) -> rusqlite::Result<TableRow> {
    Ok(TableRow {
        schema: row.get(0)?,
        table: row.get(1)?,
        row_count: count(row.get(2)?),
        size_bytes: count(row.get(3)?),
        storage: row.get(4)?,
        has_primary_key: row.get(5)?,
        trigger_count: u32::try_from(row.get::<_, i64>(6)?).unwrap_or(0),
    })
}

pub fn query_columns(conn: &Connection) -> Result<Vec<ColumnRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT schema_name, table_name, column_name, data_type, is_nullable,
                    ordinal, is_primary_key
             FROM columns ORDER BY schema_name, table_name, ordinal",
        )
        .map_err(sqlite_error)?;
    let rows = stmt.query_map([], map_column).map_err(sqlite_error)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_error)
}

fn map_column(row: &rusqlite::Row<'_>) -> rusqlite::Result<ColumnRow> {
    Ok(ColumnRow {
        schema: row.get(0)?,
        table: row.get(1)?,
        column: row.get(2)?,
        data_type: row.get(3)?,
        is_nullable: row.get(4)?,
        ordinal: u32::try_from(row.get::<_, i64>(5)?).unwrap_or(0),
        is_primary_key: row.get(6)?,
    })
}

pub fn query_indexes(conn: &Connection) -> Result<Vec<IndexRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT schema_name, table_name, index_name, index_type, is_unique,
                    is_primary_key, is_unique_constraint
             FROM indexes ORDER BY schema_name, table_name, index_name",
        )
        .map_err(sqlite_error)?;
    let rows = stmt.query_map([], map_index).map_err(sqlite_error)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_error)
}

fn map_index(row: &rusqlite::Row<'_>) -> rusqlite::Result<IndexRow> {
    Ok(IndexRow {
        schema: row.get(0)?,
        table: row.get(1)?,
        index_name: row.get(2)?,
        index_type: row.get(3)?,
        is_unique: row.get(4)?,
        is_primary_key: row.get(5)?,
        is_unique_constraint: row.get(6)?,
    })
}

pub fn query_index_columns(conn: &Connection) -> Result<Vec<IndexColumnRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT schema_name, table_name, index_name, column_name, key_ordinal, is_included
             FROM index_columns
             ORDER BY schema_name, table_name, index_name, is_included, key_ordinal, rowid",
        )
        .map_err(sqlite_error)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(IndexColumnRow {
                schema: row.get(0)?,
                table: row.get(1)?,
                index_name: row.get(2)?,
                column: row.get(3)?,
                key_ordinal: u32::try_from(row.get::<_, i64>(4)?).unwrap_or(0),
                is_included: row.get(5)?,
            })
        })
        .map_err(sqlite_error)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_error)
}

pub fn query_statistics(conn: &Connection) -> Result<Vec<StatisticsRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT schema_name, table_name, stats_name, rows, modification_counter, last_updated
             FROM statistics ORDER BY schema_name, table_name, stats_name",
        )
        .map_err(sqlite_error)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(StatisticsRow {
                schema: row.get(0)?,
                table: row.get(1)?,
                stats_name: row.get(2)?,
                rows: count(row.get(3)?),
                modification_counter: count(row.get(4)?),
                last_updated: row.get(5)?,
            })
        })
        .map_err(sqlite_error)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_error)
}

/// One table with its columns and indexes, for `describe`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TableDescription {
    pub table: TableRow,
    pub columns: Vec<ColumnRow>,
    pub indexes: Vec<IndexDescription>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct IndexDescription {
    pub index: IndexRow,
    pub key_columns: Vec<String>,
    pub included_columns: Vec<String>,
}

/// Describe one table by schema and name (case-insensitive).
pub fn describe_table(
    conn: &Connection,
    schema: &str,
    table: &str,
) -> Result<Option<TableDescription>, StorageError> {
    for t in CATALOG_TABLES {
        require_table(conn, t)?;
    }

    let found = conn
        .query_row(
            "SELECT schema_name, table_name, row_count, size_bytes, storage,
                    has_primary_key, trigger_count
             FROM tables
             WHERE lower(schema_name) = lower(?1) AND lower(table_name) = lower(?2)",
            params![schema, table],
            map_table,
        )
        .optional()
        .map_err(sqlite_error)?;
    let Some(found) = found else {
        return Ok(None);
    };

    let mut stmt = conn
        .prepare_cached(
            "SELECT schema_name, table_name, column_name, data_type, is_nullable,
                    ordinal, is_primary_key
             FROM columns WHERE schema_name = ?1 AND table_name = ?2 ORDER BY ordinal",
        )
        .map_err(sqlite_error)?;
    let columns = stmt
        .query_map(params![found.schema, found.table], map_column)
        .map_err(sqlite_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(sqlite_error)?;

    let mut stmt = conn
        .prepare_cached(
            "SELECT schema_name, table_name, index_name, index_type, is_unique,
                    is_primary_key, is_unique_constraint
             FROM indexes WHERE schema_name = ?1 AND table_name = ?2 ORDER BY index_name",
        )
        .map_err(sqlite_error)?;
    let index_rows = stmt
        .query_map(params![found.schema, found.table], map_index)
        .map_err(sqlite_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(sqlite_error)?;

    let mut stmt = conn
        .prepare_cached(
            "SELECT column_name, is_included FROM index_columns
             WHERE schema_name = ?1 AND table_name = ?2 AND index_name = ?3
             ORDER BY is_included, key_ordinal, rowid",
        )
        .map_err(sqlite_error)?;
    let mut indexes = Vec::with_capacity(index_rows.len());
    for index in index_rows {
        let cols = stmt
            .query_map(params![found.schema, found.table, index.index_name], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, bool>(1)?))
            })
            .map_err(sqlite_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(sqlite_error)?;
        let (included, key): (Vec<_>, Vec<_>) = cols.into_iter().partition(|(_, inc)| *inc);
        indexes.push(IndexDescription {
            index,
            key_columns: key.into_iter().map(|(c, _)| c).collect(),
            included_columns: included.into_iter().map(|(c, _)| c).collect(),
        });
    }

    Ok(Some(TableDescription {
        table: found,
        columns,
        indexes,
    }))
}

/// Load catalog rows into a capture. Call inside a transaction.
pub fn insert_catalog(conn: &Connection, catalog: &CatalogRows) -> Result<(), StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT OR REPLACE INTO tables
                (schema_name, table_name, row_count, size_bytes, storage, has_primary_key, trigger_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .map_err(sqlite_error)?;
    for t in &catalog.tables {
        stmt.execute(params![
            t.schema,
            t.table,
            sql_count("tables", "row_count", t.row_count)?,
            sql_count("tables", "size_bytes", t.size_bytes)?,
            t.storage,
            t.has_primary_key,
            t.trigger_count
        ])
        .map_err(sqlite_error)?;
    }

    let mut stmt = conn
        .prepare_cached(
            "INSERT OR REPLACE INTO columns
                (schema_name, table_name, column_name, data_type, is_nullable, ordinal, is_primary_key)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .map_err(sqlite_error)?;
    for c in &catalog.columns {
        stmt.execute(params![
            c.schema,
            c.table,
            c.column,
            c.data_type,
            c.is_nullable,
            c.ordinal,
            c.is_primary_key
        ])
        .map_err(sqlite_error)?;
    }

    let mut stmt = conn
        .prepare_cached(
            "INSERT OR REPLACE INTO indexes
                (schema_name, table_name, index_name, index_type, is_unique, is_primary_key, is_unique_constraint)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .map_err(sqlite_error)?;
    for i in &catalog.indexes {
        stmt.execute(params![
            i.schema,
            i.table,
            i.index_name,
            i.index_type,
            i.is_unique,
            i.is_primary_key,
            i.is_unique_constraint
        ])
        .map_err(sqlite_error)?;
    }

    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO index_columns
                (schema_name, table_name, index_name, column_name, key_ordinal, is_included)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .map_err(sqlite_error)?;
    for ic in &catalog.index_columns {
        stmt.execute(params![
            ic.schema,
            ic.table,
            ic.index_name,
            ic.column,
            ic.key_ordinal,
            ic.is_included
        ])
        .map_err(sqlite_error)?;
    }

    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO statistics
                (schema_name, table_name, stats_name, rows, modification_counter, last_updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .map_err(sqlite_error)?;
    for s in &catalog.statistics {
        stmt.execute(params![
            s.schema,
            s.table,
            s.stats_name,
            sql_count("statistics", "rows", s.rows)?,
            sql_count("statistics", "modification_counter", s.modification_counter)?,
            s.last_updated
        ])
        .map_err(sqlite_error)?;
    }

    Ok(())
}
