//! Queries for `capture_info` and `capture_signals`.

use rusqlite::{params, Connection, OptionalExtension};
use sqlaudit_core::errors::StorageError;

use crate::connection::sqlite_error;
use crate::migrations::table_exists;

pub const KEY_SERVER: &str = "server_name";
pub const KEY_DATABASE: &str = "database_name";
/// Unix seconds when the capture was taken.
pub const KEY_CAPTURED_AT: &str = "captured_at";
/// Unix seconds when the audited server last started (telemetry reset).
pub const KEY_SERVER_START: &str = "server_start";

/// Signal names used in `capture_signals`.
pub const SIGNAL_METADATA: &str = "metadata";
pub const SIGNAL_INDEX_USAGE: &str = "index_usage";
pub const SIGNAL_MISSING_INDEX: &str = "missing_index";
pub const SIGNAL_QUERY_STATS: &str = "query_stats";
pub const SIGNAL_QUERY_STORE: &str = "query_store";
pub const SIGNAL_WAIT_STATS: &str = "wait_stats";

/// Export status of one capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalStatus {
    pub permitted: bool,
    pub enabled: bool,
    pub detail: Option<String>,
}

impl Default for SignalStatus {
    fn default() -> Self {
        Self {
            permitted: true,
            enabled: true,
            detail: None,
        }
    }
}

pub fn get_info(conn: &Connection, key: &str) -> Result<Option<String>, StorageError> {
    if !table_exists(conn, "capture_info")? {
        return Ok(None);
    }
    conn.query_row(
        "SELECT value FROM capture_info WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
    .map_err(sqlite_error)
}

/// Integer-valued info key. Unparseable values read as absent.
pub fn get_info_i64(conn: &Connection, key: &str) -> Result<Option<i64>, StorageError> {
    Ok(get_info(conn, key)?.and_then(|v| v.trim().parse().ok()))
}

pub fn set_info(conn: &Connection, key: &str, value: &str) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO capture_info (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )
    .map_err(sqlite_error)?;
    Ok(())
}

/// Status of `signal`. No row (or no status table) means exported normally.
pub fn signal_status(conn: &Connection, signal: &str) -> Result<SignalStatus, StorageError> {
    if !table_exists(conn, "capture_signals")? {
        return Ok(SignalStatus::default());
    }
    let status = conn
        .query_row(
            "SELECT permitted, enabled, detail FROM capture_signals WHERE signal = ?1",
            params![signal],
            |row| {
                Ok(SignalStatus {
                    permitted: row.get(0)?,
                    enabled: row.get(1)?,
                    detail: row.get(2)?,
                })
            },
        )
        .optional()
        .map_err(sqlite_error)?;
    Ok(status.unwrap_or_default())
}

pub fn set_signal_status(
    conn: &Connection,
    signal: &str,
    status: &SignalStatus,
) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO capture_signals (signal, permitted, enabled, detail) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(signal) DO UPDATE SET
            permitted = excluded.permitted, enabled = excluded.enabled, detail = excluded.detail",
        params![signal, status.permitted, status.enabled, status.detail],
    )
    .map_err(sqlite_error)?;
    Ok(())
}
