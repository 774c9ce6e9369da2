//! `AuditSource` over a capture file.

use std::path::Path;

use rusqlite::Connection;
use sqlaudit_core::errors::{CollectError, StorageError};
use sqlaudit_core::types::{
    CatalogRows, IndexUsageRows, MissingIndexRow, Phase, QueryStatRow, SkipReason, WaitStatRow,
};
use sqlaudit_core::AuditSource;

use crate::connection::CaptureDatabase;
use crate::queries::capture_info::{self, *};
use crate::queries::query_stats::QueryStatTable;
use crate::queries::{catalog, index_usage, missing_index, query_stats, wait_stats};

/// Reads an exported capture as if it were the live server.
pub struct CaptureSource {
    db: CaptureDatabase,
}

impl CaptureSource {
    /// Open a capture read-only. Any failure to open is a connection failure.
    pub fn open(path: &Path) -> Result<Self, CollectError> {
        let db = CaptureDatabase::open(path).map_err(|e| CollectError::ConnectionFailure {
            message: e.to_string(),
        })?;
        Ok(Self { db })
    }

    pub fn from_database(db: CaptureDatabase) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &CaptureDatabase {
        &self.db
    }

    /// Run a read for `phase`, first honoring the exporter's recorded status
    /// for `signal`.
    fn read<T>(
        &self,
        phase: Phase,
        signal: &str,
        f: impl FnOnce(&Connection) -> Result<T, StorageError>,
    ) -> Result<T, CollectError> {
        let status = self
            .db
            .with_reader(|conn| capture_info::signal_status(conn, signal))
            .map_err(|e| map_storage_error(phase, e))?;
        if !status.permitted {
            return Err(unavailable(phase, SkipReason::InsufficientPermission, status.detail, signal));
        }
        if !status.enabled {
            return Err(unavailable(phase, SkipReason::FeatureNotEnabled, status.detail, signal));
        }
        self.db.with_reader(f).map_err(|e| map_storage_error(phase, e))
    }
}

fn unavailable(phase: Phase, reason: SkipReason, detail: Option<String>, signal: &str) -> CollectError {
    if phase == Phase::Metadata {
        return CollectError::AccessDenied {
            object: "catalog".to_string(),
            message: detail.unwrap_or_else(|| "catalog views not exported".to_string()),
        };
    }
    CollectError::SignalUnavailable {
        phase,
        reason,
        detail: detail.unwrap_or_else(|| format!("{signal}: {reason}")),
    }
}

/// Storage errors as the collector taxonomy sees them.
pub fn map_storage_error(phase: Phase, e: StorageError) -> CollectError {
    match e {
        StorageError::NotFound { .. } | StorageError::Unavailable { .. } => {
            CollectError::ConnectionFailure {
                message: e.to_string(),
            }
        }
        StorageError::MissingTable { table } if phase == Phase::Metadata => {
            CollectError::AccessDenied {
                message: format!("catalog table '{table}' is missing from the capture"),
                object: table,
            }
        }
        StorageError::MissingTable { table } => CollectError::SignalUnavailable {
            phase,
            reason: SkipReason::FeatureNotEnabled,
            detail: format!("capture has no '{table}' table"),
        },
        other => CollectError::Query {
            phase,
            message: other.to_string(),
        },
    }
}

impl AuditSource for CaptureSource {
    fn describe(&self) -> String {
        let info = self.db.with_reader(|conn| {
            Ok((
                capture_info::get_info(conn, KEY_SERVER)?,
                capture_info::get_info(conn, KEY_DATABASE)?,
            ))
        });
        match info {
            Ok((Some(server), Some(database))) => {
                format!("{server}/{database} (capture {})", self.db.path().display())
            }
            Ok((None, Some(database))) => {
                format!("{database} (capture {})", self.db.path().display())
            }
            _ => format!("capture {}", self.db.path().display()),
        }
    }

    fn snapshot_time(&self) -> Option<i64> {
        self.db
            .with_reader(|conn| capture_info::get_info_i64(conn, KEY_CAPTURED_AT))
            .ok()
            .flatten()
    }

    fn ping(&self) -> Result<(), CollectError> {
        self.db
            .with_reader(|conn| {
                conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                    .map_err(|e| StorageError::Unavailable {
                        message: e.to_string(),
                    })
            })
            .map(|_| ())
            .map_err(|e| CollectError::ConnectionFailure {
                message: e.to_string(),
            })
    }

    fn read_catalog(&self) -> Result<CatalogRows, CollectError> {
        self.read(Phase::Metadata, SIGNAL_METADATA, catalog::read_catalog)
    }

    fn read_index_usage(&self) -> Result<IndexUsageRows, CollectError> {
        self.read(Phase::IndexUsage, SIGNAL_INDEX_USAGE, |conn| {
            let usage = index_usage::query_usage(conn)?;
            // Physical stats ride along; a capture without them still has usage.
            let physical = match index_usage::query_physical(conn) {
                Ok(rows) => rows,
                Err(StorageError::MissingTable { table }) => {
                    tracing::debug!(table = %table, "capture has no physical index stats");
                    Vec::new()
                }
                Err(e) => return Err(e),
            };
            let captured = capture_info::get_info_i64(conn, KEY_CAPTURED_AT)?;
            let started = capture_info::get_info_i64(conn, KEY_SERVER_START)?;
            let window_secs = match (captured, started) {
                (Some(c), Some(s)) if c >= s => u64::try_from(c - s).ok(),
                _ => None,
            };
            Ok(IndexUsageRows {
                window_secs,
                usage,
                physical,
            })
        })
    }

    fn read_missing_indexes(&self) -> Result<Vec<MissingIndexRow>, CollectError> {
        self.read(
            Phase::MissingIndex,
            SIGNAL_MISSING_INDEX,
            missing_index::query_missing_indexes,
        )
    }

    fn read_query_stats(&self) -> Result<Vec<QueryStatRow>, CollectError> {
        self.read(Phase::QueryStats, SIGNAL_QUERY_STATS, |conn| {
            query_stats::query_stats(conn, QueryStatTable::PlanCache)
        })
    }

    fn read_query_store(&self) -> Result<Vec<QueryStatRow>, CollectError> {
        self.read(Phase::QueryStats, SIGNAL_QUERY_STORE, |conn| {
            query_stats::query_stats(conn, QueryStatTable::QueryStore)
        })
    }

    fn read_wait_stats(&self) -> Result<Vec<WaitStatRow>, CollectError> {
        self.read(Phase::WaitStats, SIGNAL_WAIT_STATS, wait_stats::query_wait_stats)
    }
}
