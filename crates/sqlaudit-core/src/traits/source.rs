//! The capability set a scan reads from.

use crate::errors::CollectError;
use crate::types::{
    CatalogRows, IndexUsageRows, MissingIndexRow, Phase, QueryStatRow, SkipReason, WaitStatRow,
};

/// A read-only view of one database's catalog and telemetry.
///
/// Each capability may be independently absent: signal readers return
/// [`CollectError::SignalUnavailable`] or [`CollectError::AccessDenied`]
/// when the data cannot be read. Implementations must never write to the
/// audited database.
pub trait AuditSource: Send + Sync {
    /// Human-readable description of the source for the report header.
    fn describe(&self) -> String;

    /// Unix seconds when the snapshot was taken, if the source knows it.
    fn snapshot_time(&self) -> Option<i64> {
        None
    }

    /// Cheap liveness check. Errors here are connection failures.
    fn ping(&self) -> Result<(), CollectError>;

    fn read_catalog(&self) -> Result<CatalogRows, CollectError>;

    fn read_index_usage(&self) -> Result<IndexUsageRows, CollectError>;

    fn read_missing_indexes(&self) -> Result<Vec<MissingIndexRow>, CollectError>;

    /// Plan-cache query statistics.
    fn read_query_stats(&self) -> Result<Vec<QueryStatRow>, CollectError>;

    /// Historical query store statistics. Absent unless overridden.
    fn read_query_store(&self) -> Result<Vec<QueryStatRow>, CollectError> {
        Err(CollectError::SignalUnavailable {
            phase: Phase::QueryStats,
            reason: SkipReason::FeatureNotEnabled,
            detail: "source has no query store".to_string(),
        })
    }

    fn read_wait_stats(&self) -> Result<Vec<WaitStatRow>, CollectError>;
}
