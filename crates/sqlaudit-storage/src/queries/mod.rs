//! Typed queries over the capture schema, one module per capture area.

pub mod capture_info;
pub mod catalog;
pub mod index_usage;
pub mod missing_index;
pub mod query_stats;
pub mod wait_stats;

use sqlaudit_core::errors::StorageError;

/// Counters are stored as SQLite integers; negative values are export noise.
pub(crate) fn count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

/// SQLite integers are signed; counters past `i64::MAX` are rejected rather
/// than stored as negatives.
pub(crate) fn sql_count(table: &str, column: &str, value: u64) -> Result<i64, StorageError> {
    i64::try_from(value).map_err(|_| StorageError::InvalidValue {
        table: table.to_string(),
        column: column.to_string(),
        message: format!("{value} exceeds the largest storable integer"),
    })
}
