//! Shared value types: phases, identifiers, raw collector rows.

pub mod identifiers;
pub mod phase;
pub mod rows;

pub use identifiers::{parse_column_list, quote_identifier, ObjectKey, ObjectName};
pub use phase::{Phase, SkipReason};
pub use rows::*;
