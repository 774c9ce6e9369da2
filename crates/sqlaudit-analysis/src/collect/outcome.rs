//! Per-phase collection outcome.

use serde::{Deserialize, Serialize};
use sqlaudit_core::SkipReason;

/// The result of one signal phase.
///
/// `Empty` means the phase ran and observed nothing; `Unavailable` means
/// there is no evidence either way. Scoring treats both as zero findings,
/// the report header does not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PhaseOutcome<T> {
    Collected(T),
    Empty,
    Unavailable { reason: SkipReason, detail: String },
}

impl<T> PhaseOutcome<T> {
    pub fn not_requested() -> Self {
        Self::Unavailable {
            reason: SkipReason::NotRequested,
            detail: String::new(),
        }
    }

    pub fn collected(&self) -> Option<&T> {
        match self {
            Self::Collected(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_collected(self) -> Option<T> {
        match self {
            Self::Collected(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}
