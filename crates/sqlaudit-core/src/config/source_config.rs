//! Audit source configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SourceConfig {
    /// Path to the capture file to audit.
    pub capture_path: Option<String>,
    /// Read historical query statistics before the plan cache. Default: false.
    pub use_query_store: Option<bool>,
}

impl SourceConfig {
    pub fn effective_use_query_store(&self) -> bool {
        self.use_query_store.unwrap_or(false)
    }

    pub(crate) fn merge_from(&mut self, other: &SourceConfig) {
        if other.capture_path.is_some() {
            self.capture_path = other.capture_path.clone();
        }
        if other.use_query_store.is_some() {
            self.use_query_store = other.use_query_store;
        }
    }
}
