//! Report output configuration.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_REPORT_FORMAT;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReportConfig {
    /// `json`, `console` or `markdown`. Default: console.
    pub format: Option<String>,
    /// Colorize console output. Default: true.
    pub color: Option<bool>,
}

impl ReportConfig {
    pub fn effective_format(&self) -> String {
        self.format
            .clone()
            .unwrap_or_else(|| DEFAULT_REPORT_FORMAT.to_string())
    }

    pub fn effective_color(&self) -> bool {
        self.color.unwrap_or(true)
    }

    pub(crate) fn merge_from(&mut self, other: &ReportConfig) {
        if other.format.is_some() {
            self.format = other.format.clone();
        }
        if other.color.is_some() {
            self.color = other.color;
        }
    }
}
