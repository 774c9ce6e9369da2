//! Top-level sqlaudit configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{DesignConfig, ReportConfig, ScanConfig, SourceConfig, ThresholdsConfig};
use crate::constants::REPORT_FORMATS;
use crate::errors::ConfigError;
use crate::types::Phase;

/// Project config file name, looked up in the project root.
pub const PROJECT_CONFIG_FILE: &str = "sqlaudit.toml";

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`SQLAUDIT_*`)
/// 3. Project config (`sqlaudit.toml` in project root)
/// 4. User config (`~/.sqlaudit/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AuditConfig {
    pub scan: ScanConfig,
    pub thresholds: ThresholdsConfig,
    pub design: DesignConfig,
    pub source: SourceConfig,
    pub report: ReportConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub capture_path: Option<String>,
    pub phases: Option<Vec<String>>,
    pub top_n: Option<usize>,
    pub min_impact: Option<f64>,
    pub timeout_secs: Option<u64>,
    pub degraded_phases: Option<Vec<String>>,
    pub format: Option<String>,
}

impl AuditConfig {
    /// Load configuration with layered resolution rooted at `root`.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // User config (lowest file priority). Only parse errors are fatal.
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(e) => {
                        tracing::warn!(path = %user_config_path.display(), error = %e, "ignoring unreadable user config");
                    }
                }
            }
        }

        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config);

        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &AuditConfig) -> Result<(), ConfigError> {
        for raw in &config.scan.phases {
            raw.parse::<Phase>()?;
        }
        for raw in &config.scan.degraded_phases {
            let phase: Phase = raw.parse()?;
            if !phase.is_signal() {
                return Err(ConfigError::ValidationFailed {
                    field: "scan.degraded_phases".to_string(),
                    message: "the metadata phase cannot be degraded".to_string(),
                });
            }
        }
        if config.scan.concurrency == Some(0) {
            return Err(invalid("scan.concurrency", "must be greater than 0"));
        }
        if config.scan.timeout_secs == Some(0) {
            return Err(invalid("scan.timeout_secs", "must be greater than 0"));
        }

        let t = &config.thresholds;
        for (field, value) in [
            ("thresholds.min_impact", t.effective_min_impact()),
            ("thresholds.critical_impact", t.effective_critical_impact()),
            ("thresholds.important_impact", t.effective_important_impact()),
            (
                "thresholds.fragmentation_rebuild_percent",
                t.effective_fragmentation_rebuild_percent(),
            ),
            (
                "thresholds.fragmentation_reorganize_percent",
                t.effective_fragmentation_reorganize_percent(),
            ),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(invalid(field, "must be between 0 and 100"));
            }
        }
        if t.effective_important_impact() > t.effective_critical_impact() {
            return Err(invalid(
                "thresholds.important_impact",
                "must not exceed thresholds.critical_impact",
            ));
        }
        if t.effective_fragmentation_reorganize_percent() > t.effective_fragmentation_rebuild_percent() {
            return Err(invalid(
                "thresholds.fragmentation_reorganize_percent",
                "must not exceed thresholds.fragmentation_rebuild_percent",
            ));
        }
        if t.effective_wait_important_ms() > t.effective_wait_critical_ms() {
            return Err(invalid(
                "thresholds.wait_important_ms",
                "must not exceed thresholds.wait_critical_ms",
            ));
        }
        if t.effective_missing_index_per_table_cap() == 0 {
            return Err(invalid(
                "thresholds.missing_index_per_table_cap",
                "must be greater than 0",
            ));
        }
        if t.effective_top_n() == 0 {
            return Err(invalid("thresholds.top_n", "must be greater than 0"));
        }
        if t.effective_wait_top_n() == 0 {
            return Err(invalid("thresholds.wait_top_n", "must be greater than 0"));
        }
        if t.effective_unused_critical_multiplier() == 0 {
            return Err(invalid(
                "thresholds.unused_critical_multiplier",
                "must be greater than 0",
            ));
        }
        if t.effective_high_latency_ms() < 0.0 {
            return Err(invalid("thresholds.high_latency_ms", "must not be negative"));
        }
        let ratio = t.effective_stale_statistics_ratio();
        if !(ratio > 0.0 && ratio.is_finite()) {
            return Err(invalid(
                "thresholds.stale_statistics_ratio",
                "must be a positive number",
            ));
        }

        let format = config.report.effective_format();
        if !REPORT_FORMATS.contains(&format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "report.format".to_string(),
                message: format!(
                    "unknown format '{format}' (expected one of: {})",
                    REPORT_FORMATS.join(", ")
                ),
            });
        }
        Ok(())
    }

    /// Returns the user config path: `~/.sqlaudit/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        dirs_path().map(|d| d.join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored.
    fn merge_toml_file(config: &mut AuditConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: AuditConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; only values set in `other` override.
    pub fn merge(base: &mut AuditConfig, other: &AuditConfig) {
        base.scan.merge_from(&other.scan);
        base.thresholds.merge_from(&other.thresholds);
        base.design.merge_from(&other.design);
        base.source.merge_from(&other.source);
        base.report.merge_from(&other.report);
    }

    /// Apply environment variable overrides (`SQLAUDIT_CAPTURE`, `SQLAUDIT_TOP_N`, ...).
    /// Unparseable values are ignored.
    fn apply_env_overrides(config: &mut AuditConfig) {
        if let Ok(val) = std::env::var("SQLAUDIT_CAPTURE") {
            config.source.capture_path = Some(val);
        }
        if let Ok(val) = std::env::var("SQLAUDIT_PHASES") {
            config.scan.phases = split_list(&val);
        }
        if let Ok(val) = std::env::var("SQLAUDIT_TOP_N") {
            if let Ok(v) = val.parse::<usize>() {
                config.thresholds.top_n = Some(v);
            }
        }
        if let Ok(val) = std::env::var("SQLAUDIT_MIN_IMPACT") {
            if let Ok(v) = val.parse::<f64>() {
                config.thresholds.min_impact = Some(v);
            }
        }
        if let Ok(val) = std::env::var("SQLAUDIT_CONCURRENCY") {
            if let Ok(v) = val.parse::<usize>() {
                config.scan.concurrency = Some(v);
            }
        }
        if let Ok(val) = std::env::var("SQLAUDIT_TIMEOUT_SECS") {
            if let Ok(v) = val.parse::<u64>() {
                config.scan.timeout_secs = Some(v);
            }
        }
        if let Ok(val) = std::env::var("SQLAUDIT_UNUSED_WRITE_THRESHOLD") {
            if let Ok(v) = val.parse::<u64>() {
                config.thresholds.unused_write_threshold = Some(v);
            }
        }
        if let Ok(val) = std::env::var("SQLAUDIT_USE_QUERY_STORE") {
            if let Ok(v) = val.parse::<bool>() {
                config.source.use_query_store = Some(v);
            }
        }
        if let Ok(val) = std::env::var("SQLAUDIT_FORMAT") {
            config.report.format = Some(val);
        }
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut AuditConfig, cli: &CliOverrides) {
        if let Some(ref v) = cli.capture_path {
            config.source.capture_path = Some(v.clone());
        }
        if let Some(ref v) = cli.phases {
            config.scan.phases = v.clone();
        }
        if let Some(v) = cli.top_n {
            config.thresholds.top_n = Some(v);
        }
        if let Some(v) = cli.min_impact {
            config.thresholds.min_impact = Some(v);
        }
        if let Some(v) = cli.timeout_secs {
            config.scan.timeout_secs = Some(v);
        }
        if let Some(ref v) = cli.degraded_phases {
            config.scan.degraded_phases = v.clone();
        }
        if let Some(ref v) = cli.format {
            config.report.format = Some(v.clone());
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Returns the user-level config directory: `~/.sqlaudit/`.
fn dirs_path() -> Option<PathBuf> {
    home_dir().map(|h| h.join(".sqlaudit"))
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
