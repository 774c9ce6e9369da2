//! Configuration system for sqlaudit.
//! TOML-based, layered resolution: CLI > env > project > user > defaults.

pub mod audit_config;
pub mod design_config;
pub mod report_config;
pub mod scan_config;
pub mod source_config;
pub mod thresholds_config;

pub use audit_config::{AuditConfig, CliOverrides};
pub use design_config::DesignConfig;
pub use report_config::ReportConfig;
pub use scan_config::ScanConfig;
pub use source_config::SourceConfig;
pub use thresholds_config::ThresholdsConfig;
