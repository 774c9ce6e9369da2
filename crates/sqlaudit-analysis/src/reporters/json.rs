//! JSON reporter: the report itself, pretty-printed.

use super::Reporter;
use crate::report::AuditReport;

/// JSON reporter for machine-readable output. Output parses back into an
/// identical [`AuditReport`].
pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn generate(&self, report: &AuditReport) -> Result<String, String> {
        serde_json::to_string_pretty(report).map_err(|e| e.to_string())
    }
}
