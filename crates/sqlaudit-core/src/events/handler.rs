//! AuditEventHandler trait, all methods with no-op defaults.

use super::types::*;

/// Trait for observing a scan.
///
/// Handlers override only the events they care about. `Send + Sync`
/// because collectors emit from worker threads.
pub trait AuditEventHandler: Send + Sync {
    // ---- Scan Lifecycle ----
    fn on_scan_started(&self, _event: &ScanStartedEvent) {}
    fn on_scan_complete(&self, _event: &ScanCompleteEvent) {}

    // ---- Collection ----
    fn on_phase_collected(&self, _event: &PhaseCollectedEvent) {}
    fn on_phase_skipped(&self, _event: &PhaseSkippedEvent) {}

    // ---- Reduction ----
    fn on_row_discarded(&self, _event: &RowDiscardedEvent) {}
    fn on_finding_withheld(&self, _event: &FindingWithheldEvent) {}

    // ---- Errors ----
    fn on_error(&self, _event: &ErrorEvent) {}
}
