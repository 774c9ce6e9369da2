//! EventDispatcher: synchronous fan-out to registered handlers.

use std::sync::Arc;

use super::handler::AuditEventHandler;
use super::types::*;

/// Synchronous event dispatcher wrapping a list of handlers.
/// With no handlers registered, emitting is a loop over an empty Vec.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn AuditEventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn register(&mut self, handler: Arc<dyn AuditEventHandler>) {
        self.handlers.push(handler);
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Handlers that panic are caught and do not prevent subsequent
    /// handlers from receiving the event.
    fn emit<F: Fn(&dyn AuditEventHandler)>(&self, f: F) {
        for (idx, handler) in self.handlers.iter().enumerate() {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                f(handler.as_ref());
            }));
            if result.is_err() {
                tracing::warn!(handler = idx, "event handler panicked");
            }
        }
    }

    pub fn emit_scan_started(&self, event: &ScanStartedEvent) {
        self.emit(|h| h.on_scan_started(event));
    }

    pub fn emit_scan_complete(&self, event: &ScanCompleteEvent) {
        self.emit(|h| h.on_scan_complete(event));
    }

    pub fn emit_phase_collected(&self, event: &PhaseCollectedEvent) {
        self.emit(|h| h.on_phase_collected(event));
    }

    pub fn emit_phase_skipped(&self, event: &PhaseSkippedEvent) {
        self.emit(|h| h.on_phase_skipped(event));
    }

    pub fn emit_row_discarded(&self, event: &RowDiscardedEvent) {
        self.emit(|h| h.on_row_discarded(event));
    }

    pub fn emit_finding_withheld(&self, event: &FindingWithheldEvent) {
        self.emit(|h| h.on_finding_withheld(event));
    }

    pub fn emit_error(&self, event: &ErrorEvent) {
        self.emit(|h| h.on_error(event));
    }
}
