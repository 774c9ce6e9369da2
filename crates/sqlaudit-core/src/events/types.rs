//! Event payload types.

use crate::types::{Phase, SkipReason};

/// Payload for `on_scan_started`.
#[derive(Debug, Clone)]
pub struct ScanStartedEvent {
    pub source: String,
    pub phases: Vec<Phase>,
}

/// Payload for `on_phase_collected`.
#[derive(Debug, Clone)]
pub struct PhaseCollectedEvent {
    pub phase: Phase,
    pub rows: usize,
    pub duration_ms: u64,
}

/// Payload for `on_phase_skipped`.
#[derive(Debug, Clone)]
pub struct PhaseSkippedEvent {
    pub phase: Phase,
    pub reason: SkipReason,
    pub detail: String,
}

/// Payload for `on_row_discarded`.
#[derive(Debug, Clone)]
pub struct RowDiscardedEvent {
    pub phase: Phase,
    pub object: String,
}

/// Payload for `on_finding_withheld`.
#[derive(Debug, Clone)]
pub struct FindingWithheldEvent {
    pub subject: String,
    pub reason: String,
}

/// Payload for `on_scan_complete`.
#[derive(Debug, Clone)]
pub struct ScanCompleteEvent {
    pub critical: usize,
    pub important: usize,
    pub advisory: usize,
    pub caveats: usize,
    pub duration_ms: u64,
}

/// Payload for `on_error`.
#[derive(Debug, Clone)]
pub struct ErrorEvent {
    pub message: String,
    pub error_code: String,
}
