//! The audit engine: collect once, then reduce.

use std::sync::Arc;
use std::time::Instant;

use sqlaudit_core::config::AuditConfig;
use sqlaudit_core::constants::VERSION;
use sqlaudit_core::events::{EventDispatcher, ScanCompleteEvent, ScanStartedEvent};
use sqlaudit_core::tracing::metrics;
use sqlaudit_core::{AuditSource, Cancellable, CancellationToken, ScanError};

use crate::collect::{self, RawSnapshot};
use crate::dedup::deduplicate;
use crate::normalize::normalize;
use crate::prioritize::prioritize;
use crate::report::{AuditReport, ReportHeader};
use crate::request::ScanRequest;
use crate::scoring::{score, ScoringConfig};

/// Runs scans against any [`AuditSource`].
pub struct AuditEngine {
    config: AuditConfig,
    events: EventDispatcher,
}

impl AuditEngine {
    pub fn new(config: AuditConfig) -> Self {
        Self {
            config,
            events: EventDispatcher::new(),
        }
    }

    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    /// The request implied by the engine's configuration.
    pub fn request(&self) -> ScanRequest {
        ScanRequest::from_config(&self.config)
    }

    /// Run one scan. Fatal errors return no report at all.
    pub fn run(
        &self,
        source: Arc<dyn AuditSource>,
        request: &ScanRequest,
        cancel: &CancellationToken,
    ) -> Result<AuditReport, ScanError> {
        AuditConfig::validate(&self.config)?;
        let started = Instant::now();
        let description = source.describe();
        let span = tracing::info_span!(
            "scan",
            source = %description,
            scan_duration_ms = tracing::field::Empty,
        );
        let _guard = span.enter();

        self.events.emit_scan_started(&ScanStartedEvent {
            source: description,
            phases: request.phases.iter().copied().collect(),
        });
        if cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }

        let raw = collect::collect(source, request, cancel, &self.events)?;
        // Reduction runs to completion once collection has succeeded.
        let report = self.reduce(&raw, request);

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        span.record(metrics::SCAN_DURATION_MS, duration_ms);
        tracing::info!(
            critical = report.critical.len(),
            important = report.important.len(),
            advisory = report.advisory.len(),
            caveats = report.caveats.len(),
            "scan complete"
        );
        self.events.emit_scan_complete(&ScanCompleteEvent {
            critical: report.critical.len(),
            important: report.important.len(),
            advisory: report.advisory.len(),
            caveats: report.caveats.len(),
            duration_ms,
        });
        Ok(report)
    }

    /// Normalize, score, deduplicate, and prioritize a collected snapshot.
    /// Pure: the same snapshot always yields the same report.
    pub fn reduce(&self, raw: &RawSnapshot, request: &ScanRequest) -> AuditReport {
        let snapshot = normalize(raw, &self.config.design, &self.events);
        let scoring = ScoringConfig::new(&self.config, request);
        let findings = score(&snapshot, &scoring);
        let deduped = deduplicate(findings, &snapshot, &scoring);
        let prioritized = prioritize(deduped.findings, &self.events);

        let mut caveats = snapshot.caveats.clone();
        caveats.extend(deduped.caveats);
        caveats.extend(prioritized.caveats);

        AuditReport {
            header: ReportHeader {
                source: snapshot.source.clone(),
                scanned_at: snapshot.scanned_at,
                engine_version: VERSION.to_string(),
                table_count: snapshot.tables.len(),
                total_size_bytes: snapshot.total_size_bytes(),
                phases: snapshot.phases.clone(),
            },
            critical: prioritized.critical,
            important: prioritized.important,
            advisory: prioritized.advisory,
            scorecard: prioritized.scorecard,
            caveats,
        }
    }
}

impl Default for AuditEngine {
    fn default() -> Self {
        Self::new(AuditConfig::default())
    }
}
