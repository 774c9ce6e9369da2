//! Collectors: read every requested phase from an [`AuditSource`]
//! concurrently and assemble a [`RawSnapshot`].
//!
//! Each phase is one job on a bounded rayon pool. Results come back over a
//! crossbeam channel; the calling thread polls it so cancellation and the
//! scan deadline are observed while collectors are still blocked on I/O.

pub mod outcome;
pub mod snapshot;

use std::collections::{BTreeMap, BTreeSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crossbeam_channel::RecvTimeoutError;
use sqlaudit_core::constants::{COLLECTOR_POLL_INTERVAL_MS, SYSTEM_SCHEMAS};
use sqlaudit_core::events::{ErrorEvent, EventDispatcher, PhaseCollectedEvent, PhaseSkippedEvent};
use sqlaudit_core::types::{
    CatalogRows, IndexUsageRows, MissingIndexRow, QueryStatRow, WaitStatRow,
};
use sqlaudit_core::{
    AuditErrorCode, AuditSource, Cancellable, CancellationToken, CollectError, Phase, ScanError,
    SkipReason,
};

pub use outcome::PhaseOutcome;
pub use snapshot::{RawSnapshot, RowCount};

use crate::normalize::QueryOrigin;
use crate::report::{Caveat, CaveatKind};
use crate::request::ScanRequest;

/// What one collector job produced.
enum PhaseData {
    Catalog(CatalogRows),
    IndexUsage(IndexUsageRows),
    MissingIndexes(Vec<MissingIndexRow>),
    QueryStats {
        rows: Vec<QueryStatRow>,
        origin: QueryOrigin,
        /// Why the query store was not used, when it was requested.
        fallback: Option<String>,
    },
    WaitStats(Vec<WaitStatRow>),
}

impl PhaseData {
    fn row_count(&self) -> usize {
        match self {
            Self::Catalog(rows) => rows.row_count(),
            Self::IndexUsage(rows) => RowCount::row_count(rows),
            Self::MissingIndexes(rows) => rows.len(),
            Self::QueryStats { rows, .. } => rows.len(),
            Self::WaitStats(rows) => rows.len(),
        }
    }
}

struct PhaseResult {
    phase: Phase,
    result: Result<PhaseData, CollectError>,
    elapsed: Duration,
}

#[derive(Debug, Clone, Copy)]
enum Interrupt {
    Cancelled,
    TimedOut,
}

/// Collect a raw snapshot.
///
/// Fatal: connection failures, any metadata error, and interrupts that leave
/// a non-degradable phase incomplete. Everything else becomes a
/// [`PhaseOutcome::Unavailable`] slot.
pub fn collect(
    source: Arc<dyn AuditSource>,
    request: &ScanRequest,
    cancel: &CancellationToken,
    events: &EventDispatcher,
) -> Result<RawSnapshot, ScanError> {
    let started = Instant::now();
    if cancel.is_cancelled() {
        return Err(ScanError::Cancelled);
    }
    if let Err(e) = source.ping() {
        report_fatal(events, &e);
        return Err(e.into());
    }

    let phases: Vec<Phase> = Phase::all()
        .iter()
        .copied()
        .filter(|p| request.is_requested(*p))
        .collect();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(request.concurrency.max(1))
        .thread_name(|i| format!("sqlaudit-collector-{i}"))
        .build()
        .map_err(|e| ScanError::Worker {
            message: e.to_string(),
        })?;

    let (tx, rx) = crossbeam_channel::unbounded::<PhaseResult>();
    for &phase in &phases {
        let tx = tx.clone();
        let source = Arc::clone(&source);
        let cancel = cancel.clone();
        let use_query_store = request.use_query_store;
        pool.spawn(move || {
            if cancel.is_cancelled() {
                return;
            }
            let job_started = Instant::now();
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                read_phase(source.as_ref(), phase, use_query_store)
            }))
            .unwrap_or_else(|_| {
                Err(CollectError::Query {
                    phase,
                    message: "collector panicked".to_string(),
                })
            });
            // The receiver is gone once the scan has been interrupted.
            let _ = tx.send(PhaseResult {
                phase,
                result,
                elapsed: job_started.elapsed(),
            });
        });
    }
    drop(tx);

    let deadline = started + request.timeout;
    let poll = Duration::from_millis(COLLECTOR_POLL_INTERVAL_MS);
    let mut pending: BTreeSet<Phase> = phases.iter().copied().collect();
    let mut collected: BTreeMap<Phase, PhaseData> = BTreeMap::new();
    let mut unavailable: BTreeMap<Phase, (SkipReason, String)> = BTreeMap::new();
    let mut interrupt = None;

    while !pending.is_empty() {
        if cancel.is_cancelled() {
            interrupt = Some(Interrupt::Cancelled);
            break;
        }
        let now = Instant::now();
        if now >= deadline {
            interrupt = Some(Interrupt::TimedOut);
            break;
        }
        let message = match rx.recv_timeout((deadline - now).min(poll)) {
            Ok(message) => message,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                if cancel.is_cancelled() {
                    interrupt = Some(Interrupt::Cancelled);
                    break;
                }
                return Err(ScanError::Worker {
                    message: format!("collector pool stopped with {} phase(s) pending", pending.len()),
                });
            }
        };

        let PhaseResult {
            phase,
            result,
            elapsed,
        } = message;
        pending.remove(&phase);
        let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        match result {
            Ok(data) => {
                let rows = data.row_count();
                tracing::info!(
                    phase = %phase,
                    rows_collected = rows,
                    collect_duration_ms = duration_ms,
                    "phase collected"
                );
                events.emit_phase_collected(&PhaseCollectedEvent {
                    phase,
                    rows,
                    duration_ms,
                });
                collected.insert(phase, data);
            }
            Err(e) if e.is_fatal() || phase == Phase::Metadata => {
                report_fatal(events, &e);
                return Err(e.into());
            }
            Err(e) => {
                let reason = e.skip_reason();
                let detail = e.to_string();
                skip_phase(events, phase, reason, &detail);
                unavailable.insert(phase, (reason, detail));
            }
        }
    }

    if let Some(interrupt) = interrupt {
        let degradable = pending
            .iter()
            .all(|p| p.is_signal() && request.degraded_phases.contains(p));
        let after_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        if !degradable {
            let error = match interrupt {
                Interrupt::Cancelled => ScanError::Cancelled,
                Interrupt::TimedOut => ScanError::TimedOut { after_ms },
            };
            tracing::warn!(pending = pending.len(), "scan interrupted, snapshot discarded");
            events.emit_error(&ErrorEvent {
                message: error.to_string(),
                error_code: error.error_code().to_string(),
            });
            return Err(error);
        }
        let reason = match interrupt {
            Interrupt::Cancelled => SkipReason::Cancelled,
            Interrupt::TimedOut => SkipReason::TimedOut,
        };
        for phase in pending {
            let detail = format!("interrupted after {after_ms} ms; degraded mode");
            skip_phase(events, phase, reason, &detail);
            unavailable.insert(phase, (reason, detail));
        }
    }

    let Some(PhaseData::Catalog(catalog)) = collected.remove(&Phase::Metadata) else {
        return Err(ScanError::Worker {
            message: "metadata collector produced no catalog".to_string(),
        });
    };

    let mut raw = RawSnapshot::from_catalog(source.describe(), scanned_at(source.as_ref()), catalog);
    for &phase in Phase::all().iter().filter(|p| p.is_signal()) {
        let data = collected.remove(&phase);
        let missing = unavailable.remove(&phase);
        match phase {
            Phase::IndexUsage => {
                raw.index_usage = outcome(data, missing, |d| match d {
                    PhaseData::IndexUsage(rows) => Some(rows),
                    _ => None,
                });
            }
            Phase::MissingIndex => {
                raw.missing_indexes = outcome(data, missing, |d| match d {
                    PhaseData::MissingIndexes(rows) => Some(rows),
                    _ => None,
                });
            }
            Phase::QueryStats => {
                let mut origin = QueryOrigin::PlanCache;
                raw.query_stats = outcome(data, missing, |d| match d {
                    PhaseData::QueryStats {
                        rows,
                        origin: o,
                        fallback,
                    } => {
                        origin = o;
                        if let Some(why) = fallback {
                            raw.caveats.push(Caveat::new(
                                CaveatKind::QueryStoreFallback,
                                format!("query store unavailable ({why}); used plan-cache statistics"),
                            ));
                        }
                        Some(rows)
                    }
                    _ => None,
                });
                raw.query_origin = origin;
            }
            Phase::WaitStats => {
                raw.wait_stats = outcome(data, missing, |d| match d {
                    PhaseData::WaitStats(rows) => Some(rows),
                    _ => None,
                });
            }
            Phase::Metadata => {}
        }
    }
    Ok(raw)
}

/// Assemble one phase slot. Zero rows is `Empty`, never `Unavailable`.
fn outcome<T: RowCount>(
    data: Option<PhaseData>,
    missing: Option<(SkipReason, String)>,
    extract: impl FnOnce(PhaseData) -> Option<T>,
) -> PhaseOutcome<T> {
    if let Some((reason, detail)) = missing {
        return PhaseOutcome::Unavailable { reason, detail };
    }
    match data.and_then(extract) {
        Some(rows) if rows.row_count() == 0 => PhaseOutcome::Empty,
        Some(rows) => PhaseOutcome::Collected(rows),
        None => PhaseOutcome::not_requested(),
    }
}

fn read_phase(
    source: &dyn AuditSource,
    phase: Phase,
    use_query_store: bool,
) -> Result<PhaseData, CollectError> {
    match phase {
        Phase::Metadata => source.read_catalog().map(|c| PhaseData::Catalog(without_system_schemas(c))),
        Phase::IndexUsage => source.read_index_usage().map(PhaseData::IndexUsage),
        Phase::MissingIndex => source.read_missing_indexes().map(PhaseData::MissingIndexes),
        Phase::QueryStats => read_query_stats(source, use_query_store),
        Phase::WaitStats => source.read_wait_stats().map(PhaseData::WaitStats),
    }
}

/// Query store first when requested, plan cache otherwise or as fallback.
fn read_query_stats(source: &dyn AuditSource, use_query_store: bool) -> Result<PhaseData, CollectError> {
    let mut fallback = None;
    if use_query_store {
        match source.read_query_store() {
            Ok(rows) if !rows.is_empty() => {
                return Ok(PhaseData::QueryStats {
                    rows,
                    origin: QueryOrigin::QueryStore,
                    fallback: None,
                });
            }
            Ok(_) => fallback = Some("query store returned no rows".to_string()),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::debug!(error = %e, "query store unavailable, falling back to plan cache");
                fallback = Some(e.skip_reason().to_string());
            }
        }
    }
    let rows = source.read_query_stats()?;
    Ok(PhaseData::QueryStats {
        rows,
        origin: QueryOrigin::PlanCache,
        fallback,
    })
}

fn without_system_schemas(mut catalog: CatalogRows) -> CatalogRows {
    let user = |schema: &str| !SYSTEM_SCHEMAS.iter().any(|s| s.eq_ignore_ascii_case(schema));
    catalog.tables.retain(|r| user(&r.schema));
    catalog.columns.retain(|r| user(&r.schema));
    catalog.indexes.retain(|r| user(&r.schema));
    catalog.index_columns.retain(|r| user(&r.schema));
    catalog.statistics.retain(|r| user(&r.schema));
    catalog
}

fn skip_phase(events: &EventDispatcher, phase: Phase, reason: SkipReason, detail: &str) {
    tracing::warn!(phase = %phase, reason = %reason, detail = %detail, "phase skipped");
    events.emit_phase_skipped(&PhaseSkippedEvent {
        phase,
        reason,
        detail: detail.to_string(),
    });
}

fn report_fatal(events: &EventDispatcher, error: &CollectError) {
    tracing::error!(error = %error, code = error.error_code(), "collection failed");
    events.emit_error(&ErrorEvent {
        message: error.to_string(),
        error_code: error.error_code().to_string(),
    });
}

fn scanned_at(source: &dyn AuditSource) -> i64 {
    source.snapshot_time().unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    })
}
