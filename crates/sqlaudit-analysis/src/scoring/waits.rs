//! Wait bottlenecks.
//!
//! Waits are filtered through a fixed set of benign/idle types, ranked by
//! total wait time, and mapped through [`WAIT_RULES`] to a likely cause and
//! a first action. Severity depends only on a wait's own time; its share of
//! the filtered total is reported but never graded.

use super::{Finding, FindingKind, ScoringConfig, Severity};
use crate::normalize::{Snapshot, WaitStat};

/// Idle and background waits that say nothing about workload health.
pub const EXCLUDED_WAITS: &[&str] = &[
    "BROKER_EVENTHANDLER",
    "BROKER_RECEIVE_WAITFOR",
    "BROKER_TASK_STOP",
    "BROKER_TO_FLUSH",
    "BROKER_TRANSMITTER",
    "CHECKPOINT_QUEUE",
    "CHKPT",
    "CLR_AUTO_EVENT",
    "CLR_MANUAL_EVENT",
    "CLR_SEMAPHORE",
    "DBMIRROR_DBM_EVENT",
    "DBMIRROR_EVENTS_QUEUE",
    "DBMIRROR_WORKER_QUEUE",
    "DBMIRRORING_CMD",
    "DIRTY_PAGE_POLL",
    "DISPATCHER_QUEUE_SEMAPHORE",
    "EXECSYNC",
    "FSAGENT",
    "FT_IFTS_SCHEDULER_IDLE_WAIT",
    "FT_IFTSHC_MUTEX",
    "HADR_CLUSAPI_CALL",
    "HADR_FILESTREAM_IOMGR_IOCOMPLETION",
    "HADR_LOGCAPTURE_WAIT",
    "HADR_NOTIFICATION_DEQUEUE",
    "HADR_TIMER_TASK",
    "HADR_WORK_QUEUE",
    "KSOURCE_WAKEUP",
    "LAZYWRITER_SLEEP",
    "LOGMGR_QUEUE",
    "MEMORY_ALLOCATION_EXT",
    "ONDEMAND_TASK_QUEUE",
    "PREEMPTIVE_XE_GETTARGETSTATE",
    "PWAIT_ALL_COMPONENTS_INITIALIZED",
    "PWAIT_DIRECTLOGCONSUMER_GETNEXT",
    "QDS_ASYNC_QUEUE",
    "QDS_CLEANUP_STALE_QUERIES_TASK_MAIN_LOOP_SLEEP",
    "QDS_PERSIST_TASK_MAIN_LOOP_SLEEP",
    "REQUEST_FOR_DEADLOCK_SEARCH",
    "RESOURCE_QUEUE",
    "SERVER_IDLE_CHECK",
    "SNI_HTTP_ACCEPT",
    "SP_SERVER_DIAGNOSTICS_SLEEP",
    "SQLTRACE_BUFFER_FLUSH",
    "SQLTRACE_INCREMENTAL_FLUSH_SLEEP",
    "SQLTRACE_WAIT_ENTRIES",
    "WAIT_FOR_RESULTS",
    "WAITFOR",
    "WAITFOR_TASKSHUTDOWN",
    "WAIT_XTP_CKPT_CLOSE",
    "WAIT_XTP_HOST_WAIT",
    "WAIT_XTP_OFFLINE_CKPT_NEW_LOG",
    "WAIT_XTP_RECOVERY",
    "XE_DISPATCHER_JOIN",
    "XE_DISPATCHER_WAIT",
    "XE_TIMER_EVENT",
];

/// Every `SLEEP_*` wait is idle.
const EXCLUDED_PREFIX: &str = "SLEEP_";

pub fn is_excluded_wait(wait_type: &str) -> bool {
    let upper = wait_type.to_ascii_uppercase();
    upper.starts_with(EXCLUDED_PREFIX) || EXCLUDED_WAITS.contains(&upper.as_str())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitMatch {
    Exact(&'static str),
    Prefix(&'static str),
}

/// Wait type → likely cause → first action.
#[derive(Debug, Clone, Copy)]
pub struct WaitRule {
    pub matches: WaitMatch,
    pub cause: &'static str,
    pub action: &'static str,
}

pub const WAIT_RULES: &[WaitRule] = &[
    WaitRule {
        matches: WaitMatch::Prefix("PAGEIOLATCH_"),
        cause: "disk I/O pressure / missing index",
        action: "Add the missing indexes listed in this audit and review data file latency",
    },
    WaitRule {
        matches: WaitMatch::Exact("WRITELOG"),
        cause: "transaction log write latency",
        action: "Move the transaction log to faster storage or batch small commits",
    },
    WaitRule {
        matches: WaitMatch::Prefix("LCK_M_"),
        cause: "lock contention / blocking",
        action: "Review blocking chains and shorten long-running transactions",
    },
    WaitRule {
        matches: WaitMatch::Exact("CXPACKET"),
        cause: "parallelism skew",
        action: "Tune cost threshold for parallelism and max degree of parallelism",
    },
    WaitRule {
        matches: WaitMatch::Exact("CXCONSUMER"),
        cause: "parallelism skew",
        action: "Tune cost threshold for parallelism and max degree of parallelism",
    },
    WaitRule {
        matches: WaitMatch::Exact("SOS_SCHEDULER_YIELD"),
        cause: "CPU pressure",
        action: "Tune the top CPU queries listed in this audit",
    },
    WaitRule {
        matches: WaitMatch::Exact("RESOURCE_SEMAPHORE"),
        cause: "memory grant pressure",
        action: "Reduce memory grants by fixing oversized sorts and hashes",
    },
    WaitRule {
        matches: WaitMatch::Prefix("PAGELATCH_"),
        cause: "in-memory page contention (tempdb or last-page inserts)",
        action: "Add tempdb data files or spread hot inserts across the key range",
    },
    WaitRule {
        matches: WaitMatch::Exact("ASYNC_NETWORK_IO"),
        cause: "client not consuming result sets",
        action: "Review client code that processes rows while holding result sets open",
    },
    WaitRule {
        matches: WaitMatch::Exact("THREADPOOL"),
        cause: "worker thread exhaustion",
        action: "Investigate blocking and parallel load that exhaust worker threads",
    },
    WaitRule {
        matches: WaitMatch::Exact("IO_COMPLETION"),
        cause: "non-data-page I/O (spills, backups)",
        action: "Review tempdb spills and backup I/O placement",
    },
];

pub fn lookup_wait(wait_type: &str) -> Option<&'static WaitRule> {
    let upper = wait_type.to_ascii_uppercase();
    WAIT_RULES.iter().find(|rule| match rule.matches {
        WaitMatch::Exact(name) => upper == name,
        WaitMatch::Prefix(prefix) => upper.starts_with(prefix),
    })
}

pub(super) fn score(snapshot: &Snapshot, config: &ScoringConfig, out: &mut Vec<Finding>) {
    let mut waits: Vec<&WaitStat> = snapshot
        .waits
        .iter()
        .filter(|w| !is_excluded_wait(&w.wait_type) && w.wait_time_ms > 0)
        .collect();
    let total = waits
        .iter()
        .fold(0u64, |acc, w| acc.saturating_add(w.wait_time_ms));
    if total == 0 {
        return;
    }
    waits.sort_by(|a, b| {
        b.wait_time_ms
            .cmp(&a.wait_time_ms)
            .then_with(|| a.wait_type.cmp(&b.wait_type))
    });

    // Mapped waits at the Critical level are reported even past the top N.
    let scored = waits.into_iter().enumerate().filter(|(rank, w)| {
        *rank < config.wait_top_n
            || (lookup_wait(&w.wait_type).is_some()
                && config.wait_severity(w.wait_time_ms) == Severity::Critical)
    });

    for (_, wait) in scored {
        let share = wait.wait_time_ms as f64 * 100.0 / total as f64;
        let rule = lookup_wait(&wait.wait_type);
        let (severity, action, reason) = match rule {
            Some(rule) => (
                config.wait_severity(wait.wait_time_ms),
                rule.action.to_string(),
                format!(
                    "{} waited {} ms ({share:.1}% of filtered wait time); likely cause: {}",
                    wait.wait_type, wait.wait_time_ms, rule.cause
                ),
            ),
            None => (
                Severity::Advisory,
                format!("Investigate wait type {}", wait.wait_type),
                format!(
                    "{} waited {} ms ({share:.1}% of filtered wait time); no known cause mapping",
                    wait.wait_type, wait.wait_time_ms
                ),
            ),
        };

        out.push(Finding {
            kind: FindingKind::WaitBottleneck {
                wait: wait.id,
                share_percent: share,
                cause: rule.map(|r| r.cause.to_string()),
            },
            subject: wait.wait_type.clone(),
            severity,
            reason,
            action,
            risk: format!(
                "sessions keep stalling on {} for {} ms of wait time",
                wait.wait_type, wait.wait_time_ms
            ),
            magnitude: wait.wait_time_ms as f64,
            ddl: None,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_waits_are_excluded() {
        assert!(is_excluded_wait("LAZYWRITER_SLEEP"));
        assert!(is_excluded_wait("sleep_task"));
        assert!(!is_excluded_wait("PAGEIOLATCH_SH"));
    }

    #[test]
    fn prefixes_match_every_latch_mode() {
        for wait in ["PAGEIOLATCH_SH", "PAGEIOLATCH_EX", "pageiolatch_up"] {
            let rule = lookup_wait(wait).unwrap();
            assert_eq!(rule.cause, "disk I/O pressure / missing index");
        }
        assert!(lookup_wait("MADE_UP_WAIT").is_none());
    }

    #[test]
    fn severity_follows_absolute_wait_time() {
        let config = ScoringConfig::default();
        assert_eq!(config.wait_severity(60_000), Severity::Critical);
        assert_eq!(config.wait_severity(59_999), Severity::Important);
        assert_eq!(config.wait_severity(10_000), Severity::Important);
        assert_eq!(config.wait_severity(9_999), Severity::Advisory);
    }

    #[test]
    fn no_excluded_wait_is_mapped() {
        for wait in EXCLUDED_WAITS {
            assert!(lookup_wait(wait).is_none(), "{wait} is both excluded and mapped");
        }
    }
}
