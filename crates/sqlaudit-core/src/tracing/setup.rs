//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding the log filter.
pub const LOG_ENV_VAR: &str = "SQLAUDIT_LOG";

/// Initialize logging for sqlaudit.
///
/// Reads `SQLAUDIT_LOG` for per-module log levels, e.g.
/// `SQLAUDIT_LOG=sqlaudit_analysis::collect=debug,sqlaudit_storage=warn`.
/// Falls back to `sqlaudit=info` when unset or invalid.
///
/// Idempotent. Output goes to stderr so report output on stdout stays clean.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new("sqlaudit=info"));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .init();
    });
}
