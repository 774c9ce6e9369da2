//! `sqlaudit scan`: audit a capture and render the report.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sqlaudit_analysis::reporters::create_reporter;
use sqlaudit_analysis::AuditEngine;
use sqlaudit_core::{AuditConfig, CancellationToken};
use sqlaudit_storage::CaptureSource;

use super::emit;
use crate::args::ScanArgs;
use crate::error::CliError;
use crate::Outcome;

pub fn run(root: &Path, args: &ScanArgs, out: &mut dyn Write) -> Result<Outcome, CliError> {
    let mut config = AuditConfig::load(root, Some(&args.overrides()))?;
    if args.query_store {
        config.source.use_query_store = Some(true);
    }
    if args.no_color || args.output.is_some() {
        config.report.color = Some(false);
    }

    let capture = capture_path(root, args, &config)?;
    let source = CaptureSource::open(&capture)?;
    let engine = AuditEngine::new(config.clone());
    let request = engine.request();
    // The CLI bounds a scan with `--timeout-secs` only. Ctrl-C terminates the
    // process; the capture is opened read-only so nothing is left half-written.
    let report = engine.run(Arc::new(source), &request, &CancellationToken::new())?;

    let format = config.report.effective_format();
    let reporter = create_reporter(&format, config.report.effective_color())
        .ok_or_else(|| CliError::UnknownFormat {
            format: format.clone(),
        })?;
    let rendered = reporter
        .generate(&report)
        .map_err(|message| CliError::Render { message })?;

    match &args.output {
        Some(path) => {
            fs::write(path, &rendered).map_err(|e| CliError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            emit(out, &format!("Report written to {}\n", path.display()))?;
        }
        None => emit(out, &rendered)?,
    }

    Ok(if report.has_critical() {
        Outcome::CriticalFindings
    } else {
        Outcome::Clean
    })
}

/// `--capture` as given; a configured path is relative to the project root.
fn capture_path(root: &Path, args: &ScanArgs, config: &AuditConfig) -> Result<PathBuf, CliError> {
    if let Some(ref path) = args.capture {
        return Ok(path.clone());
    }
    config
        .source
        .capture_path
        .as_deref()
        .map(|p| root.join(p))
        .ok_or(CliError::MissingCapture)
}
