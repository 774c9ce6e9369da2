//! `sqlaudit capture init`.

use std::io::Write;
use std::path::Path;

use sqlaudit_storage::queries::capture_info::{self, KEY_DATABASE, KEY_SERVER};
use sqlaudit_storage::CaptureWriter;

use super::emit;
use crate::error::CliError;
use crate::Outcome;

/// Create an empty capture with the current schema. Refuses to touch an
/// existing file.
pub fn init(
    path: &Path,
    server: Option<&str>,
    database: Option<&str>,
    out: &mut dyn Write,
) -> Result<Outcome, CliError> {
    if path.exists() {
        return Err(CliError::Io {
            path: path.display().to_string(),
            message: "file already exists".to_string(),
        });
    }

    let writer = CaptureWriter::create(path)?;
    writer.with_transaction(|tx| {
        if let Some(server) = server {
            capture_info::set_info(tx, KEY_SERVER, server)?;
        }
        if let Some(database) = database {
            capture_info::set_info(tx, KEY_DATABASE, database)?;
        }
        Ok(())
    })?;

    tracing::info!(path = %path.display(), "capture initialized");
    emit(out, &format!("Initialized capture at {}\n", path.display()))?;
    Ok(Outcome::Clean)
}
