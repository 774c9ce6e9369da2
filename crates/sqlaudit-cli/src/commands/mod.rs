//! One module per subcommand.

pub mod capture;
pub mod describe;
pub mod scan;
pub mod schemas;
pub mod tables;

use std::io::Write;

use crate::error::CliError;

/// Write `text` to the command output.
pub(crate) fn emit(out: &mut dyn Write, text: &str) -> Result<(), CliError> {
    out.write_all(text.as_bytes())
        .and_then(|_| out.flush())
        .map_err(|e| CliError::Io {
            path: "<stdout>".to_string(),
            message: e.to_string(),
        })
}

pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value)
        .map(|mut s| {
            s.push('\n');
            s
        })
        .map_err(|e| CliError::Render {
            message: e.to_string(),
        })
}
