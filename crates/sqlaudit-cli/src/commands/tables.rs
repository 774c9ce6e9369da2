//! `sqlaudit tables`.

use std::io::Write;
use std::path::Path;

use sqlaudit_storage::queries::catalog;
use sqlaudit_storage::CaptureDatabase;

use super::{emit, to_json};
use crate::error::CliError;
use crate::Outcome;

pub fn run(
    capture: &Path,
    schema: Option<&str>,
    json: bool,
    out: &mut dyn Write,
) -> Result<Outcome, CliError> {
    let db = CaptureDatabase::open(capture)?;
    let tables = db.with_reader(|conn| catalog::query_tables(conn, schema))?;

    if json {
        emit(out, &to_json(&tables)?)?;
        return Ok(Outcome::Clean);
    }

    let width = tables
        .iter()
        .map(|t| t.schema.len() + t.table.len() + 1)
        .max()
        .unwrap_or(5)
        .max(5);
    let mut text = format!(
        "{:<width$}  {:>12}  {:>14}  STORAGE\n",
        "TABLE", "ROWS", "BYTES"
    );
    for t in &tables {
        text.push_str(&format!(
            "{:<width$}  {:>12}  {:>14}  {}\n",
            format!("{}.{}", t.schema, t.table),
            t.row_count,
            t.size_bytes,
            t.storage
        ));
    }
    text.push_str(&format!("{} table(s)\n", tables.len()));
    emit(out, &text)?;
    Ok(Outcome::Clean)
}
