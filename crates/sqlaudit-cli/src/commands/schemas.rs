//! `sqlaudit schemas`.

use std::io::Write;
use std::path::Path;

use sqlaudit_storage::queries::catalog;
use sqlaudit_storage::CaptureDatabase;

use super::{emit, to_json};
use crate::error::CliError;
use crate::Outcome;

pub fn run(capture: &Path, json: bool, out: &mut dyn Write) -> Result<Outcome, CliError> {
    let db = CaptureDatabase::open(capture)?;
    let schemas = db.with_reader(catalog::query_schemas)?;

    if json {
        emit(out, &to_json(&schemas)?)?;
        return Ok(Outcome::Clean);
    }

    let width = schemas
        .iter()
        .map(|s| s.schema.len())
        .max()
        .unwrap_or(6)
        .max(6);
    let mut text = format!("{:<width$}  {:>6}  {:>12}  {:>14}\n", "SCHEMA", "TABLES", "ROWS", "BYTES");
    for s in &schemas {
        text.push_str(&format!(
            "{:<width$}  {:>6}  {:>12}  {:>14}\n",
            s.schema, s.table_count, s.row_count, s.size_bytes
        ));
    }
    text.push_str(&format!("{} schema(s)\n", schemas.len()));
    emit(out, &text)?;
    Ok(Outcome::Clean)
}
