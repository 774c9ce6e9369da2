//! `sqlaudit describe`.

use std::io::Write;
use std::path::Path;

use sqlaudit_core::ObjectName;
use sqlaudit_storage::queries::catalog::{self, IndexDescription, TableDescription};
use sqlaudit_storage::CaptureDatabase;

use super::{emit, to_json};
use crate::error::CliError;
use crate::Outcome;

pub fn run(capture: &Path, table: &str, json: bool, out: &mut dyn Write) -> Result<Outcome, CliError> {
    let name = ObjectName::parse(table).ok_or_else(|| CliError::InvalidTableName {
        table: table.to_string(),
    })?;
    let db = CaptureDatabase::open(capture)?;
    let description = db
        .with_reader(|conn| catalog::describe_table(conn, &name.schema, &name.name))?
        .ok_or_else(|| CliError::TableNotFound {
            table: name.to_string(),
        })?;

    let text = if json {
        to_json(&description)?
    } else {
        render(&description)
    };
    emit(out, &text)?;
    Ok(Outcome::Clean)
}

fn render(d: &TableDescription) -> String {
    let t = &d.table;
    let mut text = format!(
        "{}.{} ({} rows, {} bytes, {}, {} trigger(s))\n\nColumns:\n",
        t.schema, t.table, t.row_count, t.size_bytes, t.storage, t.trigger_count
    );
    let width = d.columns.iter().map(|c| c.column.len()).max().unwrap_or(0);
    for c in &d.columns {
        text.push_str(&format!(
            "  {:>3}  {:<width$}  {:<16} {}{}\n",
            c.ordinal,
            c.column,
            c.data_type,
            if c.is_nullable { "NULL" } else { "NOT NULL" },
            if c.is_primary_key { "  PK" } else { "" },
        ));
    }

    text.push_str("\nIndexes:\n");
    if d.indexes.is_empty() {
        text.push_str("  none\n");
    }
    for index in &d.indexes {
        text.push_str(&format!("  {}\n", index_line(index)));
    }
    text
}

fn index_line(d: &IndexDescription) -> String {
    let index = &d.index;
    let mut flags = vec![index.index_type.clone()];
    if index.is_primary_key {
        flags.push("primary key".to_string());
    } else if index.is_unique_constraint {
        flags.push("unique constraint".to_string());
    } else if index.is_unique {
        flags.push("unique".to_string());
    }
    let mut line = format!(
        "{} [{}] ({})",
        index.index_name,
        flags.join(", "),
        d.key_columns.join(", ")
    );
    if !d.included_columns.is_empty() {
        line.push_str(&format!(" INCLUDE ({})", d.included_columns.join(", ")));
    }
    line
}
