//! Object identifiers and identifier parsing.
//!
//! Collectors report objects in different shapes: catalog rows carry a plain
//! schema and table, missing-index telemetry carries a bracket-quoted
//! `[db].[schema].[table]` statement, column lists arrive as `[a], [b]`.
//! Everything is resolved to an [`ObjectName`] whose [`ObjectKey`] is the
//! case-insensitive join key used across collectors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_SCHEMA;

/// Case-insensitive lookup key for a schema-qualified object.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A schema-qualified object name as the catalog spells it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectName {
    pub schema: String,
    pub name: String,
}

impl ObjectName {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Parse a one- to four-part name. The last two parts are schema and
    /// object; a single part falls back to the default schema.
    ///
    /// Returns `None` for empty input or empty parts.
    pub fn parse(raw: &str) -> Option<Self> {
        let parts = split_identifier_list(raw, '.')?;
        match parts.as_slice() {
            [] => None,
            [name] => Some(Self::new(DEFAULT_SCHEMA, name.clone())),
            [.., schema, name] => Some(Self::new(schema.clone(), name.clone())),
        }
    }

    /// Join key: lowercase `schema.name`.
    pub fn key(&self) -> ObjectKey {
        ObjectKey(format!(
            "{}.{}",
            self.schema.to_lowercase(),
            self.name.to_lowercase()
        ))
    }

    /// Bracket-quoted form suitable for generated DDL text.
    pub fn quoted(&self) -> String {
        format!("{}.{}", quote_identifier(&self.schema), quote_identifier(&self.name))
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// Parse a comma-separated column list such as `[CustomerID], [OrderDate]`.
///
/// `None` or blank input yields an empty list. Malformed entries (unbalanced
/// brackets, empty names) are dropped.
pub fn parse_column_list(raw: Option<&str>) -> Vec<String> {
    match raw.map(str::trim) {
        None | Some("") => Vec::new(),
        Some(list) => split_identifier_list(list, ',').unwrap_or_else(|| {
            list.split(',')
                .map(|c| unquote(c.trim()))
                .filter(|c| !c.is_empty())
                .collect()
        }),
    }
}

/// Wrap an identifier in brackets, escaping `]`.
pub fn quote_identifier(ident: &str) -> String {
    format!("[{}]", ident.replace(']', "]]"))
}

/// Split on `sep` outside of `[...]` and `"..."` quoting, unquoting each part.
/// Returns `None` when quoting is unbalanced or a part is empty.
fn split_identifier_list(raw: &str, sep: char) -> Option<Vec<String>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars().peekable();
    let mut in_bracket = false;
    let mut in_quote = false;

    while let Some(c) = chars.next() {
        match c {
            '[' if !in_bracket && !in_quote => in_bracket = true,
            ']' if in_bracket => {
                if chars.peek() == Some(&']') {
                    chars.next();
                    current.push(']');
                } else {
                    in_bracket = false;
                }
            }
            '"' if !in_bracket => in_quote = !in_quote,
            c if c == sep && !in_bracket && !in_quote => {
                let part = current.trim().to_string();
                if part.is_empty() {
                    return None;
                }
                parts.push(part);
                current.clear();
            }
            c => current.push(c),
        }
    }

    if in_bracket || in_quote {
        return None;
    }
    let last = current.trim().to_string();
    if last.is_empty() {
        return None;
    }
    parts.push(last);
    Some(parts)
}

fn unquote(part: &str) -> String {
    part.trim_start_matches(['[', '"'])
        .trim_end_matches([']', '"'])
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_three_part_statement() {
        let name = ObjectName::parse("[Sales].[dbo].[Orders]").unwrap();
        assert_eq!(name, ObjectName::new("dbo", "Orders"));
    }

    #[test]
    fn single_part_uses_default_schema() {
        let name = ObjectName::parse("Orders").unwrap();
        assert_eq!(name.schema, "dbo");
    }

    #[test]
    fn dots_inside_brackets_are_kept() {
        let name = ObjectName::parse("[dbo].[Order.Lines]").unwrap();
        assert_eq!(name.name, "Order.Lines");
    }

    #[test]
    fn keys_are_case_insensitive() {
        let a = ObjectName::parse("[DBO].[orders]").unwrap();
        let b = ObjectName::parse("dbo.Orders").unwrap();
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn rejects_unbalanced_brackets() {
        assert!(ObjectName::parse("[dbo.Orders").is_none());
        assert!(ObjectName::parse("").is_none());
        assert!(ObjectName::parse("dbo..Orders").is_none());
    }

    #[test]
    fn parses_column_lists() {
        assert_eq!(
            parse_column_list(Some("[CustomerID], [OrderDate]")),
            vec!["CustomerID".to_string(), "OrderDate".to_string()]
        );
        assert!(parse_column_list(None).is_empty());
        assert!(parse_column_list(Some("  ")).is_empty());
    }

    #[test]
    fn escaped_bracket_round_trips_through_quoting() {
        let quoted = quote_identifier("odd]name");
        assert_eq!(quoted, "[odd]]name]");
        let name = ObjectName::parse(&format!("[dbo].{quoted}")).unwrap();
        assert_eq!(name.name, "odd]name");
    }
}
