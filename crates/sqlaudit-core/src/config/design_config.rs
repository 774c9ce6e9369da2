//! Design-smell rule configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_AUDIT_CREATED_COLUMNS, DEFAULT_AUDIT_MODIFIED_COLUMNS, DEFAULT_DEPRECATED_TYPES,
    DEFAULT_STAGING_PREFIXES, DEFAULT_STAGING_SCHEMAS, DEFAULT_WIDE_TABLE_COLUMNS,
};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DesignConfig {
    /// Column count above which a table is wide. Default: 50.
    pub wide_table_columns: Option<usize>,
    /// Schemas holding staging tables (exempt from the heap rule).
    pub staging_schemas: Vec<String>,
    /// Table name prefixes marking staging tables.
    pub staging_prefixes: Vec<String>,
    /// Accepted "created" audit column names.
    pub audit_created_columns: Vec<String>,
    /// Accepted "modified" audit column names.
    pub audit_modified_columns: Vec<String>,
    /// Deprecated column types.
    pub deprecated_types: Vec<String>,
}

fn or_defaults(values: &[String], defaults: &[&str]) -> Vec<String> {
    if values.is_empty() {
        defaults.iter().map(|s| s.to_string()).collect()
    } else {
        values.iter().map(|s| s.to_lowercase()).collect()
    }
}

impl DesignConfig {
    pub fn effective_wide_table_columns(&self) -> usize {
        self.wide_table_columns.unwrap_or(DEFAULT_WIDE_TABLE_COLUMNS)
    }

    pub fn effective_staging_schemas(&self) -> Vec<String> {
        or_defaults(&self.staging_schemas, &DEFAULT_STAGING_SCHEMAS)
    }

    pub fn effective_staging_prefixes(&self) -> Vec<String> {
        or_defaults(&self.staging_prefixes, &DEFAULT_STAGING_PREFIXES)
    }

    /// Lowercase, underscore-free forms.
    pub fn effective_audit_created_columns(&self) -> Vec<String> {
        or_defaults(&self.audit_created_columns, &DEFAULT_AUDIT_CREATED_COLUMNS)
            .into_iter()
            .map(|c| c.replace('_', ""))
            .collect()
    }

    /// Lowercase, underscore-free forms.
    pub fn effective_audit_modified_columns(&self) -> Vec<String> {
        or_defaults(&self.audit_modified_columns, &DEFAULT_AUDIT_MODIFIED_COLUMNS)
            .into_iter()
            .map(|c| c.replace('_', ""))
            .collect()
    }

    pub fn effective_deprecated_types(&self) -> Vec<String> {
        or_defaults(&self.deprecated_types, &DEFAULT_DEPRECATED_TYPES)
    }

    pub(crate) fn merge_from(&mut self, other: &DesignConfig) {
        if other.wide_table_columns.is_some() {
            self.wide_table_columns = other.wide_table_columns;
        }
        if !other.staging_schemas.is_empty() {
            self.staging_schemas = other.staging_schemas.clone();
        }
        if !other.staging_prefixes.is_empty() {
            self.staging_prefixes = other.staging_prefixes.clone();
        }
        if !other.audit_created_columns.is_empty() {
            self.audit_created_columns = other.audit_created_columns.clone();
        }
        if !other.audit_modified_columns.is_empty() {
            self.audit_modified_columns = other.audit_modified_columns.clone();
        }
        if !other.deprecated_types.is_empty() {
            self.deprecated_types = other.deprecated_types.clone();
        }
    }
}
