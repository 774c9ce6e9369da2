//! Redundant index detection: exact ordered key-prefix matches.

use crate::normalize::{IndexDescriptor, IndexKind, Snapshot};

/// A redundant index and the index that supersedes it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Redundancy<'a> {
    pub index: &'a IndexDescriptor,
    pub superseded_by: &'a IndexDescriptor,
}

/// Every droppable index whose key columns are an ordered prefix of another
/// index on the same table, in index id order.
pub fn find_redundant(snapshot: &Snapshot) -> Vec<Redundancy<'_>> {
    let mut found = Vec::new();
    for index in &snapshot.indexes {
        if index.is_protected() || index.key_columns.is_empty() {
            continue;
        }
        let superseding = snapshot
            .indexes_of(index.table)
            .filter(|other| supersedes(other, index))
            .min_by(|a, b| {
                b.key_columns
                    .len()
                    .cmp(&a.key_columns.len())
                    .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            });
        if let Some(superseded_by) = superseding {
            found.push(Redundancy {
                index,
                superseded_by,
            });
        }
    }
    found
}

/// Whether `wider` makes `narrow` redundant.
fn supersedes(wider: &IndexDescriptor, narrow: &IndexDescriptor) -> bool {
    if wider.id == narrow.id
        || wider.kind.is_columnstore()
        || wider.kind == IndexKind::Other
        || wider.key_columns.len() < narrow.key_columns.len()
    {
        return false;
    }
    let is_prefix = narrow
        .key_columns
        .iter()
        .zip(wider.key_columns.iter())
        .all(|(a, b)| a.eq_ignore_ascii_case(b));
    if !is_prefix {
        return false;
    }

    let identical = wider.key_columns.len() == narrow.key_columns.len();
    // A unique index enforces something a wider key cannot.
    if narrow.is_unique && !(identical && wider.is_unique) {
        return false;
    }
    if identical && !wider.is_protected() {
        // Exact duplicates: only the later name is reported.
        return wider.name.to_lowercase() < narrow.name.to_lowercase();
    }
    true
}
