//! Structural diff between two record snapshots.
//!
//! The output shape mirrors the `(change, add, remove)` triples the
//! original dictdiffer-based layer produced, as an explicit tagged
//! enum: one [`DiffEntry::Change`] per differing field, plus at most
//! one batched [`DiffEntry::Added`] and one [`DiffEntry::Removed`]
//! entry with their pairs sorted by field name for replay stability.

use serde::{Deserialize, Serialize};

use crate::record::Snapshot;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum DiffEntry {
    /// A field present in both snapshots with unequal values.
    Change {
        field: String,
        old: Value,
        new: Value,
    },
    /// Fields present only in the new snapshot.
    Added { pairs: Vec<(String, Value)> },
    /// Fields present only in the old snapshot.
    Removed { pairs: Vec<(String, Value)> },
}

/// Computes the structural delta between two snapshots.
///
/// Pure function of its inputs: fields equal in both are omitted,
/// changes are visited in the old snapshot's insertion order, and
/// added/removed pairs are sorted by field name.
pub fn diff(old: &Snapshot, new: &Snapshot) -> Vec<DiffEntry> {
    let mut entries = Vec::new();

    for (field, old_value) in old.iter() {
        if let Some(new_value) = new.get(field) {
            if new_value != old_value {
                entries.push(DiffEntry::Change {
                    field: field.clone(),
                    old: old_value.clone(),
                    new: new_value.clone(),
                });
            }
        }
    }

    let mut added: Vec<(String, Value)> = new
        .iter()
        .filter(|(field, _)| !old.contains(field))
        .map(|(field, value)| (field.clone(), value.clone()))
        .collect();
    if !added.is_empty() {
        added.sort_by(|a, b| a.0.cmp(&b.0));
        entries.push(DiffEntry::Added { pairs: added });
    }

    let mut removed: Vec<(String, Value)> = old
        .iter()
        .filter(|(field, _)| !new.contains(field))
        .map(|(field, value)| (field.clone(), value.clone()))
        .collect();
    if !removed.is_empty() {
        removed.sort_by(|a, b| a.0.cmp(&b.0));
        entries.push(DiffEntry::Removed { pairs: removed });
    }

    entries
}

/// Every field name touched by the given entries, in entry order.
pub fn touched_fields(entries: &[DiffEntry]) -> Vec<&str> {
    let mut fields: Vec<&str> = Vec::new();
    for entry in entries {
        match entry {
            DiffEntry::Change { field, .. } => {
                if !fields.contains(&field.as_str()) {
                    fields.push(field);
                }
            }
            DiffEntry::Added { pairs } | DiffEntry::Removed { pairs } => {
                for (field, _) in pairs {
                    if !fields.contains(&field.as_str()) {
                        fields.push(field);
                    }
                }
            }
        }
    }
    fields
}

/// Replays the `Change` entries of a diff onto a loaded record.
///
/// Only changes are applied; additions and removals never reach a
/// stored row through approval replay.
pub fn apply_changes(record: &mut Snapshot, entries: &[DiffEntry]) {
    for entry in entries {
        if let DiffEntry::Change { field, new, .. } = entry {
            record.set(field.clone(), new.clone());
        }
    }
}

/// Materializes a brand-new record from the `Added` pairs of a diff.
pub fn build_record(entries: &[DiffEntry]) -> Snapshot {
    let mut record = Snapshot::new();
    for entry in entries {
        if let DiffEntry::Added { pairs } = entry {
            for (field, value) in pairs {
                record.set(field.clone(), value.clone());
            }
        }
    }
    record
}
