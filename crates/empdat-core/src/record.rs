//! Record snapshots.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{EmpdatError, EmpdatResult};
use crate::value::Value;

/// One row of one resource at one point in time: a flat,
/// insertion-ordered mapping of field name to scalar value.
///
/// Insertion order is preserved so that diff output is reproducible
/// independent of hash-map iteration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot(IndexMap<String, Value>);

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    /// Builder-style [`set`](Self::set), handy when assembling records.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// Removes a field, preserving the order of the remaining fields.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.shift_remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn fields(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// The integer identifier stored under `id_field`, if present and
    /// non-null.
    pub fn opt_id(&self, id_field: &str) -> Option<i64> {
        self.get(id_field).and_then(Value::as_int)
    }

    /// The integer identifier stored under `id_field`, required.
    pub fn id(&self, id_field: &str, resource: &str) -> EmpdatResult<i64> {
        self.opt_id(id_field)
            .ok_or_else(|| EmpdatError::MissingIdentifier {
                resource: resource.to_owned(),
            })
    }
}

impl FromIterator<(String, Value)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
