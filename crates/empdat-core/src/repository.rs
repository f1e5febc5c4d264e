//! Repository contract and resource catalog.
//!
//! The backing store is an external collaborator: anything that can
//! create/read/filter/update/destroy flat records on a named,
//! identifier-keyed resource satisfies [`RecordStore`].

use std::collections::HashMap;

use crate::error::{EmpdatError, EmpdatResult};
use crate::record::Snapshot;
use crate::validator::{self, ValidatorRule};
use crate::value::Value;

/// Static description of one resource: its stable lowercase name, the
/// field that keys it, display labels, and field validator rules.
#[derive(Debug, Clone)]
pub struct ResourceDef {
    name: String,
    id_field: String,
    labels: HashMap<String, String>,
    validators: HashMap<String, ValidatorRule>,
}

impl ResourceDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_lowercase(),
            id_field: "id".to_owned(),
            labels: HashMap::new(),
            validators: HashMap::new(),
        }
    }

    pub fn with_id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self
    }

    pub fn with_label(mut self, field: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(field.into(), label.into());
        self
    }

    pub fn with_validator(mut self, field: impl Into<String>, rule: ValidatorRule) -> Self {
        self.validators.insert(field.into(), rule);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Display label for a field, falling back to the raw field name.
    pub fn label<'a>(&'a self, field: &'a str) -> &'a str {
        self.labels.get(field).map_or(field, String::as_str)
    }

    /// Pre-checks every validated field present in the snapshot.
    pub fn validate(&self, record: &Snapshot) -> EmpdatResult<()> {
        for (field, rule) in &self.validators {
            if let Some(value) = record.get(field) {
                if !validator::validate(rule, value)? {
                    return Err(EmpdatError::ValidationFailed {
                        field: field.clone(),
                        message: format!("value {value} fails the declared validator"),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Registry of known resources, keyed by lowercase name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    resources: HashMap<String, ResourceDef>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, def: ResourceDef) {
        self.resources.insert(def.name.clone(), def);
    }

    pub fn get(&self, name: &str) -> EmpdatResult<&ResourceDef> {
        let key = name.to_lowercase();
        self.resources
            .get(&key)
            .ok_or(EmpdatError::ResourceNotFound { name: key })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resources.contains_key(&name.to_lowercase())
    }
}

/// Storage contract consumed by the dispatch layer.
///
/// Implementations are keyed by the resource's identifier field
/// (`read`/`update`/`destroy`) and return records as flat snapshots.
pub trait RecordStore: Send + Sync {
    /// Persists a new record, assigning an identifier when the record
    /// carries none, and returns the stored snapshot.
    fn create(&self, resource: &ResourceDef, record: Snapshot) -> EmpdatResult<Snapshot>;

    fn read(&self, resource: &ResourceDef, id: i64) -> EmpdatResult<Option<Snapshot>>;

    /// Equality-filtered read. A `Null` filter value matches rows
    /// where the field is null or absent.
    fn read_by(
        &self,
        resource: &ResourceDef,
        filters: &[(String, Value)],
    ) -> EmpdatResult<Vec<Snapshot>>;

    fn read_all(&self, resource: &ResourceDef) -> EmpdatResult<Vec<Snapshot>>;

    /// Replaces the row keyed by the record's identifier field.
    fn update(&self, resource: &ResourceDef, record: Snapshot) -> EmpdatResult<Snapshot>;

    fn destroy(&self, resource: &ResourceDef, id: i64) -> EmpdatResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_names_are_lowercased() {
        let def = ResourceDef::new("Employee");
        assert_eq!(def.name(), "employee");
        let mut catalog = Catalog::new();
        catalog.register(def);
        assert!(catalog.get("EMPLOYEE").is_ok());
        assert!(matches!(
            catalog.get("ghost"),
            Err(EmpdatError::ResourceNotFound { .. })
        ));
    }

    #[test]
    fn validation_reports_the_offending_field() {
        let def = ResourceDef::new("employee")
            .with_validator("last_name", ValidatorRule::named("alpha"));
        let good = Snapshot::new().with("last_name", "Doe");
        let bad = Snapshot::new().with("last_name", "Doe 2");
        assert!(def.validate(&good).is_ok());
        match def.validate(&bad) {
            Err(EmpdatError::ValidationFailed { field, .. }) => assert_eq!(field, "last_name"),
            other => panic!("expected validation failure, got {other:?}"),
        }
    }
}
