//! Role policy model.
//!
//! A role declares what it may create, read (by exclusion), update
//! (by field allow-list), destroy, and which named capabilities it
//! holds. A missing rule set means deny for create/update/destroy and
//! custom capabilities, and allow for read: read is opt-out, not
//! opt-in.

use std::collections::{HashMap, HashSet};

use crate::error::{EmpdatError, EmpdatResult};

/// A set of resource (or operation) names, or a wildcard covering all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceSet {
    All,
    Named(HashSet<String>),
}

impl ResourceSet {
    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ResourceSet::Named(names.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, name: &str) -> bool {
        match self {
            ResourceSet::All => true,
            ResourceSet::Named(set) => set.contains(name),
        }
    }
}

/// A set of field names, or a wildcard covering every field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSet {
    All,
    Named(HashSet<String>),
}

impl FieldSet {
    pub fn named<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldSet::Named(fields.into_iter().map(Into::into).collect())
    }

    pub fn permits(&self, field: &str) -> bool {
        match self {
            FieldSet::All => true,
            FieldSet::Named(set) => set.contains(field),
        }
    }
}

/// Read exclusions: either the whole catalog, or per-resource field
/// lists (where a field-level wildcard denies the whole read).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadDenials {
    AllResources,
    PerResource(HashMap<String, FieldSet>),
}

/// Update grants: a blanket wildcard, or per-resource field
/// allow-lists that route permitted mutations through approval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateGrants {
    All,
    PerResource(HashMap<String, FieldSet>),
}

/// How a read of one resource should be handled for a role.
#[derive(Debug, PartialEq, Eq)]
pub enum ReadAccess<'a> {
    /// Hand the record back unchanged.
    Allow,
    /// Refuse the read entirely.
    Deny,
    /// Strip the listed fields before handing the record back.
    Strip(&'a HashSet<String>),
}

/// How an update of one resource should be handled for a role.
#[derive(Debug, PartialEq, Eq)]
pub enum UpdateAccess<'a> {
    /// Blanket privilege: apply directly, no change request.
    Direct,
    /// Field allow-list: permitted mutations become change requests.
    Fields(&'a FieldSet),
    /// No grant for this resource at all.
    Denied,
}

/// Static per-role policy bundle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RolePolicy {
    pub can_create: Option<ResourceSet>,
    pub cant_read: Option<ReadDenials>,
    pub can_update: Option<UpdateGrants>,
    pub can_destroy: Option<ResourceSet>,
    /// Named capabilities (e.g. `can_approve`), each a set of subject
    /// names or a wildcard.
    pub custom: HashMap<String, ResourceSet>,
}

impl RolePolicy {
    pub fn allows_create(&self, resource: &str) -> bool {
        self.can_create
            .as_ref()
            .is_some_and(|set| set.contains(resource))
    }

    pub fn allows_destroy(&self, resource: &str) -> bool {
        self.can_destroy
            .as_ref()
            .is_some_and(|set| set.contains(resource))
    }

    pub fn read_access(&self, resource: &str) -> ReadAccess<'_> {
        match &self.cant_read {
            None => ReadAccess::Allow,
            Some(ReadDenials::AllResources) => ReadAccess::Deny,
            Some(ReadDenials::PerResource(map)) => match map.get(resource) {
                None => ReadAccess::Allow,
                Some(FieldSet::All) => ReadAccess::Deny,
                Some(FieldSet::Named(fields)) => ReadAccess::Strip(fields),
            },
        }
    }

    pub fn update_access(&self, resource: &str) -> UpdateAccess<'_> {
        match &self.can_update {
            None => UpdateAccess::Denied,
            Some(UpdateGrants::All) => UpdateAccess::Direct,
            Some(UpdateGrants::PerResource(map)) => match map.get(resource) {
                None => UpdateAccess::Denied,
                Some(fields) => UpdateAccess::Fields(fields),
            },
        }
    }

    /// Membership test for a named capability such as `can_approve`.
    pub fn allows_custom(&self, capability: &str, subject: &str) -> bool {
        self.custom
            .get(capability)
            .is_some_and(|set| set.contains(subject))
    }
}

/// Role name to policy bundle. Read-only after startup.
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    roles: HashMap<String, RolePolicy>,
}

impl PolicyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, role: impl Into<String>, policy: RolePolicy) {
        self.roles.insert(role.into(), policy);
    }

    pub fn get(&self, role: &str) -> EmpdatResult<&RolePolicy> {
        self.roles
            .get(role)
            .ok_or_else(|| EmpdatError::UnknownRole {
                name: role.to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_rule_sets_default_deny_except_read() {
        let policy = RolePolicy::default();
        assert!(!policy.allows_create("employee"));
        assert!(!policy.allows_destroy("employee"));
        assert_eq!(policy.update_access("employee"), UpdateAccess::Denied);
        assert_eq!(policy.read_access("employee"), ReadAccess::Allow);
        assert!(!policy.allows_custom("can_approve", "employee"));
    }

    #[test]
    fn field_level_wildcard_denies_the_whole_read() {
        let policy = RolePolicy {
            cant_read: Some(ReadDenials::PerResource(HashMap::from([(
                "employee".to_owned(),
                FieldSet::All,
            )]))),
            ..Default::default()
        };
        assert_eq!(policy.read_access("employee"), ReadAccess::Deny);
        assert_eq!(policy.read_access("receipt"), ReadAccess::Allow);
    }

    #[test]
    fn unknown_role_lookup_fails() {
        let table = PolicyTable::new();
        assert!(matches!(
            table.get("Ghost"),
            Err(EmpdatError::UnknownRole { .. })
        ));
    }
}
