//! The security layer: role policy enforcement on every CRUD call.
//!
//! Registered first in a session's chain so it can veto before the
//! store is touched. Update handling is three-way: blanket privilege
//! applies directly, a field allow-list violation denies outright,
//! and an allowed field-level mutation is deferred into a change
//! request.

use tracing::{debug, info, warn};

use empdat_core::diff::{self, DiffEntry};
use empdat_core::error::{EmpdatError, EmpdatResult};
use empdat_core::layer::{Layer, UpdateDecision};
use empdat_core::policy::{PolicyTable, ReadAccess, RolePolicy, UpdateAccess};
use empdat_core::record::Snapshot;
use empdat_core::repository::{RecordStore, ResourceDef};
use empdat_core::session::Actor;

use crate::change_request::{self, ChangeRequest};
use crate::config::SecurityConfig;
use crate::error::SecurityError;

pub struct SecurityLayer {
    actor: Actor,
    policy: RolePolicy,
    config: SecurityConfig,
    cr_def: ResourceDef,
}

impl SecurityLayer {
    /// Resolves the actor's role against the policy table. Fails at
    /// construction (login time) for a role nobody programmed.
    pub fn new(actor: Actor, policies: &PolicyTable, config: SecurityConfig) -> EmpdatResult<Self> {
        let policy = policies.get(&actor.role)?.clone();
        Ok(Self {
            actor,
            policy,
            config,
            cr_def: change_request::resource_def(),
        })
    }

    fn is_exempt(&self, resource: &ResourceDef) -> bool {
        self.config
            .exempt_resources
            .iter()
            .any(|name| name == resource.name())
    }
}

impl Layer for SecurityLayer {
    fn on_create(
        &self,
        _store: &dyn RecordStore,
        resource: &ResourceDef,
        _record: &Snapshot,
    ) -> EmpdatResult<()> {
        // The evaluator files change requests through this same store;
        // checking them would recurse into a self-denial.
        if self.is_exempt(resource) {
            return Ok(());
        }
        if !self.policy.allows_create(resource.name()) {
            warn!(
                actor = self.actor.id,
                resource = resource.name(),
                "create denied"
            );
            return Err(SecurityError::CreateDenied {
                resource: resource.name().to_owned(),
            }
            .into());
        }
        Ok(())
    }

    fn on_read_one(
        &self,
        _store: &dyn RecordStore,
        resource: &ResourceDef,
        record: &mut Snapshot,
    ) -> EmpdatResult<()> {
        match self.policy.read_access(resource.name()) {
            ReadAccess::Allow => Ok(()),
            ReadAccess::Deny => Err(SecurityError::ReadDenied {
                resource: resource.name().to_owned(),
            }
            .into()),
            ReadAccess::Strip(fields) => {
                for field in fields {
                    if record.remove(field).is_some() {
                        debug!(
                            actor = self.actor.id,
                            resource = resource.name(),
                            field = %field,
                            "field redacted from read"
                        );
                    }
                }
                Ok(())
            }
        }
    }

    fn on_update(
        &self,
        store: &dyn RecordStore,
        resource: &ResourceDef,
        proposed: &Snapshot,
    ) -> EmpdatResult<UpdateDecision> {
        let fields = match self.policy.update_access(resource.name()) {
            UpdateAccess::Direct => return Ok(UpdateDecision::Proceed),
            UpdateAccess::Denied => {
                warn!(
                    actor = self.actor.id,
                    resource = resource.name(),
                    "update denied"
                );
                return Err(SecurityError::UpdateDenied {
                    resource: resource.name().to_owned(),
                }
                .into());
            }
            UpdateAccess::Fields(fields) => fields,
        };

        let row_id = proposed.id(resource.id_field(), resource.name())?;
        let stored = store
            .read(resource, row_id)?
            .ok_or_else(|| EmpdatError::NotFound {
                entity: resource.name().to_owned(),
                id: row_id,
            })?;

        let changes = diff::diff(&stored, proposed);
        // Nothing actually changed; let the no-op write through.
        if changes.is_empty() {
            return Ok(UpdateDecision::Proceed);
        }

        for entry in &changes {
            if matches!(entry, DiffEntry::Added { .. } | DiffEntry::Removed { .. }) {
                warn!(
                    actor = self.actor.id,
                    resource = resource.name(),
                    "update adds or removes fields; was this desired?"
                );
            }
        }
        for field in diff::touched_fields(&changes) {
            if !fields.permits(field) {
                warn!(
                    actor = self.actor.id,
                    resource = resource.name(),
                    field,
                    "field-level update denied"
                );
                return Err(SecurityError::FieldDenied {
                    resource: resource.name().to_owned(),
                    field: field.to_owned(),
                }
                .into());
            }
        }

        // Every touched field is permitted, but the role is not
        // blanket-privileged: defer into a change request.
        let request = ChangeRequest::new(
            self.actor.id,
            resource.name(),
            Some(row_id),
            changes,
            self.config.default_reason.clone(),
        );
        let stored_request = store.create(&self.cr_def, request.to_snapshot()?)?;
        info!(
            actor = self.actor.id,
            resource = resource.name(),
            row = row_id,
            "update deferred into a change request"
        );
        Ok(UpdateDecision::Deferred(stored_request))
    }

    fn on_destroy(
        &self,
        _store: &dyn RecordStore,
        resource: &ResourceDef,
        _id: i64,
    ) -> EmpdatResult<()> {
        if !self.policy.allows_destroy(resource.name()) {
            warn!(
                actor = self.actor.id,
                resource = resource.name(),
                "destroy denied"
            );
            return Err(SecurityError::DestroyDenied {
                resource: resource.name().to_owned(),
            }
            .into());
        }
        Ok(())
    }
}
