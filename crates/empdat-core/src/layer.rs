//! Middleware layer contract.
//!
//! A layer is anything that sits between the dispatcher and the
//! store. Layers fire in registration order; create/update/destroy
//! hooks run before the store is touched, read hooks run after the
//! fetch (they can only filter what was already read).

use crate::error::EmpdatResult;
use crate::record::Snapshot;
use crate::repository::{RecordStore, ResourceDef};

/// Outcome of an update hook.
#[derive(Debug)]
pub enum UpdateDecision {
    /// Let the write proceed to the store.
    Proceed,
    /// A change request was filed instead; the store must not be
    /// touched. Carries the persisted change-request row.
    Deferred(Snapshot),
}

pub trait Layer: Send + Sync {
    /// Fired before a record is created. Raise to veto.
    fn on_create(
        &self,
        _store: &dyn RecordStore,
        _resource: &ResourceDef,
        _record: &Snapshot,
    ) -> EmpdatResult<()> {
        Ok(())
    }

    /// Fired after a record is read. May redact fields in place, or
    /// raise to refuse the read entirely.
    fn on_read_one(
        &self,
        _store: &dyn RecordStore,
        _resource: &ResourceDef,
        _record: &mut Snapshot,
    ) -> EmpdatResult<()> {
        Ok(())
    }

    /// Fired after a bulk read. The default forwards every record to
    /// [`on_read_one`](Self::on_read_one) individually, which is also
    /// how the dispatcher drives bulk reads.
    fn on_read_many(
        &self,
        store: &dyn RecordStore,
        resource: &ResourceDef,
        records: &mut Vec<Snapshot>,
    ) -> EmpdatResult<()> {
        for record in records {
            self.on_read_one(store, resource, record)?;
        }
        Ok(())
    }

    /// Fired before a record is updated. The layer is responsible for
    /// any diffing it needs; [`UpdateDecision::Deferred`] aborts the
    /// write without being an error.
    fn on_update(
        &self,
        _store: &dyn RecordStore,
        _resource: &ResourceDef,
        _proposed: &Snapshot,
    ) -> EmpdatResult<UpdateDecision> {
        Ok(UpdateDecision::Proceed)
    }

    /// Fired before a record is destroyed. Raise to veto.
    fn on_destroy(
        &self,
        _store: &dyn RecordStore,
        _resource: &ResourceDef,
        _id: i64,
    ) -> EmpdatResult<()> {
        Ok(())
    }
}
