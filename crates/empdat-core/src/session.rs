//! Per-session CRUD dispatch.
//!
//! A [`Session`] binds an authenticated actor to a store, a resource
//! catalog, and an explicit ordered layer chain, and wraps every CRUD
//! entry point with the layer hooks. There is no process-global
//! registry; each session carries its own chain.

use std::sync::Arc;

use tracing::debug;

use crate::error::EmpdatResult;
use crate::layer::{Layer, UpdateDecision};
use crate::record::Snapshot;
use crate::repository::{Catalog, RecordStore};
use crate::value::Value;

/// An authenticated identity, resolved once at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub role: String,
}

impl Actor {
    pub fn new(id: i64, role: impl Into<String>) -> Self {
        Self {
            id,
            role: role.into(),
        }
    }
}

/// Outcome of a guarded mutation.
#[derive(Debug)]
pub enum Mutation {
    /// The store was updated; carries the stored snapshot.
    Applied(Snapshot),
    /// The mutation was deferred into a change request awaiting
    /// approval; carries the persisted request row. The target row is
    /// untouched.
    PendingApproval(Snapshot),
}

pub struct Session {
    actor: Actor,
    store: Arc<dyn RecordStore>,
    catalog: Arc<Catalog>,
    layers: Vec<Box<dyn Layer>>,
}

impl Session {
    pub fn new(actor: Actor, store: Arc<dyn RecordStore>, catalog: Arc<Catalog>) -> Self {
        Self {
            actor,
            store,
            catalog,
            layers: Vec::new(),
        }
    }

    /// Appends a layer to the chain. Layers fire in registration
    /// order and are never unregistered.
    pub fn register(&mut self, layer: Box<dyn Layer>) {
        self.layers.push(layer);
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The raw, unguarded store. Bypasses every layer.
    pub fn store(&self) -> &dyn RecordStore {
        &*self.store
    }

    /// Creates a record. Every layer's create hook must pass before
    /// the store is touched.
    pub fn create(&self, resource: &str, record: Snapshot) -> EmpdatResult<Snapshot> {
        let def = self.catalog.get(resource)?;
        for layer in &self.layers {
            layer.on_create(&*self.store, def, &record)?;
        }
        debug!(actor = self.actor.id, resource = def.name(), "create");
        self.store.create(def, record)
    }

    /// Reads one record, running each layer's read hook on it.
    pub fn read(&self, resource: &str, id: i64) -> EmpdatResult<Option<Snapshot>> {
        let def = self.catalog.get(resource)?;
        let Some(mut record) = self.store.read(def, id)? else {
            return Ok(None);
        };
        for layer in &self.layers {
            layer.on_read_one(&*self.store, def, &mut record)?;
        }
        Ok(Some(record))
    }

    /// Filtered bulk read. Every fetched record passes through every
    /// layer's read hook individually.
    pub fn read_by(
        &self,
        resource: &str,
        filters: &[(String, Value)],
    ) -> EmpdatResult<Vec<Snapshot>> {
        let def = self.catalog.get(resource)?;
        let mut records = self.store.read_by(def, filters)?;
        self.fire_read_hooks(resource, &mut records)?;
        Ok(records)
    }

    /// Reads every record of a resource through the layer chain.
    pub fn read_all(&self, resource: &str) -> EmpdatResult<Vec<Snapshot>> {
        let def = self.catalog.get(resource)?;
        let mut records = self.store.read_all(def)?;
        self.fire_read_hooks(resource, &mut records)?;
        Ok(records)
    }

    /// Updates a record. The first layer to defer short-circuits the
    /// chain and the store is left untouched.
    pub fn update(&self, resource: &str, proposed: Snapshot) -> EmpdatResult<Mutation> {
        let def = self.catalog.get(resource)?;
        for layer in &self.layers {
            match layer.on_update(&*self.store, def, &proposed)? {
                UpdateDecision::Proceed => {}
                UpdateDecision::Deferred(request) => {
                    debug!(
                        actor = self.actor.id,
                        resource = def.name(),
                        "update deferred into a change request"
                    );
                    return Ok(Mutation::PendingApproval(request));
                }
            }
        }
        debug!(actor = self.actor.id, resource = def.name(), "update");
        Ok(Mutation::Applied(self.store.update(def, proposed)?))
    }

    /// Destroys a record. Every layer's destroy hook must pass first.
    pub fn destroy(&self, resource: &str, id: i64) -> EmpdatResult<()> {
        let def = self.catalog.get(resource)?;
        for layer in &self.layers {
            layer.on_destroy(&*self.store, def, id)?;
        }
        debug!(actor = self.actor.id, resource = def.name(), id, "destroy");
        self.store.destroy(def, id)
    }

    fn fire_read_hooks(&self, resource: &str, records: &mut [Snapshot]) -> EmpdatResult<()> {
        let def = self.catalog.get(resource)?;
        for record in records {
            for layer in &self.layers {
                layer.on_read_one(&*self.store, def, record)?;
            }
        }
        Ok(())
    }
}
