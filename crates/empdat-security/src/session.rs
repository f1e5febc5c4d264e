//! Session construction at login.

use std::sync::Arc;

use empdat_core::error::EmpdatResult;
use empdat_core::policy::PolicyTable;
use empdat_core::repository::{Catalog, RecordStore};
use empdat_core::session::{Actor, Session};
use empdat_core::resources;

use crate::change_request;
use crate::config::SecurityConfig;
use crate::layer::SecurityLayer;

/// The full application catalog: every domain table plus the
/// change-request table.
pub fn default_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog.register(resources::employee());
    catalog.register(resources::department());
    catalog.register(resources::timesheet());
    catalog.register(resources::receipt());
    catalog.register(change_request::resource_def());
    catalog
}

/// Builds the session handed to the controller layer after a
/// successful login: the actor's role is resolved against the policy
/// table (an unprogrammed role fails here, not later) and the
/// security layer is registered as the first link in the chain.
pub fn session_for(
    actor: Actor,
    store: Arc<dyn RecordStore>,
    catalog: Arc<Catalog>,
    policies: &PolicyTable,
    config: SecurityConfig,
) -> EmpdatResult<Session> {
    let layer = SecurityLayer::new(actor.clone(), policies, config)?;
    let mut session = Session::new(actor, store, catalog);
    session.register(Box::new(layer));
    Ok(session)
}
