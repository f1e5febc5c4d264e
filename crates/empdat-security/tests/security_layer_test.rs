//! Integration tests for the security layer, driven through sessions.

use std::collections::HashMap;
use std::sync::Arc;

use empdat_core::diff::DiffEntry;
use empdat_core::error::EmpdatError;
use empdat_core::policy::{FieldSet, PolicyTable, ReadDenials, RolePolicy};
use empdat_core::record::Snapshot;
use empdat_core::repository::{Catalog, RecordStore};
use empdat_core::resources;
use empdat_core::session::{Actor, Mutation, Session};
use empdat_core::value::Value;
use empdat_security::{builtin_policies, default_catalog, session_for, Approvals, SecurityConfig};
use empdat_store::MemoryStore;

/// Seeds employee #42 and returns the shared handles.
fn setup() -> (Arc<MemoryStore>, Arc<Catalog>, Arc<PolicyTable>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("empdat=debug")
        .with_test_writer()
        .try_init();

    let store = Arc::new(MemoryStore::new());
    let catalog = Arc::new(default_catalog());
    let policies = Arc::new(builtin_policies());

    store
        .create(
            &resources::employee(),
            Snapshot::new()
                .with("id", 42)
                .with("first_name", "John")
                .with("last_name", "Doe")
                .with("social_security_number", "123-45-6789")
                .with("role", "Viewer")
                .with("salary", 50000.0),
        )
        .unwrap();

    (store, catalog, policies)
}

fn session_as(
    role: &str,
    store: &Arc<MemoryStore>,
    catalog: &Arc<Catalog>,
    policies: &PolicyTable,
) -> Session {
    session_for(
        Actor::new(7, role),
        store.clone(),
        catalog.clone(),
        policies,
        SecurityConfig::default(),
    )
    .unwrap()
}

fn approvals(
    store: &Arc<MemoryStore>,
    catalog: &Arc<Catalog>,
    policies: &Arc<PolicyTable>,
) -> Approvals {
    Approvals::new(store.clone(), catalog.clone(), policies.clone())
}

#[test]
fn permitted_field_update_becomes_a_change_request() {
    let (store, catalog, policies) = setup();
    let session = session_as("Accounting", &store, &catalog, &policies);

    let mut proposed = store
        .read(&resources::employee(), 42)
        .unwrap()
        .unwrap();
    proposed.set("salary", 55000.0);

    let outcome = session.update("employee", proposed).unwrap();
    assert!(matches!(outcome, Mutation::PendingApproval(_)));

    // The stored row is untouched until approval.
    let row = store.read(&resources::employee(), 42).unwrap().unwrap();
    assert_eq!(row.get("salary"), Some(&50000.0.into()));

    let pending = approvals(&store, &catalog, &policies).list_pending().unwrap();
    assert_eq!(pending.len(), 1);
    let request = &pending[0];
    assert_eq!(request.author_user_id, 7);
    assert_eq!(request.table_name, "employee");
    assert_eq!(request.row_id, Some(42));
    assert_eq!(request.reason, "No reason given");
    assert!(request.approved_at.is_none());
    assert_eq!(
        request.changes,
        vec![DiffEntry::Change {
            field: "salary".into(),
            old: Value::Float(50000.0),
            new: Value::Float(55000.0),
        }]
    );
}

#[test]
fn touching_an_unpermitted_field_is_denied_with_no_request() {
    let (store, catalog, policies) = setup();
    let session = session_as("Accounting", &store, &catalog, &policies);

    let mut proposed = store
        .read(&resources::employee(), 42)
        .unwrap()
        .unwrap();
    proposed.set("salary", 55000.0);
    proposed.set("role", "Admin");

    let result = session.update("employee", proposed);
    assert!(matches!(
        result,
        Err(EmpdatError::AuthorizationDenied { .. })
    ));

    let row = store.read(&resources::employee(), 42).unwrap().unwrap();
    assert_eq!(row.get("salary"), Some(&50000.0.into()));
    assert_eq!(row.get("role"), Some(&"Viewer".into()));
    assert!(approvals(&store, &catalog, &policies)
        .list_pending()
        .unwrap()
        .is_empty());
}

#[test]
fn wildcard_role_applies_directly_without_a_request() {
    let (store, catalog, policies) = setup();
    let session = session_as("Admin", &store, &catalog, &policies);

    let mut proposed = store
        .read(&resources::employee(), 42)
        .unwrap()
        .unwrap();
    proposed.set("salary", 60000.0);
    proposed.set("role", "Reporter");

    let outcome = session.update("employee", proposed).unwrap();
    assert!(matches!(outcome, Mutation::Applied(_)));

    let row = store.read(&resources::employee(), 42).unwrap().unwrap();
    assert_eq!(row.get("salary"), Some(&60000.0.into()));
    assert!(approvals(&store, &catalog, &policies)
        .list_pending()
        .unwrap()
        .is_empty());
}

#[test]
fn update_without_any_grant_is_denied() {
    let (store, catalog, policies) = setup();
    let session = session_as("Viewer", &store, &catalog, &policies);

    let mut proposed = store
        .read(&resources::employee(), 42)
        .unwrap()
        .unwrap();
    proposed.set("city", "Springfield");
    assert!(matches!(
        session.update("employee", proposed),
        Err(EmpdatError::AuthorizationDenied { .. })
    ));
}

#[test]
fn redacted_reads_never_observe_the_ssn() {
    let (store, catalog, policies) = setup();
    let session = session_as("Viewer", &store, &catalog, &policies);

    let record = session.read("employee", 42).unwrap().unwrap();
    assert!(record.get("social_security_number").is_none());
    assert_eq!(record.get("last_name"), Some(&"Doe".into()));

    let all = session.read_all("employee").unwrap();
    assert!(all
        .iter()
        .all(|r| r.get("social_security_number").is_none()));
}

#[test]
fn resource_level_read_denial_blocks_the_whole_read() {
    let (store, catalog, _) = setup();
    let mut policies = PolicyTable::new();
    policies.insert(
        "Outsider",
        RolePolicy {
            cant_read: Some(ReadDenials::PerResource(HashMap::from([(
                "employee".to_owned(),
                FieldSet::All,
            )]))),
            ..Default::default()
        },
    );
    let session = session_as("Outsider", &store, &catalog, &policies);

    assert!(matches!(
        session.read("employee", 42),
        Err(EmpdatError::AuthorizationDenied { .. })
    ));
}

#[test]
fn create_and_destroy_follow_the_role_table() {
    let (store, catalog, policies) = setup();

    let accounting = session_as("Accounting", &store, &catalog, &policies);
    accounting
        .create(
            "timesheet",
            Snapshot::new().with("user_id", 42).with("paid", false),
        )
        .unwrap();
    assert!(matches!(
        accounting.create("employee", Snapshot::new().with("last_name", "Roe")),
        Err(EmpdatError::AuthorizationDenied { .. })
    ));
    assert!(matches!(
        accounting.destroy("employee", 42),
        Err(EmpdatError::AuthorizationDenied { .. })
    ));

    let admin = session_as("Admin", &store, &catalog, &policies);
    admin.destroy("timesheet", 1).unwrap();
}

#[test]
fn unknown_role_fails_at_login() {
    let (store, catalog, policies) = setup();
    let result = session_for(
        Actor::new(9, "Ghost"),
        store,
        catalog,
        &policies,
        SecurityConfig::default(),
    );
    assert!(matches!(result, Err(EmpdatError::UnknownRole { .. })));
}

#[test]
fn a_no_op_update_passes_through() {
    let (store, catalog, policies) = setup();
    let session = session_as("Accounting", &store, &catalog, &policies);

    let proposed = store
        .read(&resources::employee(), 42)
        .unwrap()
        .unwrap();
    let outcome = session.update("employee", proposed).unwrap();
    assert!(matches!(outcome, Mutation::Applied(_)));
    assert!(approvals(&store, &catalog, &policies)
        .list_pending()
        .unwrap()
        .is_empty());
}
