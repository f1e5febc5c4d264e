//! Built-in role policies.
//!
//! Accounting may update payroll fields on employees (routed through
//! approval) and create timesheets/receipts outright; Reporter and
//! Viewer may not see social security numbers; Admin may do anything,
//! including approving change requests.

use std::collections::HashMap;

use empdat_core::policy::{
    FieldSet, PolicyTable, ReadDenials, ResourceSet, RolePolicy, UpdateGrants,
};

/// Capability name gating change-request approval.
pub const CAN_APPROVE: &str = "can_approve";

/// Employee fields the Accounting role may touch.
const PAYROLL_FIELDS: [&str; 7] = [
    "salary",
    "hourly_rate",
    "commission_rate",
    "bank_routing",
    "bank_account",
    "classification_id",
    "paymethod_id",
];

fn admin() -> RolePolicy {
    RolePolicy {
        can_create: Some(ResourceSet::All),
        can_update: Some(UpdateGrants::All),
        can_destroy: Some(ResourceSet::All),
        custom: HashMap::from([(CAN_APPROVE.to_owned(), ResourceSet::All)]),
        ..Default::default()
    }
}

fn accounting() -> RolePolicy {
    RolePolicy {
        can_create: Some(ResourceSet::named(["timesheet", "receipt"])),
        can_update: Some(UpdateGrants::PerResource(HashMap::from([(
            "employee".to_owned(),
            FieldSet::named(PAYROLL_FIELDS),
        )]))),
        ..Default::default()
    }
}

fn ssn_redacted() -> RolePolicy {
    RolePolicy {
        cant_read: Some(ReadDenials::PerResource(HashMap::from([(
            "employee".to_owned(),
            FieldSet::named(["social_security_number"]),
        )]))),
        ..Default::default()
    }
}

/// The static role table shipped with the application.
pub fn builtin_policies() -> PolicyTable {
    let mut table = PolicyTable::new();
    table.insert("Admin", admin());
    table.insert("Accounting", accounting());
    table.insert("Reporter", ssn_redacted());
    table.insert("Viewer", ssn_redacted());
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use empdat_core::policy::{ReadAccess, UpdateAccess};

    #[test]
    fn admin_is_blanket_privileged() {
        let table = builtin_policies();
        let admin = table.get("Admin").unwrap();
        assert!(admin.allows_create("employee"));
        assert!(admin.allows_destroy("receipt"));
        assert_eq!(admin.update_access("employee"), UpdateAccess::Direct);
        assert!(admin.allows_custom(CAN_APPROVE, "employee"));
    }

    #[test]
    fn accounting_updates_are_field_scoped() {
        let table = builtin_policies();
        let accounting = table.get("Accounting").unwrap();
        match accounting.update_access("employee") {
            UpdateAccess::Fields(fields) => {
                assert!(fields.permits("salary"));
                assert!(!fields.permits("role"));
            }
            other => panic!("expected a field allow-list, got {other:?}"),
        }
        assert_eq!(accounting.update_access("receipt"), UpdateAccess::Denied);
        assert!(accounting.allows_create("timesheet"));
        assert!(!accounting.allows_create("employee"));
    }

    #[test]
    fn viewer_cannot_see_ssn() {
        let table = builtin_policies();
        let viewer = table.get("Viewer").unwrap();
        match viewer.read_access("employee") {
            ReadAccess::Strip(fields) => {
                assert!(fields.contains("social_security_number"));
            }
            other => panic!("expected field stripping, got {other:?}"),
        }
    }
}
