//! Change requests: deferred mutations awaiting approval.
//!
//! A change request captures a field-level mutation a role was
//! diff-permitted but not blanket-privileged to apply. It stays
//! pending until an approver replays its diff onto the real store, or
//! rejects it (which deletes it without trace).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use empdat_core::diff::{self, DiffEntry};
use empdat_core::error::{EmpdatError, EmpdatResult};
use empdat_core::policy::PolicyTable;
use empdat_core::record::Snapshot;
use empdat_core::repository::{Catalog, RecordStore, ResourceDef};
use empdat_core::session::Actor;
use empdat_core::value::Value;

use crate::error::SecurityError;
use crate::roles::CAN_APPROVE;

/// Stable name of the change-request table.
pub const RESOURCE: &str = "change_request";

/// Definition of the `change_request` table.
pub fn resource_def() -> ResourceDef {
    ResourceDef::new(RESOURCE)
        .with_label("id", "ID")
        .with_label("author_user_id", "Author")
        .with_label("table_name", "Table")
        .with_label("row_id", "ID affected")
        .with_label("changes", "Changes")
        .with_label("reason", "Reason")
        .with_label("created_at", "Created")
        .with_label("approved_at", "Approved")
        .with_label("approved_by_user_id", "Approved By")
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRequest {
    /// Store-assigned identifier; `None` until persisted.
    pub id: Option<i64>,
    pub author_user_id: i64,
    pub table_name: String,
    /// `None` marks a brand-new record not yet persisted.
    pub row_id: Option<i64>,
    pub changes: Vec<DiffEntry>,
    pub reason: String,
    pub created_at: DateTime<Utc>,
    /// `None` while pending. Never cleared once set.
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by_user_id: Option<i64>,
}

impl ChangeRequest {
    pub fn new(
        author_user_id: i64,
        table_name: impl Into<String>,
        row_id: Option<i64>,
        changes: Vec<DiffEntry>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            author_user_id,
            table_name: table_name.into(),
            row_id,
            changes,
            reason: reason.into(),
            created_at: Utc::now(),
            approved_at: None,
            approved_by_user_id: None,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.approved_at.is_some()
    }

    /// Flattens the request for storage. The diff is serialized to
    /// JSON text; temporal values inside it take their tagged
    /// canonical form.
    pub fn to_snapshot(&self) -> EmpdatResult<Snapshot> {
        let changes = serde_json::to_string(&self.changes)
            .map_err(|e| EmpdatError::Serialization(e.to_string()))?;
        let mut snap = Snapshot::new();
        if let Some(id) = self.id {
            snap.set("id", id);
        }
        Ok(snap
            .with("author_user_id", self.author_user_id)
            .with("table_name", self.table_name.as_str())
            .with("row_id", self.row_id)
            .with("changes", changes)
            .with("reason", self.reason.as_str())
            .with("created_at", self.created_at)
            .with("approved_at", self.approved_at)
            .with("approved_by_user_id", self.approved_by_user_id))
    }

    /// Rebuilds a request from its stored row.
    pub fn from_snapshot(snap: &Snapshot) -> EmpdatResult<Self> {
        let text = |field: &str| -> EmpdatResult<String> {
            match snap.get(field) {
                Some(Value::Text(s)) => Ok(s.clone()),
                other => Err(EmpdatError::Serialization(format!(
                    "change request field {field} is {other:?}, expected text"
                ))),
            }
        };
        let datetime = |field: &str| -> EmpdatResult<Option<DateTime<Utc>>> {
            match snap.get(field) {
                Some(Value::DateTime(t)) => Ok(Some(*t)),
                Some(Value::Null) | None => Ok(None),
                other => Err(EmpdatError::Serialization(format!(
                    "change request field {field} is {other:?}, expected a datetime"
                ))),
            }
        };

        let changes: Vec<DiffEntry> = serde_json::from_str(&text("changes")?)
            .map_err(|e| EmpdatError::Serialization(e.to_string()))?;

        Ok(Self {
            id: snap.opt_id("id"),
            author_user_id: snap.id("author_user_id", RESOURCE)?,
            table_name: text("table_name")?,
            row_id: snap.opt_id("row_id"),
            changes,
            reason: text("reason")?,
            created_at: datetime("created_at")?.ok_or_else(|| {
                EmpdatError::Serialization("change request is missing created_at".to_owned())
            })?,
            approved_at: datetime("approved_at")?,
            approved_by_user_id: snap.opt_id("approved_by_user_id"),
        })
    }
}

/// Renders a diff for human eyes, resolving field names to display
/// labels when the resource is known. Display only, never replayed.
pub fn prettify(changes: &[DiffEntry], resource: Option<&ResourceDef>) -> String {
    let label = |field: &str| -> String {
        resource.map_or_else(|| field.to_owned(), |def| def.label(field).to_owned())
    };
    let mut lines = Vec::new();
    for entry in changes {
        match entry {
            DiffEntry::Change { field, old, new } => {
                lines.push(format!("{}: {} -> {}", label(field), old, new));
            }
            DiffEntry::Added { pairs } => {
                for (field, value) in pairs {
                    lines.push(format!("{}: set to {}", label(field), value));
                }
            }
            DiffEntry::Removed { pairs } => {
                for (field, _) in pairs {
                    lines.push(format!("{}: cleared", label(field)));
                }
            }
        }
    }
    lines.join("\n")
}

/// The change-request lifecycle: list, approve, reject.
///
/// Holds raw store and catalog handles; approval is itself the
/// authorization, so applying a request bypasses the security layer's
/// field gating.
pub struct Approvals {
    store: Arc<dyn RecordStore>,
    catalog: Arc<Catalog>,
    policies: Arc<PolicyTable>,
}

impl Approvals {
    pub fn new(
        store: Arc<dyn RecordStore>,
        catalog: Arc<Catalog>,
        policies: Arc<PolicyTable>,
    ) -> Self {
        Self {
            store,
            catalog,
            policies,
        }
    }

    /// Every request not yet approved.
    pub fn list_pending(&self) -> EmpdatResult<Vec<ChangeRequest>> {
        let def = self.catalog.get(RESOURCE)?;
        let rows = self
            .store
            .read_by(def, &[("approved_at".to_owned(), Value::Null)])?;
        rows.iter().map(ChangeRequest::from_snapshot).collect()
    }

    /// Replays a pending request onto the real store and stamps it
    /// approved.
    ///
    /// An unknown target table fails with `ResourceNotFound` and
    /// leaves the request pending. A second apply on an approved
    /// request fails with `AlreadyApproved` and replays nothing.
    pub fn apply(&self, request_id: i64, approver: &Actor) -> EmpdatResult<ChangeRequest> {
        let def = self.catalog.get(RESOURCE)?;
        let row = self
            .store
            .read(def, request_id)?
            .ok_or_else(|| EmpdatError::NotFound {
                entity: RESOURCE.to_owned(),
                id: request_id,
            })?;
        let mut request = ChangeRequest::from_snapshot(&row)?;

        let policy = self.policies.get(&approver.role)?;
        if !policy.allows_custom(CAN_APPROVE, &request.table_name) {
            return Err(SecurityError::ApproveDenied {
                resource: request.table_name.clone(),
            }
            .into());
        }

        if request.is_approved() {
            return Err(EmpdatError::AlreadyApproved { id: request_id });
        }

        let target = self.catalog.get(&request.table_name)?;
        match request.row_id {
            Some(row_id) => {
                let mut record =
                    self.store
                        .read(target, row_id)?
                        .ok_or_else(|| EmpdatError::NotFound {
                            entity: target.name().to_owned(),
                            id: row_id,
                        })?;
                diff::apply_changes(&mut record, &request.changes);
                self.store.update(target, record)?;
            }
            None => {
                let record = diff::build_record(&request.changes);
                self.store.create(target, record)?;
            }
        }

        request.approved_at = Some(Utc::now());
        request.approved_by_user_id = Some(approver.id);
        self.store.update(def, request.to_snapshot()?)?;

        info!(
            request = request_id,
            table = %request.table_name,
            approver = approver.id,
            "change request approved and applied"
        );
        Ok(request)
    }

    /// Deletes a request. Rejection keeps no trace.
    pub fn reject(&self, request_id: i64) -> EmpdatResult<()> {
        let def = self.catalog.get(RESOURCE)?;
        self.store.destroy(def, request_id)?;
        info!(request = request_id, "change request rejected");
        Ok(())
    }

    /// Files a change request for a record that does not exist yet
    /// (`row_id` stays null; the diff is taken against the empty
    /// snapshot). Approval will create the record.
    pub fn request_create(
        &self,
        author: &Actor,
        resource: &str,
        proposed: Snapshot,
        reason: Option<String>,
    ) -> EmpdatResult<ChangeRequest> {
        let target = self.catalog.get(resource)?;
        let changes = diff::diff(&Snapshot::new(), &proposed);
        let request = ChangeRequest::new(
            author.id,
            target.name(),
            None,
            changes,
            reason.unwrap_or_else(|| "No reason given".to_owned()),
        );

        let def = self.catalog.get(RESOURCE)?;
        let stored = self.store.create(def, request.to_snapshot()?)?;
        info!(
            table = target.name(),
            author = author.id,
            "new-record change request filed"
        );
        ChangeRequest::from_snapshot(&stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_round_trip_preserves_the_diff() {
        let changes = vec![DiffEntry::Change {
            field: "salary".into(),
            old: Value::Float(50000.0),
            new: Value::Float(55000.0),
        }];
        let request = ChangeRequest::new(7, "employee", Some(42), changes, "raise");
        let snap = request.to_snapshot().unwrap();
        let back = ChangeRequest::from_snapshot(&snap).unwrap();
        assert_eq!(back.changes, request.changes);
        assert_eq!(back.row_id, Some(42));
        assert!(!back.is_approved());
    }

    #[test]
    fn prettify_resolves_labels() {
        let changes = vec![
            DiffEntry::Change {
                field: "salary".into(),
                old: Value::Float(50000.0),
                new: Value::Float(55000.0),
            },
            DiffEntry::Added {
                pairs: vec![("hourly_rate".into(), Value::Float(10.0))],
            },
        ];
        let def = empdat_core::resources::employee();
        let pretty = prettify(&changes, Some(&def));
        assert_eq!(pretty, "Salary: 50000 -> 55000\nHourly Rate: set to 10");
    }
}
