//! In-memory store implementation.
//!
//! Lock-guarded map tables, intended for tests and embedders that do
//! not bring their own backend. Identifiers auto-increment per table
//! when the caller supplies none.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use empdat_core::error::{EmpdatError, EmpdatResult};
use empdat_core::record::Snapshot;
use empdat_core::repository::{RecordStore, ResourceDef};
use empdat_core::value::Value;

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<i64, Snapshot>,
    next_id: i64,
}

/// Thread-safe in-memory [`RecordStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every table. Test helper.
    pub fn clear(&self) {
        self.tables.write().expect("store lock poisoned").clear();
    }
}

fn matches(row: &Snapshot, filters: &[(String, Value)]) -> bool {
    filters.iter().all(|(field, expected)| match row.get(field) {
        Some(actual) => actual == expected,
        // A Null filter also matches rows where the field is absent.
        None => expected.is_null(),
    })
}

impl RecordStore for MemoryStore {
    fn create(&self, resource: &ResourceDef, mut record: Snapshot) -> EmpdatResult<Snapshot> {
        let mut tables = self.tables.write().expect("store lock poisoned");
        let table = tables.entry(resource.name().to_owned()).or_default();

        let id = match record.opt_id(resource.id_field()) {
            // Caller-assigned identifier (employee ids come from HR).
            Some(id) => {
                table.next_id = table.next_id.max(id);
                id
            }
            None => {
                table.next_id += 1;
                record.set(resource.id_field().to_owned(), table.next_id);
                table.next_id
            }
        };

        table.rows.insert(id, record.clone());
        Ok(record)
    }

    fn read(&self, resource: &ResourceDef, id: i64) -> EmpdatResult<Option<Snapshot>> {
        let tables = self.tables.read().expect("store lock poisoned");
        Ok(tables
            .get(resource.name())
            .and_then(|table| table.rows.get(&id))
            .cloned())
    }

    fn read_by(
        &self,
        resource: &ResourceDef,
        filters: &[(String, Value)],
    ) -> EmpdatResult<Vec<Snapshot>> {
        let tables = self.tables.read().expect("store lock poisoned");
        Ok(tables
            .get(resource.name())
            .map(|table| {
                table
                    .rows
                    .values()
                    .filter(|row| matches(row, filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn read_all(&self, resource: &ResourceDef) -> EmpdatResult<Vec<Snapshot>> {
        self.read_by(resource, &[])
    }

    fn update(&self, resource: &ResourceDef, record: Snapshot) -> EmpdatResult<Snapshot> {
        let id = record.id(resource.id_field(), resource.name())?;
        let mut tables = self.tables.write().expect("store lock poisoned");
        let table = tables
            .get_mut(resource.name())
            .ok_or_else(|| EmpdatError::NotFound {
                entity: resource.name().to_owned(),
                id,
            })?;
        if !table.rows.contains_key(&id) {
            return Err(EmpdatError::NotFound {
                entity: resource.name().to_owned(),
                id,
            });
        }
        table.rows.insert(id, record.clone());
        Ok(record)
    }

    fn destroy(&self, resource: &ResourceDef, id: i64) -> EmpdatResult<()> {
        let mut tables = self.tables.write().expect("store lock poisoned");
        if let Some(table) = tables.get_mut(resource.name()) {
            // Deleting an absent row is silent, like a SQL DELETE.
            table.rows.remove(&id);
        }
        Ok(())
    }
}
