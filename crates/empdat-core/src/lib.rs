//! EmpDat Core — record snapshots, structural diffs, role policies,
//! and the middleware dispatch that guards every CRUD call.
//!
//! The storage backend and the UI are external collaborators; this
//! crate defines the contracts they plug into ([`RecordStore`],
//! [`Layer`]) and the session object that ties them together.

pub mod diff;
pub mod error;
pub mod layer;
pub mod policy;
pub mod record;
pub mod repository;
pub mod resources;
pub mod session;
pub mod validator;
pub mod value;

pub use diff::DiffEntry;
pub use error::{EmpdatError, EmpdatResult};
pub use layer::{Layer, UpdateDecision};
pub use policy::{PolicyTable, RolePolicy};
pub use record::Snapshot;
pub use repository::{Catalog, RecordStore, ResourceDef};
pub use session::{Actor, Mutation, Session};
pub use value::Value;
