//! EmpDat Security — role-based policy enforcement and the
//! change-request approval lifecycle.
//!
//! The [`SecurityLayer`] sits in every session's middleware chain and
//! turns each CRUD call into allow, deny, or defer-for-approval;
//! [`Approvals`] lists, applies, and rejects the deferred requests.

pub mod change_request;
pub mod config;
pub mod error;
pub mod layer;
pub mod roles;
pub mod session;

pub use change_request::{Approvals, ChangeRequest, prettify};
pub use config::SecurityConfig;
pub use error::SecurityError;
pub use layer::SecurityLayer;
pub use roles::builtin_policies;
pub use session::{default_catalog, session_for};
