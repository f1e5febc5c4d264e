//! EmpDat Store — in-memory [`RecordStore`] implementation.
//!
//! A SQL backend is an external collaborator; it only needs to
//! satisfy the [`RecordStore`] contract from `empdat-core`.
//!
//! [`RecordStore`]: empdat_core::repository::RecordStore

mod memory;

pub use memory::MemoryStore;
