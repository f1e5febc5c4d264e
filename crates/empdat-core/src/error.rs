//! Error types for the EmpDat system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmpdatError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: i64 },

    #[error("Unknown resource: {name}")]
    ResourceNotFound { name: String },

    #[error("Authorization denied: {reason}")]
    AuthorizationDenied { reason: String },

    #[error("Validation failed: {field} given is invalid ({message})")]
    ValidationFailed { field: String, message: String },

    #[error("No role programmed for role \"{name}\"")]
    UnknownRole { name: String },

    #[error("Change request {id} is already approved")]
    AlreadyApproved { id: i64 },

    #[error("Record for {resource} is missing its identifier field")]
    MissingIdentifier { resource: String },

    #[error("Validator error: {0}")]
    Validator(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type EmpdatResult<T> = Result<T, EmpdatError>;
