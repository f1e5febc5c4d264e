//! Security error types.

use empdat_core::error::EmpdatError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecurityError {
    #[error("Creating {resource} records is not allowed")]
    CreateDenied { resource: String },

    #[error("Cannot read this {resource}! Insufficient permission.")]
    ReadDenied { resource: String },

    #[error("Updating {resource} records is not allowed")]
    UpdateDenied { resource: String },

    #[error("Updating the {field} field in {resource} records is not allowed")]
    FieldDenied { resource: String, field: String },

    #[error("Destroying {resource} records is not allowed")]
    DestroyDenied { resource: String },

    #[error("Approving changes to {resource} records is not allowed")]
    ApproveDenied { resource: String },
}

impl From<SecurityError> for EmpdatError {
    fn from(err: SecurityError) -> Self {
        EmpdatError::AuthorizationDenied {
            reason: err.to_string(),
        }
    }
}
