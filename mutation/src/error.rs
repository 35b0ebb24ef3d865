//! Mutation error types.

use gnx_core::{ErrorKind, RecordId};
use gnx_registry::RegistryError;
use gnx_transaction::TransactionError;
use thiserror::Error;

/// Result type for mutation operations.
pub type MutationResult<T> = Result<T, MutationError>;

/// Errors that can occur during mutation execution.
#[derive(Debug, Error)]
pub enum MutationError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: RecordId },

    #[error("Cannot set required field to null: {field} on type {type_name}")]
    RequiredNull { type_name: String, field: String },

    #[error("Invalid payload for {type_name}: {message}")]
    InvalidPayload { type_name: String, message: String },

    #[error("Type {0} has no collection")]
    NoCollection(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

impl MutationError {
    pub fn not_found(entity: impl Into<String>, id: RecordId) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id,
        }
    }

    pub fn required_null(type_name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::RequiredNull {
            type_name: type_name.into(),
            field: field.into(),
        }
    }

    pub fn invalid_payload(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPayload {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            MutationError::NotFound { .. } => ErrorKind::NotFound,
            MutationError::RequiredNull { .. } | MutationError::InvalidPayload { .. } => {
                ErrorKind::InvalidInput
            }
            MutationError::NoCollection(_) => ErrorKind::Configuration,
            MutationError::Registry(e) => e.kind(),
            MutationError::Transaction(e) => e.kind(),
        }
    }
}
