//! Session error types.

use gnx_core::ErrorKind;
use thiserror::Error;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Session errors.
///
/// Errors from the component crates pass through unchanged.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Registry(#[from] gnx_registry::RegistryError),

    #[error(transparent)]
    Shape(#[from] gnx_shape::ShapeError),

    #[error(transparent)]
    Query(#[from] gnx_query::QueryError),

    #[error(transparent)]
    Store(#[from] gnx_storage::StoreError),

    #[error(transparent)]
    Mutation(#[from] gnx_mutation::MutationError),

    /// No root operation with this name.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    /// Arguments that do not fit the operation.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("invalid configuration: {message}")]
    Config { message: String },
}

impl SessionError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Registry(e) => e.kind(),
            SessionError::Shape(e) => e.kind(),
            SessionError::Query(e) => e.kind(),
            SessionError::Store(e) => e.kind(),
            SessionError::Mutation(e) => e.kind(),
            SessionError::UnknownOperation(_) | SessionError::InvalidRequest { .. } => {
                ErrorKind::InvalidInput
            }
            SessionError::Config { .. } => ErrorKind::Configuration,
        }
    }
}
