//! Query error types.

use gnx_core::ErrorKind;
use gnx_registry::RegistryError;
use thiserror::Error;

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors that can occur while compiling a filter.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Unknown field: {field} on type {type_name}")]
    UnknownField { type_name: String, field: String },

    #[error("Cannot resolve path {path} from type {type_name}: {reason}")]
    UnresolvedPath {
        type_name: String,
        path: String,
        reason: String,
    },

    #[error("Invalid filter: {message}")]
    InvalidFilter { message: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl QueryError {
    pub fn unknown_field(type_name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            type_name: type_name.into(),
            field: field.into(),
        }
    }

    pub fn unresolved_path(
        type_name: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::UnresolvedPath {
            type_name: type_name.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::InvalidFilter {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryError::InvalidFilter { .. } => ErrorKind::InvalidInput,
            QueryError::Registry(e) => e.kind(),
            _ => ErrorKind::Configuration,
        }
    }
}
