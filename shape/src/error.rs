//! Shape derivation and validation errors.

use gnx_core::ErrorKind;
use thiserror::Error;

/// Result type for shape operations.
pub type ShapeResult<T> = Result<T, ShapeError>;

/// Errors raised while deriving or checking input shapes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("Embedding cycle among types: {}", .0.join(", "))]
    EmbeddingCycle(Vec<String>),

    #[error("Shape name {name} derived twice with different definitions")]
    DuplicateShape { name: String },

    #[error("Unknown shape: {0}")]
    UnknownShape(String),

    #[error("Invalid input at {path}: {message}")]
    InvalidInput { path: String, message: String },
}

impl ShapeError {
    pub fn invalid(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ShapeError::InvalidInput { .. } => ErrorKind::InvalidInput,
            _ => ErrorKind::Configuration,
        }
    }
}
