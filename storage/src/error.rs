//! Storage error types.

use gnx_core::{ErrorKind, RecordId};
use thiserror::Error;

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures reported by a storage engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("Duplicate key in {collection}: {field} = {value}")]
    DuplicateKey {
        collection: String,
        field: String,
        value: String,
    },

    #[error("Record {id} not found in {collection}")]
    MissingRecord { collection: String, id: RecordId },

    #[error("Record in {collection} has no identifier")]
    MissingIdentifier { collection: String },

    #[error("Storage engine failure: {message}")]
    Engine { message: String },
}

impl StoreError {
    pub fn duplicate_key(
        collection: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::DuplicateKey {
            collection: collection.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn missing_record(collection: impl Into<String>, id: RecordId) -> Self {
        Self::MissingRecord {
            collection: collection.into(),
            id,
        }
    }

    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine {
            message: message.into(),
        }
    }

    /// Every storage failure aborts the enclosing transaction.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Transaction
    }
}
