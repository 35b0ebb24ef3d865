//! Transaction error types.

use gnx_core::ErrorKind;
use gnx_storage::StoreError;
use thiserror::Error;

/// Transaction errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransactionError {
    /// No transaction is active.
    #[error("no transaction is active")]
    NoActiveTransaction,

    /// The storage engine rejected a write or the commit.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TransactionError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Transaction
    }
}

/// Result type for transaction operations.
pub type TransactionResult<T> = Result<T, TransactionError>;
