//! GNX Transaction
//!
//! One transaction scope per root mutation.
//!
//! Responsibilities:
//! - Open a storage transaction and track its state
//! - Route every read and write of a mutation tree through it
//! - Commit on success, roll back on failure
//! - Discard uncommitted writes when a scope is dropped mid-flight

mod error;
mod scope;

pub use error::{TransactionError, TransactionResult};
pub use scope::{TransactionScope, TransactionState};
