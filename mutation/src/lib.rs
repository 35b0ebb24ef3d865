//! GNX Mutation
//!
//! Execute create/update/delete requests against the storage engine.
//!
//! Responsibilities:
//! - Materialize request payloads into storage records
//! - Collect referenced-list bucket operations (`added`/`updated`/`deleted`)
//! - Merge embedded values on update and turn explicit nulls into removals
//! - Run a root mutation and every child operation in one transaction
//!
//! # Module Structure
//!
//! - `executor` - `MutationExecutor`, the recursive create/update/delete driver
//! - `materialize` - payload to record conversion
//! - `error` - Error types for mutation failures
//! - `result` - Result types for mutation outcomes

mod error;
mod executor;
#[cfg(test)]
mod fixtures;
mod materialize;
mod result;

pub use error::{MutationError, MutationResult};
pub use executor::MutationExecutor;
pub use materialize::{materialize, merge_embedded, CollectionOps, MaterializedRecord};
pub use result::MutationOutcome;
