//! Mutation result types.

use gnx_core::{Document, RecordId};

/// Outcome of a root mutation. Carries the root record as stored.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// Created a record.
    Created { id: RecordId, record: Document },
    /// Updated a record; `record` is its state after the update.
    Updated { id: RecordId, record: Document },
    /// Deleted a record; `record` is its state before the delete.
    Deleted { id: RecordId, record: Document },
}

impl MutationOutcome {
    /// Identifier of the root record.
    pub fn id(&self) -> &RecordId {
        match self {
            MutationOutcome::Created { id, .. }
            | MutationOutcome::Updated { id, .. }
            | MutationOutcome::Deleted { id, .. } => id,
        }
    }

    /// The root record.
    pub fn record(&self) -> &Document {
        match self {
            MutationOutcome::Created { record, .. }
            | MutationOutcome::Updated { record, .. }
            | MutationOutcome::Deleted { record, .. } => record,
        }
    }

    pub fn into_record(self) -> Document {
        match self {
            MutationOutcome::Created { record, .. }
            | MutationOutcome::Updated { record, .. }
            | MutationOutcome::Deleted { record, .. } => record,
        }
    }

    /// Get created record ID if this is a Created result.
    pub fn created(&self) -> Option<&RecordId> {
        match self {
            MutationOutcome::Created { id, .. } => Some(id),
            _ => None,
        }
    }
}
