//! Transaction buffer for tracking pending writes.

use crate::RecordUpdate;
use gnx_core::{Document, RecordId};
use indexmap::IndexMap;

/// A pending write to one record.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingWrite {
    /// The record's full new contents.
    Put(Document),
    /// Field changes applied to the record as committed.
    Update(RecordUpdate),
    /// The record is removed.
    Delete,
}

/// Uncommitted writes of one transaction, in write order.
#[derive(Debug, Clone, Default)]
pub struct TransactionBuffer {
    writes: IndexMap<(String, RecordId), PendingWrite>,
}

impl TransactionBuffer {
    /// Create a new empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the new contents of a record.
    pub fn put(&mut self, collection: &str, id: RecordId, record: Document) {
        self.writes
            .insert((collection.to_string(), id), PendingWrite::Put(record));
    }

    /// Record field changes to a record.
    ///
    /// Changes to a record this buffer already puts are folded into that
    /// put; otherwise they merge with any earlier staged changes.
    pub fn update(&mut self, collection: &str, id: RecordId, update: RecordUpdate) {
        match self.writes.get_mut(&(collection.to_string(), id.clone())) {
            Some(PendingWrite::Put(doc)) => update.apply_to(doc),
            Some(PendingWrite::Update(staged)) => staged.merge(update),
            _ => {
                self.writes
                    .insert((collection.to_string(), id), PendingWrite::Update(update));
            }
        }
    }

    /// Record a deletion.
    pub fn delete(&mut self, collection: &str, id: RecordId) {
        self.writes
            .insert((collection.to_string(), id), PendingWrite::Delete);
    }

    /// The buffered write for a record, if any.
    pub fn get(&self, collection: &str, id: &RecordId) -> Option<&PendingWrite> {
        self.writes.get(&(collection.to_string(), id.clone()))
    }

    /// Buffered writes to records of `collection`.
    pub fn writes_in<'a>(
        &'a self,
        collection: &'a str,
    ) -> impl Iterator<Item = (&'a RecordId, &'a PendingWrite)> + 'a {
        self.writes
            .iter()
            .filter(move |((c, _), _)| c == collection)
            .map(|((_, id), write)| (id, write))
    }

    /// All writes in the order they were made.
    pub fn writes(&self) -> impl Iterator<Item = (&str, &RecordId, &PendingWrite)> {
        self.writes
            .iter()
            .map(|((c, id), write)| (c.as_str(), id, write))
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}
