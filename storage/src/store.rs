//! Storage-engine traits.

use crate::StoreResult;
use async_trait::async_trait;
use gnx_core::{Document, Pipeline, RecordId};

/// Field-level changes to one stored record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordUpdate {
    /// Top-level fields to overwrite.
    pub set: Document,
    /// Top-level fields to remove.
    pub unset: Vec<String>,
}

impl RecordUpdate {
    pub fn new(set: Document, unset: Vec<String>) -> Self {
        Self { set, unset }
    }

    /// Fold `later` into this update so that applying the result equals
    /// applying `self` then `later`.
    pub fn merge(&mut self, later: RecordUpdate) {
        for (key, value) in later.set {
            self.unset.retain(|k| k != &key);
            self.set.insert(key, value);
        }
        for key in later.unset {
            self.set.shift_remove(&key);
            if !self.unset.contains(&key) {
                self.unset.push(key);
            }
        }
    }

    /// Apply this update to `record` in place.
    pub fn apply_to(&self, record: &mut Document) {
        for (key, value) in &self.set {
            record.insert(key.clone(), value.clone());
        }
        for key in &self.unset {
            record.shift_remove(key);
        }
    }
}

/// A document store.
///
/// Records are keyed by the identifier stored under `_id`.
#[async_trait]
pub trait Store: Send + Sync {
    /// Open a transaction. Its writes are invisible to every other reader
    /// until `commit` succeeds.
    async fn begin(&self) -> StoreResult<Box<dyn Transaction>>;

    /// Point lookup outside any transaction.
    async fn find_by_id(&self, collection: &str, id: &RecordId) -> StoreResult<Option<Document>>;

    /// Run `pipeline` against `collection` and collect the resulting rows.
    async fn execute_pipeline(
        &self,
        collection: &str,
        pipeline: &Pipeline,
    ) -> StoreResult<Vec<Document>>;
}

/// An open transaction.
///
/// Dropping a transaction without committing discards every write.
#[async_trait]
pub trait Transaction: Send {
    /// Point lookup that sees this transaction's own writes.
    async fn find_by_id(
        &mut self,
        collection: &str,
        id: &RecordId,
    ) -> StoreResult<Option<Document>>;

    /// Insert a new record. It must carry its identifier under `_id`.
    async fn insert(&mut self, collection: &str, record: Document) -> StoreResult<()>;

    /// Apply `update` to an existing record. Returns false when no record matched.
    async fn update(
        &mut self,
        collection: &str,
        id: &RecordId,
        update: RecordUpdate,
    ) -> StoreResult<bool>;

    /// Delete a record. Returns false when no record matched.
    async fn delete(&mut self, collection: &str, id: &RecordId) -> StoreResult<bool>;

    /// Make every write visible atomically.
    async fn commit(self: Box<Self>) -> StoreResult<()>;

    /// Discard every write.
    async fn abort(self: Box<Self>) -> StoreResult<()>;
}
