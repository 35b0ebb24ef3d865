//! In-memory document store.

use crate::buffer::{PendingWrite, TransactionBuffer};
use crate::pipeline::execute_pipeline;
use crate::{RecordUpdate, Store, StoreError, StoreResult, Transaction};
use async_trait::async_trait;
use gnx_core::{Document, Pipeline, RecordId, Value, ID_KEY};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Collections {
    records: HashMap<String, IndexMap<RecordId, Document>>,
    /// Fields whose values must be unique, per collection.
    unique: HashMap<String, Vec<String>>,
}

impl Collections {
    fn get(&self, collection: &str, id: &RecordId) -> Option<&Document> {
        self.records.get(collection).and_then(|c| c.get(id))
    }

    fn all(&self, collection: &str) -> Vec<&Document> {
        self.records
            .get(collection)
            .map(|c| c.values().collect())
            .unwrap_or_default()
    }

    /// Reject `record` if another record holds one of its unique values.
    ///
    /// `visible` yields the other records of the collection as the writer
    /// sees them.
    fn check_unique<'a>(
        &self,
        collection: &str,
        id: &RecordId,
        record: &Document,
        visible: impl Iterator<Item = (&'a RecordId, &'a Document)>,
    ) -> StoreResult<()> {
        let Some(fields) = self.unique.get(collection) else {
            return Ok(());
        };
        let others: Vec<(&RecordId, &Document)> = visible.filter(|(other, _)| *other != id).collect();
        for field in fields {
            let Some(value) = record.get(field).filter(|v| !v.is_null()) else {
                continue;
            };
            if others.iter().any(|(_, doc)| doc.get(field) == Some(value)) {
                return Err(StoreError::duplicate_key(collection, field, value.to_string()));
            }
        }
        Ok(())
    }
}

/// A document store held in process memory.
///
/// Cloning is cheap; clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the values of `field` to be unique within `collection`.
    pub fn with_unique_index(self, collection: impl Into<String>, field: impl Into<String>) -> Self {
        self.inner
            .write()
            .unique
            .entry(collection.into())
            .or_default()
            .push(field.into());
        self
    }

    /// Committed records of `collection`, in insertion order.
    pub fn records(&self, collection: &str) -> Vec<Document> {
        self.inner.read().all(collection).into_iter().cloned().collect()
    }

    /// Number of committed records in `collection`.
    pub fn count(&self, collection: &str) -> usize {
        self.inner
            .read()
            .records
            .get(collection)
            .map_or(0, |c| c.len())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn Transaction>> {
        Ok(Box::new(MemoryTransaction {
            inner: Arc::clone(&self.inner),
            buffer: TransactionBuffer::new(),
        }))
    }

    async fn find_by_id(&self, collection: &str, id: &RecordId) -> StoreResult<Option<Document>> {
        Ok(self.inner.read().get(collection, id).cloned())
    }

    async fn execute_pipeline(
        &self,
        collection: &str,
        pipeline: &Pipeline,
    ) -> StoreResult<Vec<Document>> {
        let data = self.inner.read();
        let rows = data.all(collection).into_iter().cloned().collect();
        let result = execute_pipeline(rows, pipeline, |from| data.all(from));
        tracing::debug!(collection, %pipeline, rows = result.len(), "executed pipeline");
        Ok(result)
    }
}

/// A transaction against a `MemoryStore`.
///
/// Writes are staged in a buffer and applied under one write lock at commit.
pub struct MemoryTransaction {
    inner: Arc<RwLock<Collections>>,
    buffer: TransactionBuffer,
}

impl MemoryTransaction {
    /// The record as this transaction sees it.
    fn visible(&self, data: &Collections, collection: &str, id: &RecordId) -> Option<Document> {
        match self.buffer.get(collection, id) {
            Some(write) => staged(data, collection, id, write),
            None => data.get(collection, id).cloned(),
        }
    }

    /// Every record of `collection` as this transaction sees it.
    fn snapshot(&self, data: &Collections, collection: &str) -> Vec<(RecordId, Document)> {
        let committed = data
            .records
            .get(collection)
            .into_iter()
            .flat_map(|c| c.iter())
            .filter(|(id, _)| self.buffer.get(collection, id).is_none())
            .map(|(id, doc)| (id.clone(), doc.clone()));
        let pending = self
            .buffer
            .writes_in(collection)
            .filter_map(|(id, write)| Some((id.clone(), staged(data, collection, id, write)?)));
        committed.chain(pending).collect()
    }

    /// Reject `record` as the contents of `id` if it breaks a unique index.
    fn check_unique(
        &self,
        data: &Collections,
        collection: &str,
        id: &RecordId,
        record: &Document,
    ) -> StoreResult<()> {
        let others = self.snapshot(data, collection);
        data.check_unique(collection, id, record, others.iter().map(|(id, doc)| (id, doc)))
    }
}

/// The contents `write` leaves behind for `id`, against committed `data`.
///
/// An update of a record that no longer exists leaves nothing.
fn staged(
    data: &Collections,
    collection: &str,
    id: &RecordId,
    write: &PendingWrite,
) -> Option<Document> {
    match write {
        PendingWrite::Put(doc) => Some(doc.clone()),
        PendingWrite::Update(update) => data.get(collection, id).cloned().map(|mut doc| {
            update.apply_to(&mut doc);
            doc
        }),
        PendingWrite::Delete => None,
    }
}

#[async_trait]
impl Transaction for MemoryTransaction {
    async fn find_by_id(
        &mut self,
        collection: &str,
        id: &RecordId,
    ) -> StoreResult<Option<Document>> {
        let data = self.inner.read();
        Ok(self.visible(&data, collection, id))
    }

    async fn insert(&mut self, collection: &str, record: Document) -> StoreResult<()> {
        let id = record
            .get(ID_KEY)
            .and_then(Value::to_record_id)
            .ok_or_else(|| StoreError::MissingIdentifier {
                collection: collection.to_string(),
            })?;
        let exists = {
            let data = self.inner.read();
            self.visible(&data, collection, &id).is_some()
        };
        if exists {
            return Err(StoreError::duplicate_key(collection, ID_KEY, id.as_str()));
        }
        {
            let data = self.inner.read();
            self.check_unique(&data, collection, &id, &record)?;
        }
        self.buffer.put(collection, id, record);
        Ok(())
    }

    async fn update(
        &mut self,
        collection: &str,
        id: &RecordId,
        update: RecordUpdate,
    ) -> StoreResult<bool> {
        {
            let data = self.inner.read();
            let Some(mut record) = self.visible(&data, collection, id) else {
                return Ok(false);
            };
            update.apply_to(&mut record);
            self.check_unique(&data, collection, id, &record)?;
        }
        // Only the changed fields are staged so concurrent writers to other
        // fields of the same record are not overwritten at commit.
        self.buffer.update(collection, id.clone(), update);
        Ok(true)
    }

    async fn delete(&mut self, collection: &str, id: &RecordId) -> StoreResult<bool> {
        let exists = {
            let data = self.inner.read();
            self.visible(&data, collection, id).is_some()
        };
        if exists {
            self.buffer.delete(collection, id.clone());
        }
        Ok(exists)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let mut data = self.inner.write();

        // Re-check against writes committed since this transaction staged its own.
        for (collection, id, write) in self.buffer.writes() {
            if matches!(write, PendingWrite::Delete) {
                continue;
            }
            let record = staged(&data, collection, id, write)
                .ok_or_else(|| StoreError::missing_record(collection, id.clone()))?;
            self.check_unique(&data, collection, id, &record)?;
        }

        let writes = self.buffer.len();
        for (collection, id, write) in self.buffer.writes() {
            let records = data.records.entry(collection.to_string()).or_default();
            match write {
                PendingWrite::Put(record) => {
                    records.insert(id.clone(), record.clone());
                }
                PendingWrite::Update(update) => {
                    if let Some(record) = records.get_mut(id) {
                        update.apply_to(record);
                    }
                }
                PendingWrite::Delete => {
                    records.shift_remove(id);
                }
            }
        }
        tracing::debug!(writes, "memory transaction committed");
        Ok(())
    }

    async fn abort(self: Box<Self>) -> StoreResult<()> {
        tracing::debug!(writes = self.buffer.len(), "memory transaction aborted");
        Ok(())
    }
}
