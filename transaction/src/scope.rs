//! Transaction scope for one root mutation.

use crate::{TransactionError, TransactionResult};
use gnx_core::{Document, RecordId};
use gnx_storage::{RecordUpdate, Store, Transaction};

/// Transaction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// No transaction is active.
    Inactive,
    /// Transaction is active.
    Active,
    /// Transaction is being committed.
    Committing,
    /// Transaction is being rolled back.
    RollingBack,
}

/// An open storage transaction plus its lifecycle state.
///
/// Every read and write of one mutation tree goes through the same scope.
/// Dropping an active scope drops the storage transaction, which discards
/// its writes.
pub struct TransactionScope {
    tx: Option<Box<dyn Transaction>>,
    state: TransactionState,
    writes: usize,
}

impl TransactionScope {
    /// Begin a new transaction on `store`.
    pub async fn begin(store: &dyn Store) -> TransactionResult<Self> {
        let tx = store.begin().await?;
        Ok(Self {
            tx: Some(tx),
            state: TransactionState::Active,
            writes: 0,
        })
    }

    /// Get the current transaction state.
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Check if the transaction is active.
    pub fn is_active(&self) -> bool {
        self.state == TransactionState::Active
    }

    /// Number of writes issued so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    fn active(&mut self) -> TransactionResult<&mut (dyn Transaction + 'static)> {
        if self.state != TransactionState::Active {
            return Err(TransactionError::NoActiveTransaction);
        }
        match self.tx.as_deref_mut() {
            Some(tx) => Ok(tx),
            None => Err(TransactionError::NoActiveTransaction),
        }
    }

    // ========== Operations ==========

    /// Read a record as this transaction sees it.
    pub async fn find_by_id(
        &mut self,
        collection: &str,
        id: &RecordId,
    ) -> TransactionResult<Option<Document>> {
        Ok(self.active()?.find_by_id(collection, id).await?)
    }

    pub async fn insert(&mut self, collection: &str, record: Document) -> TransactionResult<()> {
        self.active()?.insert(collection, record).await?;
        self.writes += 1;
        Ok(())
    }

    pub async fn update(
        &mut self,
        collection: &str,
        id: &RecordId,
        update: RecordUpdate,
    ) -> TransactionResult<bool> {
        let matched = self.active()?.update(collection, id, update).await?;
        self.writes += 1;
        Ok(matched)
    }

    pub async fn delete(&mut self, collection: &str, id: &RecordId) -> TransactionResult<bool> {
        let matched = self.active()?.delete(collection, id).await?;
        self.writes += 1;
        Ok(matched)
    }

    // ========== Transaction Lifecycle ==========

    /// Commit the transaction.
    pub async fn commit(&mut self) -> TransactionResult<()> {
        if self.state != TransactionState::Active {
            return Err(TransactionError::NoActiveTransaction);
        }
        let tx = self.tx.take().ok_or(TransactionError::NoActiveTransaction)?;

        self.state = TransactionState::Committing;
        let result = tx.commit().await;
        self.state = TransactionState::Inactive;

        match &result {
            Ok(()) => tracing::debug!(writes = self.writes, "transaction committed"),
            Err(e) => tracing::debug!(error = %e, "commit failed; writes discarded"),
        }
        result.map_err(TransactionError::from)
    }

    /// Rollback the transaction.
    pub async fn rollback(&mut self) -> TransactionResult<()> {
        if self.state != TransactionState::Active {
            return Err(TransactionError::NoActiveTransaction);
        }
        let tx = self.tx.take().ok_or(TransactionError::NoActiveTransaction)?;

        self.state = TransactionState::RollingBack;
        let result = tx.abort().await;
        self.state = TransactionState::Inactive;

        tracing::debug!(writes = self.writes, "transaction rolled back");
        result.map_err(TransactionError::from)
    }

    /// Finish the transaction according to `result`: commit on success,
    /// roll back on failure.
    ///
    /// The caller gets the original error back; a rollback failure on top of
    /// it is logged, not returned.
    pub async fn complete<T, E>(mut self, result: Result<T, E>) -> Result<T, E>
    where
        E: From<TransactionError>,
    {
        match result {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(abort) = self.rollback().await {
                    tracing::warn!(error = %abort, "rollback failed");
                }
                Err(err)
            }
        }
    }
}

impl Drop for TransactionScope {
    fn drop(&mut self) {
        if self.state == TransactionState::Active {
            tracing::debug!(
                writes = self.writes,
                "transaction scope dropped before completion; discarding writes"
            );
        }
    }
}
