//! Mutation executor - drives create/update/delete over a payload tree.
//!
//! Each root mutation opens one `TransactionScope`. Referenced-list buckets
//! recurse inside that same scope, so a failure at any depth rolls back the
//! whole tree. Within one tree the order is fixed: root read (update only),
//! root write, then per referenced-list field `added`, `updated`, `deleted`.

use crate::materialize::{materialize, merge_embedded, strip_nulls, CollectionOps};
use crate::{MutationError, MutationOutcome, MutationResult};
use futures_util::future::{BoxFuture, FutureExt};
use gnx_core::{Document, RecordId, Value, ID_KEY};
use gnx_registry::{Cardinality, EntityType, FieldDef, FieldKind, Registry};
use gnx_storage::{RecordUpdate, Store};
use gnx_transaction::TransactionScope;
use indexmap::IndexMap;
use tracing::debug;

/// Back-reference written into every child of a referenced list.
#[derive(Debug, Clone)]
struct ParentLink {
    connection_field: String,
    owner: RecordId,
}

impl ParentLink {
    fn apply(&self, record: &mut Document) {
        record.insert(self.connection_field.clone(), Value::Id(self.owner.clone()));
    }
}

/// Mutation executor.
pub struct MutationExecutor<'r, 's> {
    registry: &'r Registry,
    store: &'s dyn Store,
}

impl<'r, 's> MutationExecutor<'r, 's> {
    /// Create a new executor.
    pub fn new(registry: &'r Registry, store: &'s dyn Store) -> Self {
        Self { registry, store }
    }

    /// Create a record of `entity` plus every child in its `added` buckets.
    ///
    /// A payload without an identifier gets a generated one.
    pub async fn create(&self, entity: &str, payload: &Document) -> MutationResult<MutationOutcome> {
        let entity = self.registry.resolve(entity)?;
        let mut scope = TransactionScope::begin(self.store).await?;
        let result = self.create_root(&mut scope, entity, payload).await;
        scope.complete(result).await
    }

    /// Update the record named by the payload's identifier.
    pub async fn update(&self, entity: &str, payload: &Document) -> MutationResult<MutationOutcome> {
        let entity = self.registry.resolve(entity)?;
        let mut scope = TransactionScope::begin(self.store).await?;
        let result = self.update_root(&mut scope, entity, payload).await;
        scope.complete(result).await
    }

    /// Delete one record. Children in referenced lists are left in place.
    pub async fn delete(&self, entity: &str, id: &RecordId) -> MutationResult<MutationOutcome> {
        let entity = self.registry.resolve(entity)?;
        let mut scope = TransactionScope::begin(self.store).await?;
        let result = self
            .delete_in(&mut scope, entity, id)
            .await
            .map(|record| MutationOutcome::Deleted {
                id: id.clone(),
                record,
            });
        scope.complete(result).await
    }

    async fn create_root(
        &self,
        scope: &mut TransactionScope,
        entity: &EntityType,
        payload: &Document,
    ) -> MutationResult<MutationOutcome> {
        let id = self.create_in(scope, entity, payload, None).await?;
        let record = read_back(scope, entity, &id).await?;
        Ok(MutationOutcome::Created { id, record })
    }

    async fn update_root(
        &self,
        scope: &mut TransactionScope,
        entity: &EntityType,
        payload: &Document,
    ) -> MutationResult<MutationOutcome> {
        let id = self.update_in(scope, entity, payload, None).await?;
        let record = read_back(scope, entity, &id).await?;
        Ok(MutationOutcome::Updated { id, record })
    }

    // ========== Recursive operations ==========

    fn create_in<'a>(
        &'a self,
        scope: &'a mut TransactionScope,
        entity: &'a EntityType,
        payload: &'a Document,
        parent: Option<&'a ParentLink>,
    ) -> BoxFuture<'a, MutationResult<RecordId>> {
        async move {
            let collection = collection_of(entity)?;
            let materialized = materialize(self.registry, entity, payload)?;
            let id = materialized.id().unwrap_or_else(RecordId::generate);

            let mut record = Document::new();
            record.insert(ID_KEY.to_string(), Value::Id(id.clone()));
            for (key, value) in materialized.fields {
                if key != ID_KEY {
                    record.insert(key, strip_nulls(value));
                }
            }
            if let Some(link) = parent {
                link.apply(&mut record);
            }

            debug!(entity = %entity.name, %id, "create");
            scope.insert(collection, record).await?;

            self.apply_collections(scope, entity, &id, &materialized.collections)
                .await?;
            Ok::<_, MutationError>(id)
        }
        .boxed()
    }

    fn update_in<'a>(
        &'a self,
        scope: &'a mut TransactionScope,
        entity: &'a EntityType,
        payload: &'a Document,
        parent: Option<&'a ParentLink>,
    ) -> BoxFuture<'a, MutationResult<RecordId>> {
        async move {
            let collection = collection_of(entity)?;
            let materialized = materialize(self.registry, entity, payload)?;
            let id = materialized.id().ok_or_else(|| {
                MutationError::invalid_payload(&entity.name, "update requires the identifier")
            })?;

            let current = scope
                .find_by_id(collection, &id)
                .await?
                .ok_or_else(|| MutationError::not_found(&entity.name, id.clone()))?;

            let mut set = Document::new();
            for (key, value) in materialized.fields {
                if key == ID_KEY {
                    continue;
                }
                let value = if entity.get_field(&key).is_some_and(FieldDef::is_embedded) {
                    merge_embedded(current.get(&key), value)
                } else {
                    value
                };
                set.insert(key, value);
            }
            if let Some(link) = parent {
                link.apply(&mut set);
            }

            debug!(
                entity = %entity.name,
                %id,
                set = set.len(),
                unset = ?materialized.unset,
                "update"
            );
            let update = RecordUpdate::new(set, materialized.unset);
            if !scope.update(collection, &id, update).await? {
                return Err(MutationError::not_found(&entity.name, id));
            }

            self.apply_collections(scope, entity, &id, &materialized.collections)
                .await?;
            Ok::<_, MutationError>(id)
        }
        .boxed()
    }

    async fn delete_in(
        &self,
        scope: &mut TransactionScope,
        entity: &EntityType,
        id: &RecordId,
    ) -> MutationResult<Document> {
        let collection = collection_of(entity)?;
        let record = scope
            .find_by_id(collection, id)
            .await?
            .ok_or_else(|| MutationError::not_found(&entity.name, id.clone()))?;

        debug!(entity = %entity.name, %id, "delete");
        scope.delete(collection, id).await?;
        Ok(record)
    }

    /// Run the bucket operations of every referenced-list field of `owner`.
    async fn apply_collections(
        &self,
        scope: &mut TransactionScope,
        owner: &EntityType,
        owner_id: &RecordId,
        collections: &IndexMap<String, CollectionOps>,
    ) -> MutationResult<()> {
        for (field, ops) in collections {
            let (target, connection_field) = match owner.get_field(field).map(|f| &f.kind) {
                Some(FieldKind::Referenced {
                    target,
                    cardinality: Cardinality::Many,
                    connection_field,
                }) => (target, connection_field),
                _ => {
                    return Err(MutationError::invalid_payload(
                        &owner.name,
                        format!("{} is not a referenced list", field),
                    ))
                }
            };
            let target = self.registry.resolve(target)?;
            let link = ParentLink {
                connection_field: connection_field.clone(),
                owner: owner_id.clone(),
            };

            for item in &ops.added {
                self.create_in(scope, target, item, Some(&link)).await?;
            }
            for item in &ops.updated {
                self.update_in(scope, target, item, Some(&link)).await?;
            }
            for item in &ops.deleted {
                let id = identifier_of(target, item)?;
                self.delete_in(scope, target, &id).await?;
            }
        }
        Ok(())
    }
}

async fn read_back(
    scope: &mut TransactionScope,
    entity: &EntityType,
    id: &RecordId,
) -> MutationResult<Document> {
    scope
        .find_by_id(collection_of(entity)?, id)
        .await?
        .ok_or_else(|| MutationError::not_found(&entity.name, id.clone()))
}

fn collection_of(entity: &EntityType) -> MutationResult<&str> {
    entity
        .collection()
        .ok_or_else(|| MutationError::NoCollection(entity.name.clone()))
}

/// The identifier a payload names, read through the identifier field.
fn identifier_of(entity: &EntityType, payload: &Document) -> MutationResult<RecordId> {
    entity
        .identifier_field()
        .and_then(|field| payload.get(&field.name))
        .and_then(Value::to_record_id)
        .ok_or_else(|| MutationError::invalid_payload(&entity.name, "missing identifier"))
}
