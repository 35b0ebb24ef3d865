//! Payload materialization.
//!
//! A request payload is keyed by schema field names. The stored record is
//! keyed by storage keys: the identifier field becomes `_id`, a single
//! referenced value becomes the owner's connection field holding the
//! target's identifier, and referenced lists leave the record entirely and
//! become bucket operations on the target collection.

use crate::{MutationError, MutationResult};
use gnx_core::{Document, RecordId, Value};
use gnx_registry::{Cardinality, EntityType, FieldDef, FieldKind, Registry, ScalarKind};
use indexmap::IndexMap;

/// Child operations for one referenced-list field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionOps {
    pub added: Vec<Document>,
    pub updated: Vec<Document>,
    pub deleted: Vec<Document>,
}

/// The storage form of one payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterializedRecord {
    /// Scalar, reference and embedded values keyed by storage key.
    pub fields: Document,
    /// Storage keys of nullable fields the payload explicitly set to null.
    pub unset: Vec<String>,
    /// Bucket operations per referenced-list field, in declaration order.
    pub collections: IndexMap<String, CollectionOps>,
}

impl MaterializedRecord {
    /// The identifier carried by the payload, if any.
    pub fn id(&self) -> Option<RecordId> {
        self.fields.get(gnx_core::ID_KEY).and_then(Value::to_record_id)
    }
}

/// Materialize `payload` as a record of `entity`.
///
/// Keys that are not fields of `entity` are rejected. Explicit null on a
/// mandatory field is `RequiredNull`.
pub fn materialize(
    registry: &Registry,
    entity: &EntityType,
    payload: &Document,
) -> MutationResult<MaterializedRecord> {
    reject_unknown(entity, payload)?;

    let mut out = MaterializedRecord::default();
    for field in entity.fields() {
        let Some(value) = payload.get(&field.name) else {
            continue;
        };

        if value.is_null() {
            match &field.kind {
                _ if !field.nullable => {
                    return Err(MutationError::required_null(&entity.name, &field.name))
                }
                FieldKind::Referenced {
                    cardinality: Cardinality::Many,
                    ..
                } => {}
                FieldKind::Referenced {
                    connection_field, ..
                } => out.unset.push(connection_field.clone()),
                _ => out.unset.push(entity.storage_key(&field.name).to_string()),
            }
            continue;
        }

        match &field.kind {
            FieldKind::Scalar(kind) => {
                out.fields.insert(
                    entity.storage_key(&field.name).to_string(),
                    coerce(*kind, value),
                );
            }
            FieldKind::Referenced {
                cardinality: Cardinality::One,
                connection_field,
                ..
            } => {
                let id = reference_id(entity, field, value)?;
                out.fields.insert(connection_field.clone(), Value::Id(id));
            }
            FieldKind::Referenced {
                cardinality: Cardinality::Many,
                ..
            } => {
                let ops = collection_ops(entity, field, value)?;
                out.collections.insert(field.name.clone(), ops);
            }
            FieldKind::Embedded {
                target,
                cardinality,
            } => {
                let target = registry.resolve(target)?;
                let embedded = embedded_value(registry, entity, field, target, *cardinality, value)?;
                out.fields.insert(field.name.clone(), embedded);
            }
        }
    }
    Ok(out)
}

/// Merge an embedded value from an update into the stored one.
///
/// Objects merge key by key: new values win, absent keys keep their stored
/// value, and a null removes the key. Lists and scalars are replaced.
pub fn merge_embedded(stored: Option<&Value>, new: Value) -> Value {
    match (stored, new) {
        (Some(Value::Object(old)), Value::Object(new)) => {
            let mut merged = old.clone();
            for (key, value) in new {
                match value {
                    Value::Null => {
                        merged.shift_remove(&key);
                    }
                    value => {
                        let next = merge_embedded(merged.get(&key), value);
                        merged.insert(key, next);
                    }
                }
            }
            Value::Object(merged)
        }
        (_, new) => strip_nulls(new),
    }
}

/// Remove null entries from objects, recursively.
pub(crate) fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(doc) => Value::Object(
            doc.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        Value::List(items) => Value::List(items.into_iter().map(strip_nulls).collect()),
        other => other,
    }
}

fn reject_unknown(entity: &EntityType, payload: &Document) -> MutationResult<()> {
    match payload.keys().find(|key| entity.get_field(key).is_none()) {
        Some(key) => Err(MutationError::invalid_payload(
            &entity.name,
            format!("unknown field {}", key),
        )),
        None => Ok(()),
    }
}

fn coerce(kind: ScalarKind, value: &Value) -> Value {
    match (kind, value) {
        (ScalarKind::Id, Value::String(s)) => Value::Id(RecordId::new(s.clone())),
        (ScalarKind::Float, Value::Int(n)) => Value::Float(*n as f64),
        _ => value.clone(),
    }
}

/// `{id: ...}` of a single reference.
fn reference_id(entity: &EntityType, field: &FieldDef, value: &Value) -> MutationResult<RecordId> {
    value
        .as_object()
        .and_then(|obj| obj.get("id"))
        .and_then(Value::to_record_id)
        .ok_or_else(|| {
            MutationError::invalid_payload(
                &entity.name,
                format!("{} must be an object carrying an id", field.name),
            )
        })
}

fn collection_ops(
    entity: &EntityType,
    field: &FieldDef,
    value: &Value,
) -> MutationResult<CollectionOps> {
    let invalid = |what: &str| {
        MutationError::invalid_payload(&entity.name, format!("{}: {}", field.name, what))
    };
    let buckets = value
        .as_object()
        .ok_or_else(|| invalid("expected an object of added/updated/deleted lists"))?;

    let mut ops = CollectionOps::default();
    for (bucket, items) in buckets {
        let target = match bucket.as_str() {
            "added" => &mut ops.added,
            "updated" => &mut ops.updated,
            "deleted" => &mut ops.deleted,
            other => return Err(invalid(&format!("unknown bucket {}", other))),
        };
        match items {
            Value::Null => {}
            Value::List(items) => {
                for item in items {
                    let item = item
                        .as_object()
                        .ok_or_else(|| invalid(&format!("{} entries must be objects", bucket)))?;
                    target.push(item.clone());
                }
            }
            _ => return Err(invalid(&format!("{} must be a list", bucket))),
        }
    }
    Ok(ops)
}

fn embedded_value(
    registry: &Registry,
    owner: &EntityType,
    field: &FieldDef,
    target: &EntityType,
    cardinality: Cardinality,
    value: &Value,
) -> MutationResult<Value> {
    let invalid = |what: &str| {
        MutationError::invalid_payload(&owner.name, format!("{}: {}", field.name, what))
    };
    match (cardinality, value) {
        (Cardinality::One, Value::Object(obj)) => {
            Ok(Value::Object(embedded_document(registry, target, obj)?))
        }
        (Cardinality::Many, Value::List(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Null => {}
                    Value::Object(obj) => {
                        out.push(Value::Object(embedded_document(registry, target, obj)?))
                    }
                    _ => return Err(invalid("list entries must be objects")),
                }
            }
            Ok(Value::List(out))
        }
        (Cardinality::One, _) => Err(invalid("expected an object")),
        (Cardinality::Many, _) => Err(invalid("expected a list")),
    }
}

/// An embedded value keeps explicit nulls so an update can remove the key.
fn embedded_document(
    registry: &Registry,
    entity: &EntityType,
    payload: &Document,
) -> MutationResult<Document> {
    let record = materialize(registry, entity, payload)?;
    if let Some(field) = record.collections.keys().next() {
        return Err(MutationError::invalid_payload(
            &entity.name,
            format!("referenced list {} cannot be written through an embedded value", field),
        ));
    }
    let mut doc = record.fields;
    for key in record.unset {
        doc.insert(key, Value::Null);
    }
    Ok(doc)
}
