//! Stored record to schema form.

use gnx_core::{Document, Value};
use gnx_registry::{Cardinality, EntityType, FieldKind, Registry};

/// Present a stored record of `entity` in schema form.
///
/// The identifier moves back from `_id` to its field, a single reference
/// becomes `{<target identifier>: ...}`, embedded values are presented
/// recursively, and keys the schema does not name (join aliases, foreign
/// keys of other types) are dropped. Referenced lists are not inlined.
pub fn present(registry: &Registry, entity: &EntityType, record: &Document) -> Document {
    let mut out = Document::new();
    for field in entity.fields() {
        match &field.kind {
            FieldKind::Scalar(_) => {
                if let Some(value) = record.get(entity.storage_key(&field.name)) {
                    out.insert(field.name.clone(), value.clone());
                }
            }
            FieldKind::Embedded {
                target,
                cardinality,
            } => {
                let (Some(value), Ok(target)) = (record.get(&field.name), registry.resolve(target))
                else {
                    continue;
                };
                let presented = match (cardinality, value) {
                    (Cardinality::One, Value::Object(doc)) => {
                        Value::Object(present(registry, target, doc))
                    }
                    (Cardinality::Many, Value::List(items)) => Value::List(
                        items
                            .iter()
                            .map(|item| match item {
                                Value::Object(doc) => Value::Object(present(registry, target, doc)),
                                other => other.clone(),
                            })
                            .collect(),
                    ),
                    (_, other) => other.clone(),
                };
                out.insert(field.name.clone(), presented);
            }
            FieldKind::Referenced {
                target,
                cardinality: Cardinality::One,
                connection_field,
            } => {
                let Some(id) = record.get(connection_field).filter(|v| !v.is_null()) else {
                    continue;
                };
                let key = registry
                    .get(target)
                    .and_then(EntityType::identifier_field)
                    .map_or("id", |f| f.name.as_str());
                let mut reference = Document::new();
                reference.insert(key.to_string(), id.clone());
                out.insert(field.name.clone(), Value::Object(reference));
            }
            FieldKind::Referenced { .. } => {}
        }
    }
    out
}
