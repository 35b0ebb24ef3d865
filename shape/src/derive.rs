//! Fixed-point derivation of input shapes.

use crate::shape::{
    buckets_name, create_shape_name, update_shape_name, BucketShape, InputField, InputShape,
    InputShapes, InputType, ID_INPUT,
};
use crate::{ShapeError, ShapeResult};
use gnx_registry::{Cardinality, EntityType, FieldDef, FieldKind, Registry, ScalarKind};

/// Derive the create and update shapes of every registered type.
///
/// Each pass derives the pending types whose embedded targets are already
/// derived; shapes become visible to later types in the same pass. A pass
/// that derives nothing leaves only types caught in (or waiting on) a cycle
/// of embedded relations, which is reported instead of retried.
pub fn derive_all(registry: &Registry) -> ShapeResult<InputShapes> {
    let mut shapes = InputShapes::default();
    shapes.shapes.insert(
        ID_INPUT.to_string(),
        InputShape::new(ID_INPUT).with_field(InputField::new(
            "id",
            InputType::Scalar(ScalarKind::Id),
            true,
        )),
    );

    let mut pending: Vec<&EntityType> = registry.all_types().collect();
    let mut pass = 0usize;
    while !pending.is_empty() {
        pass += 1;
        let before = pending.len();
        tracing::debug!(pass, pending = before, "deriving input shapes");

        let mut waiting = Vec::new();
        for entity in pending {
            if embedded_targets_ready(entity, &shapes) {
                derive_entity(entity, &mut shapes)?;
            } else {
                waiting.push(entity);
            }
        }

        if waiting.len() == before {
            let names = waiting.iter().map(|e| e.name.clone()).collect();
            return Err(ShapeError::EmbeddingCycle(names));
        }
        pending = waiting;
    }

    tracing::debug!(passes = pass, shapes = shapes.len(), "input shapes derived");
    Ok(shapes)
}

/// Referenced relations only name their target's shapes, so only embedded
/// targets have to be derived first.
fn embedded_targets_ready(entity: &EntityType, shapes: &InputShapes) -> bool {
    entity.fields().all(|field| match &field.kind {
        FieldKind::Embedded { target, .. } => shapes.shapes.contains_key(&create_shape_name(target)),
        _ => true,
    })
}

fn derive_entity(entity: &EntityType, shapes: &mut InputShapes) -> ShapeResult<()> {
    let identifier = entity.identifier_field().map(|f| f.name.as_str());
    let mut create = InputShape::new(create_shape_name(&entity.name));
    let mut update = InputShape::new(update_shape_name(&entity.name));

    for field in entity.fields() {
        let is_identifier = identifier == Some(field.name.as_str());
        let (create_field, update_field) = derive_field(field, is_identifier);
        create = create.with_field(create_field);
        update = update.with_field(update_field);

        if let FieldKind::Referenced {
            target,
            cardinality: Cardinality::Many,
            ..
        } = &field.kind
        {
            let bucket = BucketShape::for_target(buckets_name(&field.name), target);
            match shapes.buckets.get(&bucket.name) {
                Some(existing) if *existing != bucket => {
                    return Err(ShapeError::DuplicateShape { name: bucket.name });
                }
                Some(_) => {}
                None => {
                    shapes.buckets.insert(bucket.name.clone(), bucket);
                }
            }
        }
    }

    shapes.shapes.insert(create.name.clone(), create);
    shapes.shapes.insert(update.name.clone(), update);
    Ok(())
}

/// Map one field to its create-shape and update-shape entries.
fn derive_field(field: &FieldDef, is_identifier: bool) -> (InputField, InputField) {
    let name = field.name.as_str();
    let create_required = !field.nullable;

    match &field.kind {
        FieldKind::Scalar(kind) => {
            let ty = InputType::Scalar(*kind);
            // Identifiers are generated on create and name the target on update.
            let create_required = create_required && !is_identifier;
            let update_required = *kind == ScalarKind::Id;
            (
                InputField::new(name, ty.clone(), create_required),
                InputField::new(name, ty, update_required),
            )
        }
        FieldKind::Referenced {
            cardinality: Cardinality::One,
            ..
        } => (
            InputField::new(name, InputType::IdReference, create_required),
            InputField::new(name, InputType::IdReference, false),
        ),
        FieldKind::Referenced {
            cardinality: Cardinality::Many,
            ..
        } => {
            let ty = InputType::Buckets(buckets_name(name));
            (
                InputField::new(name, ty.clone(), false),
                InputField::new(name, ty, false),
            )
        }
        FieldKind::Embedded {
            target,
            cardinality,
        } => {
            let wrap = |shape: String| match cardinality {
                Cardinality::One => InputType::Shape(shape),
                Cardinality::Many => InputType::List(Box::new(InputType::Shape(shape))),
            };
            (
                InputField::new(name, wrap(create_shape_name(target)), create_required),
                InputField::new(name, wrap(update_shape_name(target)), false),
            )
        }
    }
}
