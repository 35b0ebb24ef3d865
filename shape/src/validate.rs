//! Payload validation against derived shapes.

use crate::shape::{InputShape, InputShapes, InputType};
use crate::{ShapeError, ShapeResult};
use gnx_core::{Document, Value};
use gnx_registry::ScalarKind;

impl InputShapes {
    /// Check `payload` against the shape named `shape`.
    ///
    /// Unknown fields are rejected, required fields must be present and
    /// non-null, and nested shapes, lists and buckets are checked recursively.
    /// A null on an optional field is accepted: it requests field removal.
    pub fn validate(&self, shape: &str, payload: &Value) -> ShapeResult<()> {
        let input = self
            .shape(shape)
            .ok_or_else(|| ShapeError::UnknownShape(shape.to_string()))?;
        let Value::Object(doc) = payload else {
            return Err(ShapeError::invalid(
                "$",
                format!("expected {}, found {}", shape, payload.type_name()),
            ));
        };
        self.check_shape(input, doc, "$")
    }

    fn check_shape(&self, shape: &InputShape, doc: &Document, path: &str) -> ShapeResult<()> {
        for key in doc.keys() {
            if shape.get_field(key).is_none() {
                return Err(ShapeError::invalid(
                    format!("{}.{}", path, key),
                    format!("unknown field on {}", shape.name),
                ));
            }
        }

        for field in shape.fields.values() {
            let field_path = format!("{}.{}", path, field.name);
            match doc.get(&field.name) {
                None | Some(Value::Null) if field.required => {
                    return Err(ShapeError::invalid(field_path, "required field is missing"));
                }
                None | Some(Value::Null) => {}
                Some(value) => self.check_type(&field.ty, value, &field_path)?,
            }
        }
        Ok(())
    }

    fn check_type(&self, ty: &InputType, value: &Value, path: &str) -> ShapeResult<()> {
        match ty {
            InputType::Scalar(kind) => {
                if scalar_accepts(*kind, value) {
                    Ok(())
                } else {
                    Err(mismatch(path, kind.name(), value))
                }
            }
            InputType::IdReference => self.check_named(crate::ID_INPUT, value, path),
            InputType::Shape(name) => self.check_named(name, value, path),
            InputType::List(inner) => {
                let Value::List(items) = value else {
                    return Err(mismatch(path, "List", value));
                };
                for (i, item) in items.iter().enumerate() {
                    let item_path = format!("{}[{}]", path, i);
                    if item.is_null() {
                        return Err(ShapeError::invalid(item_path, "list items cannot be null"));
                    }
                    self.check_type(inner, item, &item_path)?;
                }
                Ok(())
            }
            InputType::Buckets(name) => {
                let bucket = self
                    .bucket(name)
                    .ok_or_else(|| ShapeError::UnknownShape(name.clone()))?;
                let Value::Object(doc) = value else {
                    return Err(mismatch(path, name, value));
                };
                let buckets = bucket.buckets();
                for key in doc.keys() {
                    if !buckets.iter().any(|(k, _)| k == key) {
                        return Err(ShapeError::invalid(
                            format!("{}.{}", path, key),
                            format!("unknown bucket on {}", name),
                        ));
                    }
                }
                for (key, shape) in buckets {
                    if let Some(items) = doc.get(key).filter(|v| !v.is_null()) {
                        let list = InputType::List(Box::new(InputType::Shape(shape.to_string())));
                        self.check_type(&list, items, &format!("{}.{}", path, key))?;
                    }
                }
                Ok(())
            }
        }
    }

    fn check_named(&self, name: &str, value: &Value, path: &str) -> ShapeResult<()> {
        let shape = self
            .shape(name)
            .ok_or_else(|| ShapeError::UnknownShape(name.to_string()))?;
        match value {
            Value::Object(doc) => self.check_shape(shape, doc, path),
            other => Err(mismatch(path, name, other)),
        }
    }
}

/// Ints are accepted where floats are expected; identifiers may arrive as text.
fn scalar_accepts(kind: ScalarKind, value: &Value) -> bool {
    matches!(
        (kind, value),
        (ScalarKind::Id, Value::Id(_) | Value::String(_))
            | (ScalarKind::String, Value::String(_))
            | (ScalarKind::Int, Value::Int(_))
            | (ScalarKind::Float, Value::Float(_) | Value::Int(_))
            | (ScalarKind::Bool, Value::Bool(_))
    )
}

fn mismatch(path: &str, expected: &str, found: &Value) -> ShapeError {
    ShapeError::invalid(
        path,
        format!("expected {}, found {}", expected, found.type_name()),
    )
}
