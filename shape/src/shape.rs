//! Derived input shape types.

use gnx_registry::ScalarKind;
use indexmap::IndexMap;
use std::fmt;

/// Name of the shape carried by referenced-object fields.
pub const ID_INPUT: &str = "IdInput";

/// Name of the create shape for `entity`.
pub fn create_shape_name(entity: &str) -> String {
    format!("{}Input", entity)
}

/// Name of the update shape for `entity`.
pub fn update_shape_name(entity: &str) -> String {
    format!("{}InputForUpdate", entity)
}

/// Name of the bucket structure for a referenced-list field.
pub fn buckets_name(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => format!("OneToMany{}{}", first.to_uppercase(), chars.as_str()),
        None => "OneToMany".to_string(),
    }
}

/// The type a request may carry for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputType {
    /// A primitive value.
    Scalar(ScalarKind),
    /// `{ id }` naming an existing record.
    IdReference,
    /// A nested value of the named shape.
    Shape(String),
    /// A list of the inner type.
    List(Box<InputType>),
    /// The named added/updated/deleted bucket structure.
    Buckets(String),
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputType::Scalar(kind) => f.write_str(kind.name()),
            InputType::IdReference => f.write_str(ID_INPUT),
            InputType::Shape(name) | InputType::Buckets(name) => f.write_str(name),
            InputType::List(inner) => write!(f, "[{}!]", inner),
        }
    }
}

/// One field of an input shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputField {
    pub name: String,
    pub ty: InputType,
    /// Must be present and non-null.
    pub required: bool,
}

impl InputField {
    pub fn new(name: impl Into<String>, ty: InputType, required: bool) -> Self {
        Self {
            name: name.into(),
            ty,
            required,
        }
    }
}

/// A named request shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputShape {
    pub name: String,
    pub fields: IndexMap<String, InputField>,
}

impl InputShape {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn with_field(mut self, field: InputField) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    pub fn get_field(&self, name: &str) -> Option<&InputField> {
        self.fields.get(name)
    }
}

impl fmt::Display for InputShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "input {} {{", self.name)?;
        for field in self.fields.values() {
            let bang = if field.required { "!" } else { "" };
            writeln!(f, "  {}: {}{}", field.name, field.ty, bang)?;
        }
        write!(f, "}}")
    }
}

/// Added/updated/deleted buckets for a referenced-list field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketShape {
    pub name: String,
    /// Target create shape.
    pub added: String,
    /// Target update shape.
    pub updated: String,
    /// Target create shape; only the identifier is used.
    pub deleted: String,
}

impl BucketShape {
    pub fn for_target(name: impl Into<String>, target: &str) -> Self {
        Self {
            name: name.into(),
            added: create_shape_name(target),
            updated: update_shape_name(target),
            deleted: create_shape_name(target),
        }
    }

    /// Shape name for each bucket key.
    pub fn buckets(&self) -> [(&'static str, &str); 3] {
        [
            ("added", &self.added),
            ("updated", &self.updated),
            ("deleted", &self.deleted),
        ]
    }
}

impl fmt::Display for BucketShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "input {} {{", self.name)?;
        for (key, shape) in self.buckets() {
            writeln!(f, "  {}: [{}!]", key, shape)?;
        }
        write!(f, "}}")
    }
}

/// Every derived shape, keyed by shape name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputShapes {
    pub(crate) shapes: IndexMap<String, InputShape>,
    pub(crate) buckets: IndexMap<String, BucketShape>,
}

impl InputShapes {
    /// Look up any input shape by name.
    pub fn shape(&self, name: &str) -> Option<&InputShape> {
        self.shapes.get(name)
    }

    pub fn create_shape(&self, entity: &str) -> Option<&InputShape> {
        self.shapes.get(&create_shape_name(entity))
    }

    pub fn update_shape(&self, entity: &str) -> Option<&InputShape> {
        self.shapes.get(&update_shape_name(entity))
    }

    pub fn bucket(&self, name: &str) -> Option<&BucketShape> {
        self.buckets.get(name)
    }

    /// Input shapes in derivation order.
    pub fn shapes(&self) -> impl Iterator<Item = &InputShape> {
        self.shapes.values()
    }

    pub fn buckets(&self) -> impl Iterator<Item = &BucketShape> {
        self.buckets.values()
    }

    pub fn len(&self) -> usize {
        self.shapes.len() + self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty() && self.buckets.is_empty()
    }
}

impl fmt::Display for InputShapes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for shape in self.shapes.values() {
            writeln!(f, "{}", shape)?;
        }
        for bucket in self.buckets.values() {
            writeln!(f, "{}", bucket)?;
        }
        Ok(())
    }
}
