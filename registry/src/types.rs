//! Schema definition types.
//!
//! Two layers live here. The `*Spec` types describe a schema the way the
//! schema collaborator hands it over: typed fields with optional relation
//! metadata. The registered types (`FieldDef`, `FieldKind`, `EntityType`) are
//! what the rest of GNX reads: every field carries exactly one closed shape.

use gnx_core::ID_KEY;
use indexmap::IndexMap;

/// Primitive value type of a scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// Record identifier.
    Id,
    String,
    Int,
    Float,
    Bool,
}

impl ScalarKind {
    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::Id => "Id",
            ScalarKind::String => "String",
            ScalarKind::Int => "Int",
            ScalarKind::Float => "Float",
            ScalarKind::Bool => "Bool",
        }
    }
}

/// Single related value or list of related values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    One,
    Many,
}

/// The shape of a registered field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Primitive value stored directly on the record.
    Scalar(ScalarKind),

    /// Value(s) of `target` stored inline inside the owning record.
    Embedded {
        target: String,
        cardinality: Cardinality,
    },

    /// Value(s) of `target` stored in the target's own collection.
    ///
    /// For `One`, `connection_field` lives on the owner and holds the target's
    /// identifier. For `Many`, it lives on each target and holds the owner's.
    Referenced {
        target: String,
        cardinality: Cardinality,
        connection_field: String,
    },
}

/// A registered field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// Field shape.
    pub kind: FieldKind,
    /// Whether the field may be null or absent on create.
    pub nullable: bool,
}

impl FieldDef {
    pub fn is_embedded(&self) -> bool {
        matches!(self.kind, FieldKind::Embedded { .. })
    }

    pub fn is_referenced(&self) -> bool {
        matches!(self.kind, FieldKind::Referenced { .. })
    }

    /// Related type name for relation fields.
    pub fn target(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::Scalar(_) => None,
            FieldKind::Embedded { target, .. } | FieldKind::Referenced { target, .. } => {
                Some(target)
            }
        }
    }

    /// Scalar kind for scalar fields.
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self.kind {
            FieldKind::Scalar(kind) => Some(kind),
            _ => None,
        }
    }
}

/// Where an entity type is stored and how its root operations are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Storage collection name.
    pub collection: String,
    /// Name of the single-record operation (e.g. `book`).
    pub single_name: String,
    /// Name of the list operation (e.g. `books`).
    pub list_name: String,
}

impl Endpoint {
    pub fn new(
        collection: impl Into<String>,
        single_name: impl Into<String>,
        list_name: impl Into<String>,
    ) -> Self {
        Self {
            collection: collection.into(),
            single_name: single_name.into(),
            list_name: list_name.into(),
        }
    }
}

/// A registered entity type. Immutable once the registry is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityType {
    /// Type name.
    pub name: String,
    /// Fields in declaration order.
    pub fields: IndexMap<String, FieldDef>,
    /// Storage endpoint. `None` for types that only ever appear embedded.
    pub endpoint: Option<Endpoint>,
}

impl EntityType {
    /// Get a field definition by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    /// Iterate over fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.values()
    }

    /// Storage collection, if this type has an endpoint.
    pub fn collection(&self) -> Option<&str> {
        self.endpoint.as_ref().map(|e| e.collection.as_str())
    }

    /// The identifier field: the first `Id`-kind scalar.
    pub fn identifier_field(&self) -> Option<&FieldDef> {
        self.fields
            .values()
            .find(|f| f.scalar_kind() == Some(ScalarKind::Id))
    }

    /// The key a field is stored under. The identifier field maps to `_id`.
    pub fn storage_key<'a>(&self, field_name: &'a str) -> &'a str {
        match self.identifier_field() {
            Some(id_field) if id_field.name == field_name => ID_KEY,
            _ => field_name,
        }
    }
}

// ==================== Registration Input ====================

/// Declared type of a field, before relation metadata is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Scalar(ScalarKind),
    /// A single value of the named entity type.
    Object(String),
    /// A list of values of the named entity type.
    List(String),
}

/// Relation metadata attached to object and list fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    /// Stored inline (true) or in the target's own collection (false).
    pub embedded: bool,
    /// Foreign-key field name; required when not embedded.
    pub connection_field: Option<String>,
}

/// A field as declared by the schema collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub ty: FieldType,
    pub nullable: bool,
    pub relation: Option<Relation>,
}

impl FieldSpec {
    fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: true,
            relation: None,
        }
    }

    pub fn scalar(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self::new(name, FieldType::Scalar(kind))
    }

    pub fn id(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarKind::Id)
    }

    pub fn object(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, FieldType::Object(target.into()))
    }

    pub fn list(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, FieldType::List(target.into()))
    }

    /// Mark the field as non-nullable.
    pub fn required(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Store the related value(s) inline.
    pub fn embedded(mut self) -> Self {
        self.relation = Some(Relation {
            embedded: true,
            connection_field: None,
        });
        self
    }

    /// Store the related value(s) in their own collection, linked by `connection_field`.
    pub fn referenced(mut self, connection_field: impl Into<String>) -> Self {
        self.relation = Some(Relation {
            embedded: false,
            connection_field: Some(connection_field.into()),
        });
        self
    }
}
