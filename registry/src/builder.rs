//! RegistryBuilder for constructing an immutable Registry.

use crate::{
    Cardinality, Endpoint, EntityType, FieldDef, FieldKind, FieldSpec, FieldType, Registry,
    Relation,
};
use gnx_core::ErrorKind;
use indexmap::IndexMap;
use regex_lite::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use thiserror::Error;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors that can occur during registry construction and lookup.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Invalid {what} name: {name:?}")]
    InvalidName { what: &'static str, name: String },

    #[error("Configuration issue: field {field} on type {entity} does not define relation metadata")]
    MissingRelation { entity: String, field: String },

    #[error("Configuration issue: referenced field {field} on type {entity} has no connection field")]
    MissingConnectionField { entity: String, field: String },

    #[error("Type {0} is already registered with a different definition")]
    ConflictingDefinition(String),

    #[error("Unknown target type {target} for field {field} on type {entity}")]
    UnknownTargetType {
        entity: String,
        field: String,
        target: String,
    },

    #[error("Field {field} on type {entity} references {target}, which has no collection")]
    ReferencedWithoutCollection {
        entity: String,
        field: String,
        target: String,
    },

    #[error("Collection {collection} is used by both {first} and {second}")]
    DuplicateCollection {
        collection: String,
        first: String,
        second: String,
    },

    #[error("Type not found: {0}")]
    TypeNotFound(String),

    #[error("Invalid name pattern: {0}")]
    Pattern(String),
}

impl RegistryError {
    pub fn invalid_name(what: &'static str, name: impl Into<String>) -> Self {
        Self::InvalidName {
            what,
            name: name.into(),
        }
    }

    pub fn missing_relation(entity: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingRelation {
            entity: entity.into(),
            field: field.into(),
        }
    }

    pub fn missing_connection_field(entity: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingConnectionField {
            entity: entity.into(),
            field: field.into(),
        }
    }

    pub fn type_not_found(name: impl Into<String>) -> Self {
        Self::TypeNotFound(name.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::TypeNotFound(_) => ErrorKind::NotFound,
            _ => ErrorKind::Configuration,
        }
    }
}

/// A field excluded at registration because its metadata was incomplete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedField {
    pub entity: String,
    pub field: String,
    pub reason: String,
}

static NAME_PATTERN: OnceLock<Result<Regex, regex_lite::Error>> = OnceLock::new();

/// Names must be usable as dotted-path segments.
fn check_name(what: &'static str, name: &str) -> RegistryResult<()> {
    let pattern = NAME_PATTERN
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$"))
        .as_ref()
        .map_err(|e| RegistryError::Pattern(e.to_string()))?;
    if pattern.is_match(name) {
        Ok(())
    } else {
        Err(RegistryError::invalid_name(what, name))
    }
}

/// Builder for constructing an immutable Registry.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    /// Types registered so far, in registration order.
    types: IndexMap<String, EntityType>,
    /// Fields dropped during registration.
    dropped: Vec<DroppedField>,
}

impl RegistryBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start declaring a type.
    pub fn add_type(&mut self, name: impl Into<String>) -> TypeBuilder<'_> {
        TypeBuilder {
            builder: self,
            name: name.into(),
            endpoint: None,
            fields: Vec::new(),
        }
    }

    /// Register an entity type.
    ///
    /// Registering the same definition twice is a no-op. Object and list
    /// fields without relation metadata are logged and dropped; the rest of
    /// the type is still registered.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        endpoint: Option<Endpoint>,
        fields: Vec<FieldSpec>,
    ) -> RegistryResult<()> {
        let name = name.into();
        check_name("type", &name)?;
        if let Some(endpoint) = &endpoint {
            check_name("operation", &endpoint.single_name)?;
            check_name("operation", &endpoint.list_name)?;
        }

        let mut defs = IndexMap::new();
        let mut dropped = Vec::new();
        for spec in fields {
            check_name("field", &spec.name)?;
            match resolve_field(&name, spec) {
                Ok(def) => {
                    if let FieldKind::Referenced {
                        connection_field, ..
                    } = &def.kind
                    {
                        check_name("connection field", connection_field)?;
                    }
                    defs.insert(def.name.clone(), def);
                }
                Err((field, err)) => {
                    tracing::warn!(entity = %name, field = %field, error = %err, "dropping field");
                    dropped.push(DroppedField {
                        entity: name.clone(),
                        field,
                        reason: err.to_string(),
                    });
                }
            }
        }

        let entity = EntityType {
            name: name.clone(),
            fields: defs,
            endpoint,
        };

        if let Some(existing) = self.types.get(&name) {
            if *existing == entity {
                tracing::debug!(entity = %name, "type already registered");
                return Ok(());
            }
            return Err(RegistryError::ConflictingDefinition(name));
        }

        self.dropped.extend(dropped);
        self.types.insert(name, entity);
        Ok(())
    }

    /// Build the immutable Registry.
    ///
    /// Every relation must target a registered type, and referenced relations
    /// must target a type with a collection.
    pub fn build(self) -> RegistryResult<Registry> {
        let mut collections: HashMap<&str, &str> = HashMap::new();
        for entity in self.types.values() {
            if let Some(collection) = entity.collection() {
                if let Some(first) = collections.insert(collection, &entity.name) {
                    return Err(RegistryError::DuplicateCollection {
                        collection: collection.to_string(),
                        first: first.to_string(),
                        second: entity.name.clone(),
                    });
                }
            }
        }

        for entity in self.types.values() {
            for field in entity.fields() {
                let Some(target) = field.target() else {
                    continue;
                };
                let Some(target_type) = self.types.get(target) else {
                    return Err(RegistryError::UnknownTargetType {
                        entity: entity.name.clone(),
                        field: field.name.clone(),
                        target: target.to_string(),
                    });
                };
                if field.is_referenced() && target_type.endpoint.is_none() {
                    return Err(RegistryError::ReferencedWithoutCollection {
                        entity: entity.name.clone(),
                        field: field.name.clone(),
                        target: target.to_string(),
                    });
                }
            }
        }

        Ok(Registry::new(self.types, self.dropped))
    }
}

/// Turn a declared field into its closed registered shape.
fn resolve_field(entity: &str, spec: FieldSpec) -> Result<FieldDef, (String, RegistryError)> {
    let FieldSpec {
        name,
        ty,
        nullable,
        relation,
    } = spec;

    let (target, cardinality) = match ty {
        FieldType::Scalar(kind) => {
            return Ok(FieldDef {
                name,
                kind: FieldKind::Scalar(kind),
                nullable,
            })
        }
        FieldType::Object(target) => (target, Cardinality::One),
        FieldType::List(target) => (target, Cardinality::Many),
    };

    let kind = match relation {
        None => {
            let err = RegistryError::missing_relation(entity, &name);
            return Err((name, err));
        }
        Some(relation) if relation.embedded => FieldKind::Embedded {
            target,
            cardinality,
        },
        Some(Relation {
            connection_field: Some(connection_field),
            ..
        }) => FieldKind::Referenced {
            target,
            cardinality,
            connection_field,
        },
        Some(_) => {
            let err = RegistryError::missing_connection_field(entity, &name);
            return Err((name, err));
        }
    };

    Ok(FieldDef {
        name,
        kind,
        nullable,
    })
}

/// Builder for a type definition.
pub struct TypeBuilder<'a> {
    builder: &'a mut RegistryBuilder,
    name: String,
    endpoint: Option<Endpoint>,
    fields: Vec<FieldSpec>,
}

impl<'a> TypeBuilder<'a> {
    /// Store this type in `collection`, exposing `single` and `list` operations.
    pub fn endpoint(
        mut self,
        collection: impl Into<String>,
        single: impl Into<String>,
        list: impl Into<String>,
    ) -> Self {
        self.endpoint = Some(Endpoint::new(collection, single, list));
        self
    }

    /// Add a field.
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Finish building this type.
    pub fn done(self) -> RegistryResult<()> {
        self.builder.register(self.name, self.endpoint, self.fields)
    }
}
