//! Root operations derived from endpoint types.

use crate::{SessionError, SessionResult};
use gnx_registry::Registry;
use indexmap::IndexMap;
use std::fmt;

/// What a root operation does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Point lookup by identifier.
    Get,
    /// Filtered, paginated listing.
    List,
    Create,
    Update,
    Delete,
}

impl OperationKind {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            OperationKind::Create | OperationKind::Update | OperationKind::Delete
        )
    }
}

/// A named, externally visible operation on one entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootOperation {
    pub name: String,
    pub kind: OperationKind,
    pub entity: String,
}

impl fmt::Display for RootOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?} {})", self.name, self.kind, self.entity)
    }
}

/// Build the root operations of every endpoint type, keyed by name.
///
/// A type with single name `book` and list name `books` gets `book`,
/// `books`, `addBook`, `updateBook` and `deleteBook`. Two operations with
/// the same name are a configuration error.
pub fn build_operations(registry: &Registry) -> SessionResult<IndexMap<String, RootOperation>> {
    let mut operations = IndexMap::new();
    for entity in registry.endpoint_types() {
        let Some(endpoint) = &entity.endpoint else {
            continue;
        };
        let suffix = capitalize(&endpoint.single_name);
        let names = [
            (endpoint.single_name.clone(), OperationKind::Get),
            (endpoint.list_name.clone(), OperationKind::List),
            (format!("add{}", suffix), OperationKind::Create),
            (format!("update{}", suffix), OperationKind::Update),
            (format!("delete{}", suffix), OperationKind::Delete),
        ];
        for (name, kind) in names {
            let op = RootOperation {
                name: name.clone(),
                kind,
                entity: entity.name.clone(),
            };
            if let Some(existing) = operations.insert(name, op) {
                return Err(SessionError::config(format!(
                    "operation {} is defined by both {} and {}",
                    existing.name, existing.entity, entity.name
                )));
            }
        }
    }
    Ok(operations)
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
