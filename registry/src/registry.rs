//! The Registry - immutable schema lookup.

use crate::{DroppedField, EntityType, RegistryError, RegistryResult};
use indexmap::IndexMap;

/// The Registry provides runtime lookup of entity types.
/// It is immutable after construction and safe to share across threads.
#[derive(Debug, Default)]
pub struct Registry {
    /// Entity types by name, in registration order.
    types: IndexMap<String, EntityType>,
    /// Fields excluded during registration.
    dropped: Vec<DroppedField>,
}

impl Registry {
    /// Create a registry (use RegistryBuilder for construction).
    pub(crate) fn new(types: IndexMap<String, EntityType>, dropped: Vec<DroppedField>) -> Self {
        Self { types, dropped }
    }

    /// Resolve a type by name.
    pub fn resolve(&self, name: &str) -> RegistryResult<&EntityType> {
        self.types
            .get(name)
            .ok_or_else(|| RegistryError::type_not_found(name))
    }

    /// Get a type by name.
    pub fn get(&self, name: &str) -> Option<&EntityType> {
        self.types.get(name)
    }

    /// All registered types in registration order.
    pub fn all_types(&self) -> impl Iterator<Item = &EntityType> {
        self.types.values()
    }

    /// Types stored in their own collection.
    pub fn endpoint_types(&self) -> impl Iterator<Item = &EntityType> {
        self.types.values().filter(|t| t.endpoint.is_some())
    }

    /// Find the type stored in `collection`.
    pub fn by_collection(&self, collection: &str) -> Option<&EntityType> {
        self.types
            .values()
            .find(|t| t.collection() == Some(collection))
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Fields dropped at registration because of incomplete relation metadata.
    pub fn dropped_fields(&self) -> &[DroppedField] {
        &self.dropped
    }
}
