//! GNX Registry
//!
//! The schema graph: entity types, their fields, and how related types are
//! stored (inline or in their own collection). Built once through
//! `RegistryBuilder`, then shared read-only by every other component.

mod builder;
mod registry;
mod types;

pub use builder::{DroppedField, RegistryBuilder, RegistryError, RegistryResult, TypeBuilder};
pub use registry::Registry;
pub use types::*;
