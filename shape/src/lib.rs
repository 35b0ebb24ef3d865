//! GNX Input Shapes
//!
//! Derives, for every registered entity type, the shape a create request and
//! an update request must have, and validates payloads against them.
//!
//! Derivation is a fixed-point over the set of types still pending: a type
//! whose embedded targets are not derived yet waits for the next pass.

mod derive;
mod error;
mod shape;
mod validate;

pub use derive::derive_all;
pub use error::{ShapeError, ShapeResult};
pub use shape::*;
