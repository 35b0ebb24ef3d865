//! GNX integration test framework.
//!
//! A `Scenario` runs a sequence of named root operations against a fresh
//! in-memory store and checks each result with an `Assertion`. The
//! `fixtures` module holds the schemas scenarios run against.

mod assertion;
pub mod fixtures;
mod runner;

pub use assertion::{Assertion, AssertionBuilder};
pub use error::{ScenarioError, ScenarioResult};
pub use runner::{Scenario, Step};

pub mod prelude {
    pub use crate::fixtures;
    pub use crate::{AssertionBuilder, Scenario, ScenarioError, ScenarioResult};
    pub use gnx_core::ErrorKind;
    pub use serde_json::json;
}
