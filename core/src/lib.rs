//! GNX Core Types
//!
//! This crate provides the foundational types shared by every GNX component:
//! - Record identity (`RecordId`)
//! - Document values (the `Value` enum and the ordered `Document` map)
//! - Dotted-path navigation over documents
//! - Storage pipeline stages (`Stage`, `MatchMap`, `Pipeline`)
//! - The error taxonomy every crate classifies into (`ErrorKind`)

mod error;
mod id;
pub mod path;
mod pipeline;
mod value;

pub use error::*;
pub use id::*;
pub use pipeline::*;
pub use value::*;
