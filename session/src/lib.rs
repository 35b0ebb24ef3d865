//! GNX Session
//!
//! The Root Operation Builder: wires registered endpoint types to named
//! get/list/add/update/delete operations and serves them.
//!
//! Responsibilities:
//! - Derive input shapes once at construction
//! - Expose the root operations of every endpoint type
//! - Parse request envelopes and validate mutation payloads
//! - Compile and paginate list filters, run mutations
//! - Present stored records in schema form

mod config;
mod error;
mod operation;
mod output;
mod request;
mod result;
mod session;

pub use config::{PaginationConfig, SessionConfig};
pub use error::{SessionError, SessionResult};
pub use operation::{build_operations, OperationKind, RootOperation};
pub use output::present;
pub use request::{ListRequest, MutationOperation, MutationRequest};
pub use result::OperationResult;
pub use session::Session;
