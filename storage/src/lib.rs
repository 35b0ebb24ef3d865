//! GNX Storage
//!
//! The interface GNX drives a document store through, plus `MemoryStore`,
//! an in-process engine that executes pipelines and honours the
//! transactional contract.

mod buffer;
mod error;
mod memory;
mod pipeline;
mod store;

pub use buffer::{PendingWrite, TransactionBuffer};
pub use error::{StoreError, StoreResult};
pub use memory::{MemoryStore, MemoryTransaction};
pub use pipeline::execute_pipeline;
pub use store::{RecordUpdate, Store, Transaction};
