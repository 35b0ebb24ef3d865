//! GNX Query
//!
//! Compile nested filter trees into storage pipelines.
//!
//! Responsibilities:
//! - Parse request filters (`FilterTree`)
//! - Resolve term paths across embedded and referenced relations
//! - Emit deduplicated Join/Flatten stages and one combined Match
//! - Translate page/size pagination into Skip/Limit stages

mod compiler;
mod error;
mod filter;
mod pagination;

pub use compiler::{CompiledFilter, FilterCompiler};
pub use error::{QueryError, QueryResult};
pub use filter::{FilterInput, FilterOperator, FilterTerm, FilterTree};
pub use pagination::Pagination;
