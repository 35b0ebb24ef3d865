//! Error taxonomy shared by all GNX components.

use std::fmt;

/// The class an error belongs to, independent of which crate raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Schema, field or relation metadata inconsistent or unresolved.
    Configuration,
    /// Identifier lookup miss.
    NotFound,
    /// Storage engine write or commit failure; the whole mutation was aborted.
    Transaction,
    /// A request that does not fit the derived input shapes.
    InvalidInput,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::NotFound => "not found",
            ErrorKind::Transaction => "transaction",
            ErrorKind::InvalidInput => "invalid input",
        };
        f.write_str(name)
    }
}
