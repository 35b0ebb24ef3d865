//! Session result types.

use gnx_core::{document_to_json, Document};

/// Result of a root operation, in schema form.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationResult {
    /// Single-record result: point lookups and mutations.
    Record(Option<Document>),
    /// List result.
    Records(Vec<Document>),
}

impl OperationResult {
    /// The single record, if this is a Record result holding one.
    pub fn record(&self) -> Option<&Document> {
        match self {
            OperationResult::Record(record) => record.as_ref(),
            OperationResult::Records(_) => None,
        }
    }

    /// The rows of a list result. Empty for single-record results.
    pub fn records(&self) -> &[Document] {
        match self {
            OperationResult::Records(rows) => rows,
            OperationResult::Record(_) => &[],
        }
    }

    /// Get the number of records.
    pub fn len(&self) -> usize {
        match self {
            OperationResult::Record(record) => usize::from(record.is_some()),
            OperationResult::Records(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render as JSON: an object or null, or an array of objects.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            OperationResult::Record(Some(record)) => document_to_json(record),
            OperationResult::Record(None) => serde_json::Value::Null,
            OperationResult::Records(rows) => {
                serde_json::Value::Array(rows.iter().map(document_to_json).collect())
            }
        }
    }
}
