//! Request envelopes.

use crate::{SessionError, SessionResult};
use gnx_core::{document_from_json, Document};
use gnx_query::{FilterTree, Pagination};
use serde::Deserialize;

/// A list request: `{ filters, pagination? }`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListRequest {
    pub filters: FilterTree,
    pub pagination: Option<Pagination>,
}

impl ListRequest {
    pub fn new(filters: FilterTree) -> Self {
        Self {
            filters,
            pagination: None,
        }
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// Parse list arguments. `null` and `{}` list everything.
    pub fn from_json(args: serde_json::Value) -> SessionResult<Self> {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct Raw {
            #[serde(default)]
            filters: serde_json::Value,
            #[serde(default)]
            pagination: Option<Pagination>,
        }

        if args.is_null() {
            return Ok(Self::default());
        }
        let raw: Raw =
            serde_json::from_value(args).map_err(|e| SessionError::invalid_request(e.to_string()))?;
        let filters = match raw.filters {
            serde_json::Value::Null => FilterTree::new(),
            filters => FilterTree::from_json(filters)?,
        };
        Ok(Self {
            filters,
            pagination: raw.pagination,
        })
    }
}

/// Which write a mutation request performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationOperation {
    Create,
    Update,
    Delete,
}

/// A mutation request: `{ operation, entityType, payload }`.
///
/// A delete payload only needs the identifier field.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRequest {
    pub operation: MutationOperation,
    pub entity_type: String,
    pub payload: Document,
}

impl MutationRequest {
    pub fn new(operation: MutationOperation, entity_type: impl Into<String>, payload: Document) -> Self {
        Self {
            operation,
            entity_type: entity_type.into(),
            payload,
        }
    }

    pub fn from_json(json: serde_json::Value) -> SessionResult<Self> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase", deny_unknown_fields)]
        struct Raw {
            operation: MutationOperation,
            entity_type: String,
            payload: serde_json::Value,
        }

        let raw: Raw =
            serde_json::from_value(json).map_err(|e| SessionError::invalid_request(e.to_string()))?;
        let payload = document_from_json(raw.payload)
            .ok_or_else(|| SessionError::invalid_request("payload must be an object"))?;
        Ok(Self::new(raw.operation, raw.entity_type, payload))
    }
}
