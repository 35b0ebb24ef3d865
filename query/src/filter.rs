//! Request filter trees.
//!
//! A filter tree maps top-level field names of the queried type to either a
//! scalar condition (`{operator, value}`) or, for relation fields, a list of
//! terms whose `path` walks into the related type (`{terms: [{path, value}]}`).

use crate::{QueryError, QueryResult};
use gnx_core::Value;
use indexmap::IndexMap;
use serde::Deserialize;
use std::fmt;

/// Comparison requested by a filter term. Only equality is evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FilterOperator {
    #[default]
    Eq,
    /// Accepted but evaluated as equality.
    Other(String),
}

impl FilterOperator {
    pub fn parse(op: Option<&str>) -> Self {
        match op.map(str::trim) {
            None | Some("") | Some("eq") | Some("EQ") | Some("=") | Some("==") => Self::Eq,
            Some(other) => Self::Other(other.to_string()),
        }
    }

    pub fn is_eq(&self) -> bool {
        matches!(self, Self::Eq)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq => f.write_str("eq"),
            Self::Other(op) => f.write_str(op),
        }
    }
}

/// One leaf condition on a relation field.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterTerm {
    pub operator: FilterOperator,
    pub value: Value,
    /// Dot-separated path inside the related type.
    pub path: String,
}

impl FilterTerm {
    pub fn eq(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            operator: FilterOperator::Eq,
            value: value.into(),
            path: path.into(),
        }
    }
}

/// The condition attached to one top-level field.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterInput {
    Scalar {
        operator: FilterOperator,
        value: Value,
    },
    Relation {
        terms: Vec<FilterTerm>,
    },
}

impl FilterInput {
    pub fn eq(value: impl Into<Value>) -> Self {
        Self::Scalar {
            operator: FilterOperator::Eq,
            value: value.into(),
        }
    }

    pub fn terms(terms: Vec<FilterTerm>) -> Self {
        Self::Relation { terms }
    }
}

/// Field name to condition, in request order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterTree {
    entries: IndexMap<String, FilterInput>,
}

impl FilterTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, input: FilterInput) -> Self {
        self.entries.insert(field.into(), input);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, input: FilterInput) {
        self.entries.insert(field.into(), input);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterInput)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a filter tree from its JSON request form.
    pub fn from_json(json: serde_json::Value) -> QueryResult<Self> {
        if json.is_null() {
            return Ok(Self::new());
        }
        let raw: IndexMap<String, RawInput> = serde_json::from_value(json)
            .map_err(|e| QueryError::invalid_filter(e.to_string()))?;

        let mut tree = Self::new();
        for (field, input) in raw {
            let input = match input {
                RawInput::Relation { terms } => FilterInput::Relation {
                    terms: terms
                        .into_iter()
                        .map(|t| FilterTerm {
                            operator: FilterOperator::parse(t.operator.as_deref()),
                            value: Value::from_json(t.value),
                            path: t.path,
                        })
                        .collect(),
                },
                RawInput::Scalar { operator, value } => FilterInput::Scalar {
                    operator: FilterOperator::parse(operator.as_deref()),
                    value: Value::from_json(value),
                },
            };
            tree.insert(field, input);
        }
        Ok(tree)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawInput {
    Relation {
        terms: Vec<RawTerm>,
    },
    Scalar {
        #[serde(default)]
        operator: Option<String>,
        value: serde_json::Value,
    },
}

#[derive(Deserialize)]
struct RawTerm {
    #[serde(default)]
    operator: Option<String>,
    #[serde(default)]
    value: serde_json::Value,
    path: String,
}
