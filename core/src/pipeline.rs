//! Storage pipeline stages.
//!
//! A pipeline is the compiled form of a filtered read: joins that pull related
//! records in from other collections, flattenings that turn the joined lists
//! into one row per related record, a single combined match, and optional
//! pagination stages.

use crate::Value;
use indexmap::IndexMap;
use std::fmt;

/// One unit of compiled query work.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Pull records from `from` whose `foreign_field` equals the value at
    /// `local_field`, exposing them as a list under `alias`.
    Join {
        from: String,
        local_field: String,
        foreign_field: String,
        alias: String,
    },

    /// Emit one row per element of the list under `alias`. Rows whose list is
    /// missing, null or empty are kept without the field.
    Flatten { alias: String },

    /// Keep rows satisfying every equality in the map.
    Match(MatchMap),

    /// Drop the first `n` rows.
    Skip(u64),

    /// Keep at most `n` rows.
    Limit(u64),
}

impl Stage {
    /// Returns true for Join and Flatten stages.
    pub fn is_relation_stage(&self) -> bool {
        matches!(self, Stage::Join { .. } | Stage::Flatten { .. })
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Join {
                from,
                local_field,
                foreign_field,
                alias,
            } => write!(
                f,
                "join {} on {} = {}.{} as {}",
                from, local_field, from, foreign_field, alias
            ),
            Stage::Flatten { alias } => write!(f, "flatten {}", alias),
            Stage::Match(map) => write!(f, "match {}", map),
            Stage::Skip(n) => write!(f, "skip {}", n),
            Stage::Limit(n) => write!(f, "limit {}", n),
        }
    }
}

/// Combined equality conditions keyed by field path.
///
/// Each distinct path owns one entry. Adding a second, different value for a
/// path that already has one keeps both: all values must hold (the conditions
/// are ANDed), so nothing is silently overwritten.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchMap {
    entries: IndexMap<String, Vec<Value>>,
}

impl MatchMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality condition on `path`.
    pub fn insert(&mut self, path: impl Into<String>, value: Value) {
        let values = self.entries.entry(path.into()).or_default();
        if !values.contains(&value) {
            values.push(value);
        }
    }

    /// Get the conditions recorded for a path.
    pub fn get(&self, path: &str) -> Option<&[Value]> {
        self.entries.get(path).map(|v| v.as_slice())
    }

    /// Iterate over paths and their conditions in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Field paths in first-seen order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    /// Number of distinct paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for MatchMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for (path, values) in self.iter() {
            for value in values {
                if !first {
                    write!(f, ", ")?;
                }
                first = false;
                write!(f, "{}: {}", path, value)?;
            }
        }
        write!(f, "}}")
    }
}

/// An ordered sequence of stages executed against one collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_stages(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    pub fn push(&mut self, stage: Stage) {
        self.stages.push(stage);
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn into_stages(self) -> Vec<Stage> {
        self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// The combined match stage, if any.
    pub fn match_stage(&self) -> Option<&MatchMap> {
        self.stages.iter().find_map(|s| match s {
            Stage::Match(map) => Some(map),
            _ => None,
        })
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stage) in self.stages.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{}", stage)?;
        }
        Ok(())
    }
}
