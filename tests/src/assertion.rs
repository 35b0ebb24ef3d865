//! Assertion types and builders for verifying step results.

use gnx_core::ErrorKind;
use gnx_session::{OperationResult, SessionError};
use serde_json::Value as Json;

use crate::error::{ScenarioError, ScenarioResult};

/// A complete assertion for a step result.
///
/// Expected records are JSON objects matched as subsets: every key given
/// must be present with an equal value, other keys are ignored.
#[derive(Default)]
pub struct Assertion {
    // Result shape
    pub rows: Option<usize>,
    pub empty: Option<bool>,
    pub missing: bool,
    pub record: Option<Json>,
    pub contains: Vec<Json>,
    pub returns: Option<Vec<Json>>,
    pub absent_keys: Vec<String>,

    // Error assertions
    pub error_kind: Option<ErrorKind>,
    pub error: Option<String>,
    pub error_pattern: Option<String>,

    // Custom assertion function
    #[allow(clippy::type_complexity)]
    pub custom: Option<Box<dyn Fn(&OperationResult) -> bool + Send + Sync>>,
}

impl std::fmt::Debug for Assertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assertion")
            .field("rows", &self.rows)
            .field("empty", &self.empty)
            .field("missing", &self.missing)
            .field("record", &self.record)
            .field("contains", &self.contains)
            .field("returns", &self.returns)
            .field("error_kind", &self.error_kind)
            .field("error", &self.error)
            .field("custom", &self.custom.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl Assertion {
    /// Create a new empty assertion.
    pub fn new() -> Self {
        Self::default()
    }

    fn expects_error(&self) -> bool {
        self.error_kind.is_some() || self.error.is_some() || self.error_pattern.is_some()
    }

    /// Verify the assertion against a result.
    pub fn verify(
        &self,
        step: &str,
        result: &Result<OperationResult, SessionError>,
    ) -> ScenarioResult<()> {
        if self.expects_error() {
            return match result {
                Err(err) => self.verify_error(step, err),
                Ok(ok) => Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected an error, but step succeeded with {}", ok.to_json()),
                )),
            };
        }

        let result = result
            .as_ref()
            .map_err(|e| ScenarioError::assertion_failed(step, format!("step failed: {}", e)))?;

        if let Some(ref custom) = self.custom {
            if !custom(result) {
                return Err(ScenarioError::assertion_failed(step, "custom assertion failed"));
            }
        }

        let fail = |message: String| Err(ScenarioError::assertion_failed(step, message));

        if self.missing && result.record().is_some() {
            return fail(format!("expected no record, got {}", result.to_json()));
        }

        if let Some(expected) = self.rows {
            if result.len() != expected {
                return fail(format!("expected {} rows, got {}", expected, result.len()));
            }
        }

        if let Some(expected) = self.empty {
            if result.is_empty() != expected {
                return fail(format!(
                    "expected empty={}, got {} rows",
                    expected,
                    result.len()
                ));
            }
        }

        if let Some(ref expected) = self.record {
            match result.record().map(gnx_core::document_to_json) {
                Some(actual) if json_matches(&actual, expected) => {}
                Some(actual) => return fail(format!("expected record {}, got {}", expected, actual)),
                None => return fail(format!("expected record {}, got none", expected)),
            }
        }

        let rows = rows_json(result);

        for expected in &self.contains {
            if !rows.iter().any(|row| json_matches(row, expected)) {
                return fail(format!("no row matches {}", expected));
            }
        }

        if let Some(ref expected) = self.returns {
            if rows.len() != expected.len() {
                return fail(format!("expected {} rows, got {}", expected.len(), rows.len()));
            }
            for (i, (row, want)) in rows.iter().zip(expected).enumerate() {
                if !json_matches(row, want) {
                    return fail(format!("row {}: expected {}, got {}", i, want, row));
                }
            }
        }

        for key in &self.absent_keys {
            if rows.iter().any(|row| row.get(key).is_some()) {
                return fail(format!("expected no row to carry {}", key));
            }
        }

        Ok(())
    }

    fn verify_error(&self, step: &str, err: &SessionError) -> ScenarioResult<()> {
        let message = err.to_string();

        if let Some(expected) = self.error_kind {
            if err.kind() != expected {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected {} error, got {} error: {}", expected, err.kind(), message),
                ));
            }
        }

        if let Some(ref expected) = self.error {
            if !message.contains(expected.as_str()) {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected error containing '{}', got: {}", expected, message),
                ));
            }
        }

        if let Some(ref pattern) = self.error_pattern {
            let re = regex_lite::Regex::new(pattern).map_err(|e| {
                ScenarioError::assertion_failed(step, format!("invalid regex pattern: {}", e))
            })?;
            if !re.is_match(&message) {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected error matching '{}', got: {}", pattern, message),
                ));
            }
        }

        Ok(())
    }
}

/// Builder for fluent assertion construction.
pub struct AssertionBuilder {
    assertion: Assertion,
}

impl AssertionBuilder {
    /// Create a new assertion builder.
    pub fn new() -> Self {
        Self {
            assertion: Assertion::new(),
        }
    }

    /// Build the assertion.
    pub fn build(self) -> Assertion {
        self.assertion
    }

    // ========== Result assertions ==========

    /// Assert that the step succeeds, without further checks.
    pub fn ok(self) -> Self {
        self
    }

    /// Assert exactly N rows (a single record counts as one).
    pub fn rows(mut self, n: usize) -> Self {
        self.assertion.rows = Some(n);
        self
    }

    pub fn empty(mut self) -> Self {
        self.assertion.empty = Some(true);
        self
    }

    /// Assert that a point lookup found nothing.
    pub fn missing(mut self) -> Self {
        self.assertion.missing = true;
        self
    }

    /// Assert the single record matches `expected`.
    pub fn record(mut self, expected: Json) -> Self {
        self.assertion.record = Some(expected);
        self
    }

    /// Assert some row matches `expected`.
    pub fn contains(mut self, expected: Json) -> Self {
        self.assertion.contains.push(expected);
        self
    }

    /// Assert the rows match `expected` one by one, in order.
    pub fn returns(mut self, expected: Vec<Json>) -> Self {
        self.assertion.returns = Some(expected);
        self
    }

    /// Assert no returned row carries `key`.
    pub fn without_key(mut self, key: impl Into<String>) -> Self {
        self.assertion.absent_keys.push(key.into());
        self
    }

    // ========== Error assertions ==========

    /// Assert that the step fails with an error of the given kind.
    pub fn error_kind(mut self, kind: ErrorKind) -> Self {
        self.assertion.error_kind = Some(kind);
        self
    }

    /// Assert that the step fails with an error containing the given string.
    pub fn error(mut self, contains: impl Into<String>) -> Self {
        self.assertion.error = Some(contains.into());
        self
    }

    /// Assert that the step fails with an error matching the given regex.
    pub fn error_matches(mut self, pattern: impl Into<String>) -> Self {
        self.assertion.error_pattern = Some(pattern.into());
        self
    }

    // ========== Advanced ==========

    /// Custom assertion function.
    pub fn assert_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&OperationResult) -> bool + Send + Sync + 'static,
    {
        self.assertion.custom = Some(Box::new(f));
        self
    }
}

impl Default for AssertionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// Helper functions

fn rows_json(result: &OperationResult) -> Vec<Json> {
    match result {
        OperationResult::Records(rows) => rows.iter().map(gnx_core::document_to_json).collect(),
        OperationResult::Record(record) => record.iter().map(gnx_core::document_to_json).collect(),
    }
}

/// Subset match: objects compare key by key over `expected`'s keys, numbers
/// compare numerically, everything else by equality.
fn json_matches(actual: &Json, expected: &Json) -> bool {
    match (actual, expected) {
        (Json::Object(actual), Json::Object(expected)) => expected.iter().all(|(key, want)| {
            actual
                .get(key)
                .is_some_and(|have| json_matches(have, want))
        }),
        (Json::Array(actual), Json::Array(expected)) => {
            actual.len() == expected.len()
                && actual.iter().zip(expected).all(|(a, e)| json_matches(a, e))
        }
        (Json::Number(a), Json::Number(e)) => match (a.as_f64(), e.as_f64()) {
            (Some(a), Some(e)) => (a - e).abs() < f64::EPSILON,
            _ => a == e,
        },
        _ => actual == expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_subset_match() {
        let actual = json!({ "id": "b1", "title": "Dune", "city": { "name": "Paris", "country": "FR" } });

        assert!(json_matches(&actual, &json!({ "title": "Dune" })));
        assert!(json_matches(&actual, &json!({ "city": { "name": "Paris" } })));
        assert!(!json_matches(&actual, &json!({ "title": "Emma" })));
        assert!(!json_matches(&actual, &json!({ "year": 1965 })));
    }

    #[test]
    fn test_numbers_compare_numerically() {
        assert!(json_matches(&json!({ "stars": 5.0 }), &json!({ "stars": 5 })));
    }
}
