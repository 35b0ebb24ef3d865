//! Dotted-path navigation over documents.
//!
//! Paths use `.` as the segment separator. Lists encountered along the way
//! fan out: `tags.name` on `{tags: [{name: a}, {name: b}]}` resolves to both
//! `a` and `b`, the way document stores evaluate paths through arrays.

use crate::{Document, Value};

/// Join path segments with `.`, skipping empty segments.
pub fn join<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    segments
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

/// Resolve every value reachable from `doc` along `path`.
///
/// Missing fields contribute nothing; the result is empty when no branch of
/// the path resolves.
pub fn lookup<'a>(doc: &'a Document, path: &str) -> Vec<&'a Value> {
    let segments: Vec<&str> = path.split('.').collect();
    let mut found = Vec::new();
    if let Some((first, rest)) = segments.split_first() {
        if let Some(value) = doc.get(*first) {
            descend(value, rest, &mut found);
        }
    }
    found
}

fn descend<'a>(value: &'a Value, rest: &[&str], found: &mut Vec<&'a Value>) {
    let Some((head, tail)) = rest.split_first() else {
        found.push(value);
        return;
    };
    match value {
        Value::Object(doc) => {
            if let Some(next) = doc.get(*head) {
                descend(next, tail, found);
            }
        }
        Value::List(items) => {
            for item in items {
                descend(item, rest, found);
            }
        }
        _ => {}
    }
}

/// Equality test with document-store semantics: a stored list matches when it
/// equals the expected value or when any element does.
pub fn eq_matches(stored: &Value, expected: &Value) -> bool {
    if stored == expected {
        return true;
    }
    match stored {
        Value::List(items) => items.iter().any(|item| item == expected),
        _ => false,
    }
}

/// True when any value reachable along `path` equals `expected`.
///
/// A null expectation also matches when the path resolves to nothing.
pub fn path_matches(doc: &Document, path: &str, expected: &Value) -> bool {
    let candidates = lookup(doc, path);
    if candidates.is_empty() {
        return expected.is_null();
    }
    candidates.into_iter().any(|v| eq_matches(v, expected))
}
