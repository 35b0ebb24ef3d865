//! In-memory pipeline evaluation.

use gnx_core::path::{lookup, path_matches};
use gnx_core::{Document, MatchMap, Pipeline, Stage, Value};

/// Evaluate `pipeline` over `rows`.
///
/// `collection` resolves the source records of Join stages. Paths are
/// evaluated the way document stores do: lists along a path fan out, and a
/// list field matches a value when any element does.
pub fn execute_pipeline<'c, F>(
    rows: Vec<Document>,
    pipeline: &Pipeline,
    collection: F,
) -> Vec<Document>
where
    F: Fn(&str) -> Vec<&'c Document>,
{
    let mut rows = rows;
    for stage in pipeline.stages() {
        rows = match stage {
            Stage::Join {
                from,
                local_field,
                foreign_field,
                alias,
            } => {
                let foreign = collection(from);
                rows.into_iter()
                    .map(|row| join_row(row, &foreign, local_field, foreign_field, alias))
                    .collect()
            }
            Stage::Flatten { alias } => rows
                .into_iter()
                .flat_map(|row| flatten_row(row, alias))
                .collect(),
            Stage::Match(matches) => rows.into_iter().filter(|row| matches_all(row, matches)).collect(),
            Stage::Skip(n) => rows.into_iter().skip(to_usize(*n)).collect(),
            Stage::Limit(n) => rows.into_iter().take(to_usize(*n)).collect(),
        };
    }
    rows
}

fn to_usize(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

/// Attach every foreign record whose `foreign_field` equals a value at
/// `local_field`. A row without local values joins nothing.
fn join_row(
    mut row: Document,
    foreign: &[&Document],
    local_field: &str,
    foreign_field: &str,
    alias: &str,
) -> Document {
    let locals: Vec<Value> = lookup(&row, local_field)
        .into_iter()
        .flat_map(|v| match v {
            Value::List(items) => items.clone(),
            other => vec![other.clone()],
        })
        .filter(|v| !v.is_null())
        .collect();

    let joined: Vec<Value> = foreign
        .iter()
        .filter(|doc| locals.iter().any(|local| path_matches(doc, foreign_field, local)))
        .map(|doc| Value::Object((*doc).clone()))
        .collect();

    row.insert(alias.to_string(), Value::List(joined));
    row
}

/// One row per element of the list under `alias`. Rows whose list is empty
/// or null keep their place without the field.
fn flatten_row(mut row: Document, alias: &str) -> Vec<Document> {
    match row.shift_remove(alias) {
        Some(Value::List(items)) if !items.is_empty() => items
            .into_iter()
            .map(|item| {
                let mut out = row.clone();
                out.insert(alias.to_string(), item);
                out
            })
            .collect(),
        Some(Value::List(_)) | Some(Value::Null) | None => vec![row],
        Some(other) => {
            row.insert(alias.to_string(), other);
            vec![row]
        }
    }
}

fn matches_all(row: &Document, matches: &MatchMap) -> bool {
    matches
        .iter()
        .all(|(path, values)| values.iter().all(|v| path_matches(row, path, v)))
}
