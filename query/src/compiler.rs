//! Filter compilation.

use crate::{FilterInput, FilterOperator, FilterTerm, FilterTree, QueryError, QueryResult};
use gnx_core::{path, MatchMap, Pipeline, RecordId, Stage, Value, ID_KEY};
use gnx_registry::{Cardinality, EntityType, FieldDef, FieldKind, Registry, ScalarKind};

/// The compiled form of a filter tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledFilter {
    /// Join/Flatten pairs in first-seen order.
    pub stages: Vec<Stage>,
    /// Every equality condition, keyed by field path.
    pub matches: MatchMap,
}

impl CompiledFilter {
    fn joined(&self) -> impl Iterator<Item = (&str, &str, &str, &str)> {
        self.stages.iter().filter_map(|s| match s {
            Stage::Join {
                from,
                local_field,
                foreign_field,
                alias,
            } => Some((
                from.as_str(),
                local_field.as_str(),
                foreign_field.as_str(),
                alias.as_str(),
            )),
            _ => None,
        })
    }

    /// Emit a Join plus its Flatten and return the alias it lands under.
    ///
    /// A join identical to an earlier one reuses that join's alias. An alias
    /// already taken by a different join gets a numeric suffix.
    fn push_join(
        &mut self,
        from: &str,
        local_field: String,
        foreign_field: &str,
        alias: String,
    ) -> String {
        if let Some((.., existing)) = self
            .joined()
            .find(|&(f, l, ff, _)| f == from && l == local_field && ff == foreign_field)
        {
            return existing.to_string();
        }

        let mut unique = alias.clone();
        let mut n = 2;
        while self.joined().any(|(.., a)| a == unique) {
            unique = format!("{}_{}", alias, n);
            n += 1;
        }
        if unique != alias {
            tracing::debug!(%alias, %unique, "join alias taken; renamed");
        }

        self.stages.push(Stage::Join {
            from: from.to_string(),
            local_field,
            foreign_field: foreign_field.to_string(),
            alias: unique.clone(),
        });
        self.stages.push(Stage::Flatten {
            alias: unique.clone(),
        });
        unique
    }

    /// The full pipeline: relation stages followed by one combined Match.
    pub fn into_pipeline(self) -> Pipeline {
        let mut stages = self.stages;
        if !self.matches.is_empty() {
            stages.push(Stage::Match(self.matches));
        }
        Pipeline::from_stages(stages)
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty() && self.matches.is_empty()
    }
}

/// Compiles filter trees against the schema graph.
pub struct FilterCompiler<'r> {
    registry: &'r Registry,
}

impl<'r> FilterCompiler<'r> {
    /// Create a new compiler.
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Compile `tree` for records of `entity`.
    ///
    /// An empty tree compiles to no stages and no matches.
    pub fn compile(&self, tree: &FilterTree, entity: &EntityType) -> QueryResult<CompiledFilter> {
        let mut out = CompiledFilter::default();

        for (name, input) in tree.iter() {
            let field = entity
                .get_field(name)
                .ok_or_else(|| QueryError::unknown_field(&entity.name, name))?;

            match (&field.kind, input) {
                (FieldKind::Scalar(kind), FilterInput::Scalar { operator, value }) => {
                    warn_if_not_eq(operator, name);
                    out.matches
                        .insert(entity.storage_key(name), coerce(*kind, value));
                }
                (FieldKind::Scalar(_), FilterInput::Relation { .. }) => {
                    return Err(QueryError::invalid_filter(format!(
                        "scalar field {} takes {{operator, value}}, not terms",
                        name
                    )));
                }
                (_, FilterInput::Relation { terms }) => {
                    self.compile_relation(field, terms, &mut out)?;
                }
                (_, FilterInput::Scalar { .. }) => {
                    return Err(QueryError::invalid_filter(format!(
                        "relation field {} takes terms, not a value",
                        name
                    )));
                }
            }
        }

        tracing::debug!(
            entity = %entity.name,
            stages = out.stages.len(),
            matches = %out.matches,
            "compiled filter"
        );
        Ok(out)
    }

    /// Compile the terms attached to a top-level relation field.
    fn compile_relation(
        &self,
        field: &FieldDef,
        terms: &[FilterTerm],
        out: &mut CompiledFilter,
    ) -> QueryResult<()> {
        let (target, join) = match &field.kind {
            FieldKind::Embedded { target, .. } => (target, None),
            FieldKind::Referenced {
                target,
                cardinality,
                connection_field,
            } => (target, Some((*cardinality, connection_field))),
            FieldKind::Scalar(_) => return Ok(()),
        };
        let target = self.registry.resolve(target)?;

        let alias = match join {
            Some((cardinality, connection_field)) => {
                let (local, foreign) = join_fields(cardinality, "", connection_field);
                out.push_join(collection_of(target)?, local, foreign, field.name.clone())
            }
            None => field.name.clone(),
        };

        for term in terms {
            self.compile_term(&alias, target, term, out)?;
        }
        Ok(())
    }

    /// Walk one term's path from the joined relation `alias`.
    ///
    /// Embedded segments accumulate into a pending embedded path without
    /// emitting stages. Each referenced segment flushes a Join/Flatten pair
    /// whose output alias becomes the new base. The first scalar segment
    /// ends the walk with a match condition.
    fn compile_term(
        &self,
        alias: &str,
        start: &'r EntityType,
        term: &FilterTerm,
        out: &mut CompiledFilter,
    ) -> QueryResult<()> {
        warn_if_not_eq(&term.operator, &term.path);

        let unresolved = |reason: &str| QueryError::unresolved_path(&start.name, &term.path, reason);

        let segments: Vec<&str> = term.path.split('.').collect();
        let mut entity = start;
        let mut alias_path = alias.to_string();
        let mut embedded: Vec<&str> = Vec::new();

        for (i, &segment) in segments.iter().enumerate() {
            if segment.is_empty() {
                return Err(unresolved("empty path segment"));
            }
            let field = entity.get_field(segment).ok_or_else(|| {
                unresolved(&format!("no field {} on type {}", segment, entity.name))
            })?;

            match &field.kind {
                FieldKind::Scalar(kind) => {
                    if i + 1 != segments.len() {
                        return Err(unresolved(&format!("{} is a scalar field", segment)));
                    }
                    let key = path::join(
                        std::iter::once(alias_path.as_str())
                            .chain(embedded.iter().copied())
                            .chain(std::iter::once(entity.storage_key(segment))),
                    );
                    out.matches.insert(key, coerce(*kind, &term.value));
                    return Ok(());
                }
                FieldKind::Embedded { target, .. } => {
                    embedded.push(segment);
                    entity = self.registry.resolve(target)?;
                }
                FieldKind::Referenced {
                    target,
                    cardinality,
                    connection_field,
                } => {
                    let current = path::join(
                        std::iter::once(alias_path.as_str()).chain(embedded.iter().copied()),
                    );
                    let next_alias = if embedded.is_empty() {
                        format!("{}_{}", alias_path, segment)
                    } else {
                        format!("{}_{}_{}", alias_path, embedded.join("_"), segment)
                    };
                    let target = self.registry.resolve(target)?;
                    let (local, foreign) = join_fields(*cardinality, &current, connection_field);
                    alias_path = out.push_join(collection_of(target)?, local, foreign, next_alias);
                    embedded.clear();
                    entity = target;
                }
            }
        }

        Err(unresolved("path does not end on a scalar field"))
    }
}

/// Local and foreign join fields for a referenced hop starting at `base`.
///
/// A list joins the target's connection field against the owner identifier;
/// a single reference joins the owner's connection field against the
/// target identifier.
fn join_fields<'a>(
    cardinality: Cardinality,
    base: &str,
    connection_field: &'a str,
) -> (String, &'a str) {
    match cardinality {
        Cardinality::Many => (path::join([base, ID_KEY]), connection_field),
        Cardinality::One => (path::join([base, connection_field]), ID_KEY),
    }
}

fn collection_of(entity: &EntityType) -> QueryResult<&str> {
    entity.collection().ok_or_else(|| {
        QueryError::unresolved_path(&entity.name, &entity.name, "type has no collection")
    })
}

/// Text compared against an identifier field is compared as an identifier;
/// integers compared against a float field are compared as floats.
fn coerce(kind: ScalarKind, value: &Value) -> Value {
    match (kind, value) {
        (ScalarKind::Id, Value::String(s)) => Value::Id(RecordId::new(s.clone())),
        (ScalarKind::Float, Value::Int(n)) => Value::Float(*n as f64),
        _ => value.clone(),
    }
}

fn warn_if_not_eq(operator: &FilterOperator, field: &str) {
    if !operator.is_eq() {
        tracing::warn!(%operator, field, "only equality filters are supported; treating as eq");
    }
}
