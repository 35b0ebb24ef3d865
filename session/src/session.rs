//! Session - serves root operations against one store.

use crate::output::present;
use crate::{
    build_operations, ListRequest, MutationOperation, MutationRequest, OperationKind,
    OperationResult, RootOperation, SessionConfig, SessionError, SessionResult,
};
use gnx_core::{Document, RecordId, Value, ID_KEY};
use gnx_mutation::MutationExecutor;
use gnx_query::{FilterCompiler, Pagination};
use gnx_registry::{EntityType, Registry};
use gnx_shape::{create_shape_name, derive_all, update_shape_name, InputShapes};
use gnx_storage::Store;
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::debug;

/// A GNX session.
///
/// Built once at startup: input shapes and root operations are derived from
/// the registry and never change afterward. Requests only read this state,
/// so one session serves any number of concurrent requests.
pub struct Session<'r, 's> {
    registry: &'r Registry,
    store: &'s dyn Store,
    shapes: InputShapes,
    operations: IndexMap<String, RootOperation>,
    config: SessionConfig,
}

impl<'r, 's> Session<'r, 's> {
    /// Create a session with the default configuration.
    pub fn new(registry: &'r Registry, store: &'s dyn Store) -> SessionResult<Self> {
        Self::with_config(registry, store, SessionConfig::default())
    }

    pub fn with_config(
        registry: &'r Registry,
        store: &'s dyn Store,
        config: SessionConfig,
    ) -> SessionResult<Self> {
        let shapes = derive_all(registry)?;
        let operations = build_operations(registry)?;
        debug!(
            types = registry.type_count(),
            shapes = shapes.len(),
            operations = operations.len(),
            "session ready"
        );
        Ok(Self {
            registry,
            store,
            shapes,
            operations,
            config,
        })
    }

    /// Get the registry.
    pub fn registry(&self) -> &Registry {
        self.registry
    }

    /// The derived input shapes.
    pub fn shapes(&self) -> &InputShapes {
        &self.shapes
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Every root operation, grouped by entity type.
    pub fn operations(&self) -> impl Iterator<Item = &RootOperation> {
        self.operations.values()
    }

    pub fn operation(&self, name: &str) -> Option<&RootOperation> {
        self.operations.get(name)
    }

    /// Execute a root operation by name.
    ///
    /// Arguments by kind: get and delete take `{id}`, list takes
    /// `{filters?, pagination?}`, add and update take `{input}`.
    #[tracing::instrument(skip(self, args))]
    pub async fn execute(&self, name: &str, args: serde_json::Value) -> SessionResult<OperationResult> {
        let op = self
            .operation(name)
            .ok_or_else(|| SessionError::UnknownOperation(name.to_string()))?;
        let entity = self.registry.resolve(&op.entity)?;

        match op.kind {
            OperationKind::Get => {
                let id = id_arg(&args)?;
                Ok(OperationResult::Record(self.get(&entity.name, &id).await?))
            }
            OperationKind::List => {
                let request = ListRequest::from_json(args)?;
                Ok(OperationResult::Records(self.list(&entity.name, &request).await?))
            }
            OperationKind::Create | OperationKind::Update => {
                let operation = if op.kind == OperationKind::Create {
                    MutationOperation::Create
                } else {
                    MutationOperation::Update
                };
                let request = MutationRequest::new(operation, &entity.name, input_arg(args)?);
                Ok(OperationResult::Record(Some(self.mutate(&request).await?)))
            }
            OperationKind::Delete => {
                let id = id_arg(&args)?;
                let request =
                    MutationRequest::new(MutationOperation::Delete, &entity.name, id_payload(entity, id));
                Ok(OperationResult::Record(Some(self.mutate(&request).await?)))
            }
        }
    }

    /// Point lookup. An absent record is `None`, not an error.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, entity: &str, id: &RecordId) -> SessionResult<Option<Document>> {
        let entity = self.registry.resolve(entity)?;
        let record = self.store.find_by_id(collection_of(entity)?, id).await?;
        Ok(record.map(|r| present(self.registry, entity, &r)))
    }

    /// Compile the request's filters, paginate and run the pipeline.
    ///
    /// Joins can yield one row per related record; rows are returned once,
    /// in pipeline order.
    #[tracing::instrument(skip(self, request))]
    pub async fn list(&self, entity: &str, request: &ListRequest) -> SessionResult<Vec<Document>> {
        let entity = self.registry.resolve(entity)?;
        let collection = collection_of(entity)?;

        let mut pipeline = FilterCompiler::new(self.registry)
            .compile(&request.filters, entity)?
            .into_pipeline();
        self.pagination_for(request.pagination)?.apply(&mut pipeline);

        let rows = self.store.execute_pipeline(collection, &pipeline).await?;
        let mut seen = HashSet::new();
        Ok(rows
            .into_iter()
            .filter(|row| match row.get(ID_KEY).and_then(Value::to_record_id) {
                Some(id) => seen.insert(id),
                None => true,
            })
            .map(|row| present(self.registry, entity, &row))
            .collect())
    }

    /// Validate and run a mutation. Returns the root record in schema form.
    #[tracing::instrument(skip(self, request), fields(entity = %request.entity_type, operation = ?request.operation))]
    pub async fn mutate(&self, request: &MutationRequest) -> SessionResult<Document> {
        let entity = self.registry.resolve(&request.entity_type)?;
        collection_of(entity)?;
        let executor = MutationExecutor::new(self.registry, self.store);

        let outcome = match request.operation {
            MutationOperation::Create => {
                self.check_payload(&create_shape_name(&entity.name), &request.payload)?;
                executor.create(&entity.name, &request.payload).await?
            }
            MutationOperation::Update => {
                self.check_payload(&update_shape_name(&entity.name), &request.payload)?;
                executor.update(&entity.name, &request.payload).await?
            }
            MutationOperation::Delete => {
                let id = entity
                    .identifier_field()
                    .and_then(|f| request.payload.get(&f.name))
                    .and_then(Value::to_record_id)
                    .ok_or_else(|| SessionError::invalid_request("delete requires the identifier"))?;
                executor.delete(&entity.name, &id).await?
            }
        };
        Ok(present(self.registry, entity, outcome.record()))
    }

    fn check_payload(&self, shape: &str, payload: &Document) -> SessionResult<()> {
        if self.config.validate_input {
            self.shapes.validate(shape, &Value::Object(payload.clone()))?;
        }
        Ok(())
    }

    /// Apply configured defaults and limits to a requested page.
    fn pagination_for(&self, requested: Option<Pagination>) -> SessionResult<Pagination> {
        let limits = self.config.pagination;
        let mut page = requested.unwrap_or_default();
        if let Some(default) = limits.default_page_size {
            page.size.get_or_insert(default);
            page.page.get_or_insert(1);
        }
        if let (Some(max), Some(size)) = (limits.max_page_size, page.size) {
            if size > max {
                return Err(SessionError::invalid_request(format!(
                    "page size {} exceeds the maximum of {}",
                    size, max
                )));
            }
        }
        Ok(page)
    }
}

fn collection_of(entity: &EntityType) -> SessionResult<&str> {
    entity
        .collection()
        .ok_or_else(|| SessionError::invalid_request(format!("{} has no endpoint", entity.name)))
}

fn id_arg(args: &serde_json::Value) -> SessionResult<RecordId> {
    match args.get("id") {
        Some(serde_json::Value::String(id)) => Ok(RecordId::new(id.as_str())),
        _ => Err(SessionError::invalid_request("expected {\"id\": <string>}")),
    }
}

fn input_arg(args: serde_json::Value) -> SessionResult<Document> {
    let serde_json::Value::Object(mut map) = args else {
        return Err(SessionError::invalid_request("expected {\"input\": {...}}"));
    };
    map.remove("input")
        .and_then(gnx_core::document_from_json)
        .ok_or_else(|| SessionError::invalid_request("input must be an object"))
}

fn id_payload(entity: &EntityType, id: RecordId) -> Document {
    let key = entity.identifier_field().map_or("id", |f| f.name.as_str());
    let mut payload = Document::new();
    payload.insert(key.to_string(), Value::Id(id));
    payload
}
