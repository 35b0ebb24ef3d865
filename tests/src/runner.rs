//! Scenario runner.

use gnx_registry::{Registry, RegistryResult};
use gnx_session::{Session, SessionConfig};
use gnx_storage::MemoryStore;
use serde_json::Value as Json;

use crate::assertion::{Assertion, AssertionBuilder};
use crate::error::{ScenarioError, ScenarioResult};

/// One root operation and what its result must look like.
#[derive(Debug)]
pub struct Step {
    pub name: String,
    pub operation: String,
    pub args: Json,
    pub assertion: Assertion,
}

/// A named sequence of steps run against one schema and a fresh store.
pub struct Scenario {
    name: String,
    schema: fn() -> RegistryResult<Registry>,
    config: SessionConfig,
    store: MemoryStore,
    steps: Vec<Step>,
}

impl Scenario {
    /// Create a scenario over the schema `schema` builds.
    pub fn new(name: impl Into<String>, schema: fn() -> RegistryResult<Registry>) -> Self {
        Self {
            name: name.into(),
            schema,
            config: SessionConfig::default(),
            store: MemoryStore::new(),
            steps: Vec::new(),
        }
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Run against `store` instead of an empty one.
    pub fn store(mut self, store: MemoryStore) -> Self {
        self.store = store;
        self
    }

    /// Add a step.
    pub fn step<F>(mut self, name: &str, operation: &str, args: Json, assert: F) -> Self
    where
        F: FnOnce(AssertionBuilder) -> AssertionBuilder,
    {
        self.steps.push(Step {
            name: name.to_string(),
            operation: operation.to_string(),
            args,
            assertion: assert(AssertionBuilder::new()).build(),
        });
        self
    }

    /// The store the scenario writes to. Clones share data.
    pub fn store_handle(&self) -> MemoryStore {
        self.store.clone()
    }

    /// Run every step in order, stopping at the first failed assertion.
    pub async fn run(&self) -> ScenarioResult<()> {
        // 1. Build the schema
        let registry = (self.schema)().map_err(|e| ScenarioError::setup(&self.name, e.to_string()))?;

        // 2. Create a session
        let session = Session::with_config(&registry, &self.store, self.config.clone())
            .map_err(|e| ScenarioError::setup(&self.name, e.to_string()))?;

        // 3. Execute each step
        for step in &self.steps {
            let result = session.execute(&step.operation, step.args.clone()).await;
            step.assertion.verify(&step.name, &result)?;
        }
        Ok(())
    }
}
