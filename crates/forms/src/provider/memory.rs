use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use wfe_types::{ProcessId, ProcessVariable};

use super::VariableProvider;
use crate::FormError;

/// Snapshot of a running process instance and its variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub id: ProcessId,
    pub definition_name: String,
    #[serde(default)]
    pub variables: IndexMap<String, Value>,
}

impl ProcessRecord {
    pub fn new(id: ProcessId, definition_name: impl Into<String>) -> Self {
        Self {
            id,
            definition_name: definition_name.into(),
            variables: IndexMap::new(),
        }
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: Value) -> Self {
        self.variables.insert(name.into(), value);
        self
    }
}

/// A set of process snapshots, keyed by process id.
///
/// Deserializes from `{"processes": [ ... ]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessStore {
    #[serde(default)]
    processes: Vec<ProcessRecord>,
}

impl ProcessStore {
    pub fn new(processes: Vec<ProcessRecord>) -> Self {
        Self { processes }
    }

    pub fn process(&self, process_id: ProcessId) -> Option<&ProcessRecord> {
        self.processes.iter().find(|record| record.id == process_id)
    }

    pub fn processes(&self) -> &[ProcessRecord] {
        &self.processes
    }
}

/// Provider backed by a shared [`ProcessStore`].
#[derive(Debug, Clone)]
pub struct InMemoryVariableProvider {
    store: Arc<ProcessStore>,
    process_id: ProcessId,
}

impl InMemoryVariableProvider {
    /// Creates a provider for `process_id`, failing if the store has no such process.
    pub fn new(store: Arc<ProcessStore>, process_id: ProcessId) -> Result<Self, FormError> {
        if store.process(process_id).is_none() {
            return Err(FormError::ProcessNotFound { process_id });
        }
        Ok(Self { store, process_id })
    }

    fn record(&self) -> Option<&ProcessRecord> {
        self.store.process(self.process_id)
    }
}

impl VariableProvider for InMemoryVariableProvider {
    fn variable(&self, name: &str) -> Option<ProcessVariable> {
        let value = self.record()?.variables.get(name)?;
        Some(ProcessVariable::new(name, value.clone()))
    }

    fn process_definition_name(&self) -> Option<String> {
        self.record().map(|record| record.definition_name.clone())
    }

    fn process_id(&self) -> Option<ProcessId> {
        Some(self.process_id)
    }

    fn same_provider(&self, process_id: ProcessId) -> Result<Arc<dyn VariableProvider>, FormError> {
        debug!(from = self.process_id, to = process_id, "switching variable provider to target process");
        Ok(Arc::new(InMemoryVariableProvider::new(self.store.clone(), process_id)?))
    }
}
