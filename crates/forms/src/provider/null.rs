use std::sync::Arc;

use wfe_types::{ProcessId, ProcessVariable};

use super::VariableProvider;
use crate::FormError;

#[derive(Debug, Default, Clone, Copy)]
pub struct NullVariableProvider;

impl VariableProvider for NullVariableProvider {
    fn variable(&self, _name: &str) -> Option<ProcessVariable> {
        None
    }

    fn process_definition_name(&self) -> Option<String> {
        None
    }

    fn process_id(&self) -> Option<ProcessId> {
        None
    }

    fn same_provider(&self, process_id: ProcessId) -> Result<Arc<dyn VariableProvider>, FormError> {
        Err(FormError::ProcessNotFound { process_id })
    }
}
