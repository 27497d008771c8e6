//! Form submission registry.
//!
//! While rendering, a component can claim responsibility for a variable's
//! submitted value: either by extracting the variables itself
//! ([`SubmissionHandler`]) or by post-processing the raw value
//! ([`SubmissionPostProcessor`]). Claims live in the user's [`FormSession`]
//! and are applied when the form comes back.

use std::fmt::Debug;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Value};
use tracing::debug;

use crate::FormError;

/// Extracts process variables from the raw input submitted for one variable.
pub trait SubmissionHandler: Send + Sync + Debug {
    /// Returns the variables to store for `variable_name`. `user_input` is the
    /// complete submitted form so handlers can read companion fields.
    fn extract_variables(&self, variable_name: &str, user_input: &JsonMap<String, Value>) -> Result<JsonMap<String, Value>, FormError>;
}

/// Rewrites a submitted value before it is stored.
pub trait SubmissionPostProcessor: Send + Sync + Debug {
    fn post_process_value(&self, value: Value) -> Result<Value, FormError>;
}

/// Per-user state that outlives a single request.
#[derive(Debug, Default)]
pub struct FormSession {
    handlers: IndexMap<String, Arc<dyn SubmissionHandler>>,
    post_processors: IndexMap<String, Arc<dyn SubmissionPostProcessor>>,
}

impl FormSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `variable_name`, replacing any earlier claim.
    pub fn register_handler(&mut self, variable_name: impl Into<String>, handler: Arc<dyn SubmissionHandler>) {
        let variable_name = variable_name.into();
        debug!(variable = %variable_name, "registered submission handler");
        self.handlers.insert(variable_name, handler);
    }

    /// Registers `post_processor` for `variable_name`, replacing any earlier claim.
    pub fn register_post_processor(&mut self, variable_name: impl Into<String>, post_processor: Arc<dyn SubmissionPostProcessor>) {
        let variable_name = variable_name.into();
        debug!(variable = %variable_name, "registered submission post-processor");
        self.post_processors.insert(variable_name, post_processor);
    }

    pub fn handler(&self, variable_name: &str) -> Option<&Arc<dyn SubmissionHandler>> {
        self.handlers.get(variable_name)
    }

    pub fn post_processor(&self, variable_name: &str) -> Option<&Arc<dyn SubmissionPostProcessor>> {
        self.post_processors.get(variable_name)
    }

    /// Turns submitted form input into process variables.
    ///
    /// Fields claimed by a handler are replaced by whatever the handler
    /// extracts; every resulting value then passes through the post-processor
    /// registered for its name, if any. Unclaimed fields are kept as submitted.
    pub fn process_submission(&self, user_input: &JsonMap<String, Value>) -> Result<JsonMap<String, Value>, FormError> {
        let mut variables = JsonMap::new();
        for (field_name, value) in user_input {
            match self.handlers.get(field_name) {
                Some(handler) => variables.extend(handler.extract_variables(field_name, user_input)?),
                None => {
                    variables.insert(field_name.clone(), value.clone());
                }
            }
        }
        for (variable_name, value) in variables.iter_mut() {
            if let Some(post_processor) = self.post_processors.get(variable_name) {
                *value = post_processor.post_process_value(value.take())?;
            }
        }
        Ok(variables)
    }
}
