use thiserror::Error;

use wfe_types::ProcessId;

/// Failures raised while resolving parameters or rendering a form component.
///
/// None of these escape [`FormComponentRuntime::render`](crate::FormComponentRuntime::render);
/// they are turned into an inline error fragment there.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("Variable {name} is not defined or has no value")]
    MissingRequiredVariable { name: String },

    #[error("Unable to convert {value} to {target}")]
    TypeConversion { value: String, target: &'static str },

    #[error("Resource {path} not found")]
    ResourceNotFound { path: String },

    #[error("Process {process_id} not found")]
    ProcessNotFound { process_id: ProcessId },

    #[error("Form component requires an active request")]
    NoRequest,

    #[error("{0}")]
    Render(String),
}

impl FormError {
    pub(crate) fn conversion(value: &serde_json::Value, target: &'static str) -> Self {
        FormError::TypeConversion {
            value: value.to_string(),
            target,
        }
    }
}
