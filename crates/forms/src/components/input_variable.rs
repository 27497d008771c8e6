use std::sync::Arc;

use serde_json::Value;

use wfe_util::escape_html;

use crate::submission::SubmissionPostProcessor;
use crate::{FormComponent, FormError, RenderScope};

/// Text input bound to a process variable.
///
/// Arguments: `(variableName)`. The input is prefilled with the variable's
/// current value when it has one. Inside a request the component also
/// registers itself to trim the submitted text.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputVariable;

impl FormComponent for InputVariable {
    fn name(&self) -> &str {
        "InputVariable"
    }

    fn render_request(&self, scope: &mut RenderScope<'_>) -> Result<String, FormError> {
        let variable_name = scope
            .string_param(0)?
            .ok_or_else(|| FormError::Render("InputVariable requires a variable name".into()))?;
        let value: String = scope.variable_value_or(0, String::new())?;
        if scope.request().is_some() {
            scope.register_variable_post_processor(&variable_name, Arc::new(*self))?;
        }
        Ok(format!(
            "<input type=\"text\" name=\"{}\" value=\"{}\" />",
            escape_html(&variable_name),
            escape_html(&value)
        ))
    }
}

impl SubmissionPostProcessor for InputVariable {
    fn post_process_value(&self, value: Value) -> Result<Value, FormError> {
        Ok(match value {
            Value::String(text) => Value::String(text.trim().to_string()),
            other => other,
        })
    }
}
