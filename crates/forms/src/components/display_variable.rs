use wfe_util::escape_html;

use crate::{FormComponent, FormError, RenderScope};

/// Shows the value of a process variable.
///
/// Arguments: `(variableName[, label])`. The variable must have a value. The
/// label is a rich combo parameter, so it may be a `value@` literal or the
/// name of another variable.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisplayVariable;

impl FormComponent for DisplayVariable {
    fn name(&self) -> &str {
        "DisplayVariable"
    }

    fn render_request(&self, scope: &mut RenderScope<'_>) -> Result<String, FormError> {
        let value: String = scope.required_variable_value(0)?;
        let label: Option<String> = scope.rich_combo_param(1)?;
        let html = match label {
            Some(label) => format!(
                "<span class=\"displayVariable\"><label>{}</label> {}</span>",
                escape_html(&label),
                escape_html(&value)
            ),
            None => format!("<span class=\"displayVariable\">{}</span>", escape_html(&value)),
        };
        Ok(html)
    }
}
