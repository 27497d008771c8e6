use indexmap::IndexMap;
use serde_json::Value;

use wfe_util::escape_html;

use crate::provider::VariableProviderExt;
use crate::{FormComponent, FormError, RenderScope};

/// Group selector with a dependent user selector.
///
/// Arguments: `(groupsVariable, userVariable)`. `groupsVariable` holds a list
/// of `{ "id": .., "name": .. }` objects used for the group options. The user
/// options are loaded by the exported script once a group is chosen.
#[derive(Debug, Default, Clone, Copy)]
pub struct GroupMembers;

impl FormComponent for GroupMembers {
    fn name(&self) -> &str {
        "GroupMembers"
    }

    fn render_request(&self, scope: &mut RenderScope<'_>) -> Result<String, FormError> {
        let groups: Vec<Value> = scope.required_variable_value(0)?;
        let user_variable = scope
            .string_param(1)?
            .ok_or_else(|| FormError::Render("GroupMembers requires a user variable name".into()))?;
        let current_user: Option<String> = scope.variable_provider().get_value(&user_variable)?;

        let qualifier = selector_suffix(&user_variable);
        let group_selector = format!("groupSelector_{qualifier}");
        let user_selector = format!("userSelector_{qualifier}");

        let mut html = format!("<select id=\"{group_selector}\"><option value=\"\"></option>");
        for group in &groups {
            let (id, name) = option_fields(group);
            html.push_str(&format!("<option value=\"{}\">{}</option>", escape_html(&id), escape_html(&name)));
        }
        html.push_str("</select>");
        html.push_str(&format!("<select id=\"{user_selector}\" name=\"{}\">", escape_html(&user_variable)));
        if let Some(current_user) = current_user {
            let escaped = escape_html(&current_user);
            html.push_str(&format!("<option value=\"{escaped}\" selected=\"true\">{escaped}</option>"));
        }
        html.push_str("</select>");

        let mut substitutions = IndexMap::new();
        substitutions.insert("GROUP_SELECTOR".to_string(), group_selector);
        substitutions.insert("USER_SELECTOR".to_string(), user_selector);
        substitutions.insert("QUALIFIER".to_string(), qualifier);
        html.push_str(&scope.export_script(&substitutions, false));
        Ok(html)
    }
}

/// DOM-safe, collision-free id suffix: ASCII alphanumerics are kept, every
/// other character becomes `_<hex code point>_`.
fn selector_suffix(variable_name: &str) -> String {
    let mut suffix = String::with_capacity(variable_name.len());
    for character in variable_name.chars() {
        if character.is_ascii_alphanumeric() {
            suffix.push(character);
        } else {
            suffix.push_str(&format!("_{:x}_", u32::from(character)));
        }
    }
    suffix
}

fn option_fields(group: &Value) -> (String, String) {
    let text = |value: Option<&Value>| match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    match group {
        Value::Object(map) => {
            let id = text(map.get("id"));
            let name = map.get("name").map(|name| text(Some(name))).unwrap_or_else(|| id.clone());
            (id, name)
        }
        other => {
            let label = text(Some(other));
            (label.clone(), label)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::selector_suffix;

    #[test]
    fn distinct_variable_names_get_distinct_selectors() {
        assert_eq!(selector_suffix("manager"), "manager");
        assert_eq!(selector_suffix("a-b"), "a_2d_b");
        assert_eq!(selector_suffix("a_b"), "a_5f_b");
        assert_ne!(selector_suffix("имя"), selector_suffix("имю"));
        assert_ne!(selector_suffix("a_2d_b"), selector_suffix("a-b"));
    }
}
