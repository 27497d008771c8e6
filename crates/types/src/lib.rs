//! Shared type definitions for the WFE forms workspace.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod report;

/// Identifier of a process instance.
pub type ProcessId = i64;

/// Represents the user on whose behalf a form is being rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Actor identifier
    pub id: i64,
    /// Login name (e.g., "Administrator")
    pub name: String,
    /// Optional display name
    #[serde(default)]
    pub full_name: Option<String>,
}

impl User {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            full_name: None,
        }
    }

    /// Name suitable for display, preferring the full name when it is set.
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().filter(|name| !name.trim().is_empty()).unwrap_or(&self.name)
    }
}

/// A variable of a running process instance.
///
/// A variable may be declared on the process and still carry a `null` value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessVariable {
    /// Variable name as declared in the process definition
    pub name: String,
    /// Current value
    #[serde(default)]
    pub value: Value,
}

impl ProcessVariable {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self { name: name.into(), value }
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn display_name_falls_back_to_login() {
        let mut user = User::new(1, "admin");
        assert_eq!(user.display_name(), "admin");
        user.full_name = Some("  ".into());
        assert_eq!(user.display_name(), "admin");
        user.full_name = Some("Administrator".into());
        assert_eq!(user.display_name(), "Administrator");
    }

    #[test]
    fn process_variable_defaults_to_null_value() {
        let variable: ProcessVariable = serde_json::from_value(json!({"name": "amount"})).expect("deserialize");
        assert!(variable.is_null());
        assert_eq!(variable.name, "amount");
    }
}
