//! Report definitions and the administration edit model used when a report
//! is deployed or reconfigured.
//!
//! The edit model is what the administration screen binds to. It is built
//! from a stored [`ReportDefinition`] and copied back onto one when the
//! administrator saves.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// How report parameters are configured and the report is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportConfigurationType {
    /// Parameters are bound directly into the report query.
    #[default]
    RawSqlParameters,
    /// Parameters are filled by a builder class shipped in an attached JAR.
    ParameterBuilder,
}

/// Type of value the user is asked for when building a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportParameterType {
    String,
    Number,
    Date,
    Boolean,
    ProcessNameOrNull,
    Swimlane,
}

/// Stored report parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportParameter {
    /// Name shown to the user
    pub user_name: String,
    /// Name used inside the compiled report
    pub inner_name: String,
    pub position: u32,
    pub r#type: ReportParameterType,
    #[serde(default)]
    pub required: bool,
}

/// Stored report definition.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportDefinition {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub parameters: Option<Vec<ReportParameter>>,
    #[serde(default)]
    pub compiled_report: Option<Vec<u8>>,
    #[serde(default)]
    pub config_type: ReportConfigurationType,
    #[serde(default)]
    pub jar_file: Option<Vec<u8>>,
    #[serde(default)]
    pub parameter_builder_class_name: Option<String>,
}

/// Editable view of a single report parameter.
///
/// `r#type` is optional because the administration form submits blank rows
/// that carry no type; those rows are dropped with
/// [`ReportAdminEditModel::remove_entries_without_type`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportAdminParameterEditModel {
    pub name: String,
    pub inner_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub position: u32,
    #[serde(default)]
    pub r#type: Option<ReportParameterType>,
    #[serde(default)]
    pub required: bool,
}

impl ReportAdminParameterEditModel {
    pub fn from_parameter(parameter: &ReportParameter, description: Option<String>) -> Self {
        Self {
            name: parameter.user_name.clone(),
            inner_name: parameter.inner_name.clone(),
            description,
            position: parameter.position,
            r#type: Some(parameter.r#type),
            required: parameter.required,
        }
    }

    /// Converts back into a stored parameter. Returns `None` for rows without a type.
    pub fn to_parameter(&self) -> Option<ReportParameter> {
        Some(ReportParameter {
            user_name: self.name.clone(),
            inner_name: self.inner_name.clone(),
            position: self.position,
            r#type: self.r#type?,
            required: self.required,
        })
    }
}

/// Model for editing report settings on deployment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportAdminEditModel {
    #[serde(default)]
    pub id: Option<i64>,
    /// Report name shown to users.
    pub name: String,
    /// Parameters the user is asked for before the report is built.
    #[serde(default)]
    pub parameters: Vec<ReportAdminParameterEditModel>,
    /// Compiled report payload.
    #[serde(default)]
    pub compiled_report: Option<Vec<u8>>,
    #[serde(default)]
    pub config_type: ReportConfigurationType,
    /// JAR payload used by [`ReportConfigurationType::ParameterBuilder`] reports.
    #[serde(default)]
    pub jar_file: Option<Vec<u8>>,
    /// Builder class inside `jar_file` that fills the report parameters.
    #[serde(default)]
    pub parameter_builder_class_name: Option<String>,
}

impl ReportAdminEditModel {
    /// Builds the edit model from a stored definition. Parameter descriptions
    /// are looked up by the parameter's inner name.
    pub fn from_definition(definition: &ReportDefinition, descriptions: &IndexMap<String, String>) -> Self {
        let parameters = definition
            .parameters
            .iter()
            .flatten()
            .map(|parameter| {
                let description = descriptions.get(&parameter.inner_name).cloned();
                ReportAdminParameterEditModel::from_parameter(parameter, description)
            })
            .collect();
        Self {
            id: definition.id,
            name: definition.name.clone(),
            parameters,
            compiled_report: definition.compiled_report.clone(),
            config_type: definition.config_type,
            jar_file: definition.jar_file.clone(),
            parameter_builder_class_name: definition.parameter_builder_class_name.clone(),
        }
    }

    /// Updates the stored definition with the values entered by the administrator.
    ///
    /// The parameter list of the definition is replaced, never merged. The
    /// definition's `id` is left untouched.
    pub fn copy_to_definition(&self, definition: &mut ReportDefinition) {
        definition.name = self.name.clone();
        definition.config_type = self.config_type;
        definition.parameter_builder_class_name = self.parameter_builder_class_name.clone();
        definition.compiled_report = self.compiled_report.clone();
        definition.jar_file = self.jar_file.clone();
        let parameters = definition.parameters.get_or_insert_with(Vec::new);
        parameters.clear();
        parameters.extend(self.parameters.iter().filter_map(ReportAdminParameterEditModel::to_parameter));
    }

    /// Removes blank parameter rows.
    pub fn remove_entries_without_type(&mut self) {
        self.parameters.retain(|parameter| parameter.r#type.is_some());
    }

    pub fn has_compiled_report(&self) -> bool {
        self.compiled_report.as_ref().is_some_and(|payload| !payload.is_empty())
    }

    pub fn has_jar_file(&self) -> bool {
        self.jar_file.as_ref().is_some_and(|payload| !payload.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_parameter(inner_name: &str, position: u32) -> ReportParameter {
        ReportParameter {
            user_name: format!("{inner_name} label"),
            inner_name: inner_name.into(),
            position,
            r#type: ReportParameterType::Date,
            required: true,
        }
    }

    fn stored_definition() -> ReportDefinition {
        ReportDefinition {
            id: Some(7),
            name: "Overdue tasks".into(),
            parameters: Some(vec![stored_parameter("startDate", 0), stored_parameter("endDate", 1)]),
            compiled_report: Some(vec![1, 2, 3]),
            config_type: ReportConfigurationType::ParameterBuilder,
            jar_file: Some(Vec::new()),
            parameter_builder_class_name: Some("ru.example.Builder".into()),
        }
    }

    #[test]
    fn from_definition_attaches_descriptions_by_inner_name() {
        let mut descriptions = IndexMap::new();
        descriptions.insert("endDate".to_string(), "Last day of the period".to_string());

        let model = ReportAdminEditModel::from_definition(&stored_definition(), &descriptions);

        assert_eq!(model.id, Some(7));
        assert_eq!(model.parameters.len(), 2);
        assert_eq!(model.parameters[0].description, None);
        assert_eq!(model.parameters[1].description.as_deref(), Some("Last day of the period"));
        assert_eq!(model.parameters[1].name, "endDate label");
        assert!(model.has_compiled_report());
        assert!(!model.has_jar_file());
    }

    #[test]
    fn from_definition_without_parameters_yields_empty_list() {
        let definition = ReportDefinition {
            name: "Empty".into(),
            ..ReportDefinition::default()
        };
        let model = ReportAdminEditModel::from_definition(&definition, &IndexMap::new());
        assert!(model.parameters.is_empty());
        assert!(!model.has_compiled_report());
    }

    #[test]
    fn copy_to_definition_replaces_parameters_and_keeps_id() {
        let mut model = ReportAdminEditModel::from_definition(&stored_definition(), &IndexMap::new());
        model.name = "Renamed".into();
        model.parameters.remove(0);
        model.parameters[0].position = 0;

        let mut definition = stored_definition();
        definition.id = Some(99);
        model.copy_to_definition(&mut definition);

        assert_eq!(definition.id, Some(99));
        assert_eq!(definition.name, "Renamed");
        let parameters = definition.parameters.expect("parameters");
        assert_eq!(parameters.len(), 1);
        assert_eq!(parameters[0].inner_name, "endDate");
        assert_eq!(parameters[0].position, 0);
    }

    #[test]
    fn copy_to_definition_creates_missing_parameter_list() {
        let model = ReportAdminEditModel {
            name: "New".into(),
            parameters: vec![ReportAdminParameterEditModel {
                name: "Year".into(),
                inner_name: "year".into(),
                r#type: Some(ReportParameterType::Number),
                ..ReportAdminParameterEditModel::default()
            }],
            ..ReportAdminEditModel::default()
        };
        let mut definition = ReportDefinition::default();
        model.copy_to_definition(&mut definition);
        assert_eq!(definition.parameters.map(|p| p.len()), Some(1));
    }

    #[test]
    fn remove_entries_without_type_drops_blank_rows() {
        let mut model = ReportAdminEditModel {
            parameters: vec![
                ReportAdminParameterEditModel {
                    inner_name: "kept".into(),
                    r#type: Some(ReportParameterType::String),
                    ..ReportAdminParameterEditModel::default()
                },
                ReportAdminParameterEditModel::default(),
            ],
            ..ReportAdminEditModel::default()
        };
        model.remove_entries_without_type();
        assert_eq!(model.parameters.len(), 1);
        assert_eq!(model.parameters[0].inner_name, "kept");
    }

    #[test]
    fn config_type_uses_screaming_snake_case() {
        let encoded = serde_json::to_string(&ReportConfigurationType::ParameterBuilder).expect("serialize");
        assert_eq!(encoded, "\"PARAMETER_BUILDER\"");
    }
}
