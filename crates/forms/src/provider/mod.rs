//! Variable provider facade.
//!
//! Modules:
//! - `memory`: In-memory process store used by the CLI and tests
//! - `null`: Provider with no process and no variables

mod memory;
mod null;

use std::fmt::Debug;
use std::sync::Arc;

pub use memory::{InMemoryVariableProvider, ProcessRecord, ProcessStore};
pub use null::NullVariableProvider;

use wfe_types::{ProcessId, ProcessVariable};

use crate::FormError;
use crate::convert::{FromVariableValue, convert_to};

/// Source of variable values for the process instance a form is rendered for.
///
/// Providers are owned by the caller and shared with the form runtime; the
/// runtime never constructs one, it only asks an existing provider for the
/// provider of another process through [`VariableProvider::same_provider`].
pub trait VariableProvider: Send + Sync + Debug {
    /// Looks up a variable by name. A declared variable with a `null` value is
    /// still returned.
    fn variable(&self, name: &str) -> Option<ProcessVariable>;

    /// Name of the process definition of the active process, when known.
    fn process_definition_name(&self) -> Option<String>;

    /// Identifier of the active process, when known.
    fn process_id(&self) -> Option<ProcessId>;

    /// Returns a provider of the same kind scoped to another process instance.
    fn same_provider(&self, process_id: ProcessId) -> Result<Arc<dyn VariableProvider>, FormError>;
}

/// Typed value access on top of [`VariableProvider`].
pub trait VariableProviderExt {
    /// Converted value of a variable, `None` when the variable is absent or `null`.
    fn get_value<T: FromVariableValue>(&self, name: &str) -> Result<Option<T>, FormError>;

    /// Converted value of a variable that must be present.
    fn get_value_not_null<T: FromVariableValue>(&self, name: &str) -> Result<T, FormError>;
}

impl<P: VariableProvider + ?Sized> VariableProviderExt for P {
    fn get_value<T: FromVariableValue>(&self, name: &str) -> Result<Option<T>, FormError> {
        let variable = self.variable(name);
        convert_to(variable.as_ref().map(|variable| &variable.value))
    }

    fn get_value_not_null<T: FromVariableValue>(&self, name: &str) -> Result<T, FormError> {
        self.get_value(name)?.ok_or_else(|| FormError::MissingRequiredVariable { name: name.to_string() })
    }
}
