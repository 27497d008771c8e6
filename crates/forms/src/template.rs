//! Template call arguments.
//!
//! A form component is invoked from a template with positional arguments.
//! Each argument is an engine-native boxed value that the runtime only ever
//! unwraps into a plain [`serde_json::Value`] before type conversion.

use std::fmt::Debug;

use serde::Serialize;
use serde_json::Value;

use crate::FormError;

/// An argument passed to a form component from a template.
pub trait TemplateValue: Debug {
    /// Unwraps the engine value into its native representation.
    fn unwrap(&self) -> Result<Value, FormError>;
}

/// Ordered template call arguments.
pub type Arguments = Vec<Box<dyn TemplateValue>>;

impl TemplateValue for String {
    fn unwrap(&self) -> Result<Value, FormError> {
        Ok(Value::String(self.clone()))
    }
}

impl TemplateValue for &'static str {
    fn unwrap(&self) -> Result<Value, FormError> {
        Ok(Value::String((*self).to_string()))
    }
}

impl TemplateValue for i64 {
    fn unwrap(&self) -> Result<Value, FormError> {
        Ok(Value::from(*self))
    }
}

impl TemplateValue for f64 {
    fn unwrap(&self) -> Result<Value, FormError> {
        serde_json::Number::from_f64(*self)
            .map(Value::Number)
            .ok_or_else(|| FormError::Render(format!("template number {self} is not finite")))
    }
}

impl TemplateValue for bool {
    fn unwrap(&self) -> Result<Value, FormError> {
        Ok(Value::Bool(*self))
    }
}

impl TemplateValue for Value {
    fn unwrap(&self) -> Result<Value, FormError> {
        Ok(self.clone())
    }
}

/// Wraps an arbitrary serializable object passed through the template.
#[derive(Debug, Clone)]
pub struct Wrapped<T>(pub T);

impl<T: Serialize + Debug> TemplateValue for Wrapped<T> {
    fn unwrap(&self) -> Result<Value, FormError> {
        serde_json::to_value(&self.0).map_err(|error| FormError::Render(format!("unable to unwrap template value: {error}")))
    }
}

/// Builds an argument list from template values of mixed types.
///
/// ```rust
/// let arguments = wfe_forms::arguments!["amount", 42_i64, true];
/// assert_eq!(arguments.len(), 3);
/// ```
#[macro_export]
macro_rules! arguments {
    ($($value:expr),* $(,)?) => {
        {
            let arguments: $crate::Arguments = vec![$(Box::new($value) as Box<dyn $crate::TemplateValue>),*];
            arguments
        }
    };
}

/// Converts a JSON array into template arguments, one per element.
pub fn arguments_from_json(values: Vec<Value>) -> Arguments {
    values.into_iter().map(|value| Box::new(value) as Box<dyn TemplateValue>).collect()
}
