//! Conversion of unwrapped template values and process variable values into
//! the types requested by form components.
//!
//! `null` converts to `None` for every target type. Blank strings also convert
//! to `None` unless the target is a string.

use serde_json::Value;

use crate::FormError;

/// Types a template or variable value can be converted into.
pub trait FromVariableValue: Sized {
    /// Human-readable target name used in conversion errors.
    const TYPE_NAME: &'static str;

    /// Converts a non-null value.
    fn from_value(value: &Value) -> Result<Option<Self>, FormError>;
}

/// Converts an optional value into `T`, mapping absence and `null` to `None`.
pub fn convert_to<T: FromVariableValue>(value: Option<&Value>) -> Result<Option<T>, FormError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => T::from_value(value),
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

impl FromVariableValue for String {
    const TYPE_NAME: &'static str = "string";

    fn from_value(value: &Value) -> Result<Option<Self>, FormError> {
        Ok(Some(match value {
            Value::String(text) => text.clone(),
            Value::Null => return Ok(None),
            Value::Number(number) => number.to_string(),
            Value::Bool(flag) => flag.to_string(),
            other => other.to_string(),
        }))
    }
}

impl FromVariableValue for i64 {
    const TYPE_NAME: &'static str = "integer";

    fn from_value(value: &Value) -> Result<Option<Self>, FormError> {
        match value {
            Value::Number(number) => {
                if let Some(integer) = number.as_i64() {
                    return Ok(Some(integer));
                }
                if number.is_u64() {
                    return Err(FormError::conversion(value, Self::TYPE_NAME));
                }
                // 2^63 is exactly representable; anything at or above it overflows.
                match number.as_f64() {
                    Some(float) if float.fract() == 0.0 && float >= i64::MIN as f64 && float < i64::MAX as f64 => Ok(Some(float as i64)),
                    _ => Err(FormError::conversion(value, Self::TYPE_NAME)),
                }
            }
            Value::String(text) => match non_blank(text) {
                None => Ok(None),
                Some(trimmed) => trimmed
                    .parse::<i64>()
                    .map(Some)
                    .map_err(|_| FormError::conversion(value, Self::TYPE_NAME)),
            },
            _ => Err(FormError::conversion(value, Self::TYPE_NAME)),
        }
    }
}

impl FromVariableValue for i32 {
    const TYPE_NAME: &'static str = "32-bit integer";

    fn from_value(value: &Value) -> Result<Option<Self>, FormError> {
        match i64::from_value(value) {
            Ok(Some(integer)) => i32::try_from(integer)
                .map(Some)
                .map_err(|_| FormError::conversion(value, Self::TYPE_NAME)),
            Ok(None) => Ok(None),
            Err(_) => Err(FormError::conversion(value, Self::TYPE_NAME)),
        }
    }
}

impl FromVariableValue for u64 {
    const TYPE_NAME: &'static str = "unsigned integer";

    fn from_value(value: &Value) -> Result<Option<Self>, FormError> {
        if let Value::Number(number) = value
            && let Some(unsigned) = number.as_u64()
        {
            return Ok(Some(unsigned));
        }
        match i64::from_value(value) {
            Ok(Some(integer)) => u64::try_from(integer)
                .map(Some)
                .map_err(|_| FormError::conversion(value, Self::TYPE_NAME)),
            Ok(None) => Ok(None),
            Err(_) => Err(FormError::conversion(value, Self::TYPE_NAME)),
        }
    }
}

impl FromVariableValue for f64 {
    const TYPE_NAME: &'static str = "number";

    fn from_value(value: &Value) -> Result<Option<Self>, FormError> {
        match value {
            Value::Number(number) => number
                .as_f64()
                .map(Some)
                .ok_or_else(|| FormError::conversion(value, Self::TYPE_NAME)),
            Value::String(text) => match non_blank(text) {
                None => Ok(None),
                Some(trimmed) => trimmed
                    .parse::<f64>()
                    .map(Some)
                    .map_err(|_| FormError::conversion(value, Self::TYPE_NAME)),
            },
            _ => Err(FormError::conversion(value, Self::TYPE_NAME)),
        }
    }
}

impl FromVariableValue for bool {
    const TYPE_NAME: &'static str = "boolean";

    fn from_value(value: &Value) -> Result<Option<Self>, FormError> {
        match value {
            Value::Bool(flag) => Ok(Some(*flag)),
            Value::Number(number) => Ok(Some(number.as_f64().is_some_and(|float| float != 0.0))),
            Value::String(text) => match non_blank(text) {
                None => Ok(None),
                Some(trimmed) if trimmed.eq_ignore_ascii_case("true") => Ok(Some(true)),
                Some(trimmed) if trimmed.eq_ignore_ascii_case("false") => Ok(Some(false)),
                Some(_) => Err(FormError::conversion(value, Self::TYPE_NAME)),
            },
            _ => Err(FormError::conversion(value, Self::TYPE_NAME)),
        }
    }
}

impl FromVariableValue for Value {
    const TYPE_NAME: &'static str = "value";

    fn from_value(value: &Value) -> Result<Option<Self>, FormError> {
        Ok(Some(value.clone()))
    }
}

impl<T: FromVariableValue> FromVariableValue for Vec<T> {
    const TYPE_NAME: &'static str = "list";

    fn from_value(value: &Value) -> Result<Option<Self>, FormError> {
        let items = match value {
            Value::Array(items) => items.iter().map(|item| convert_to::<T>(Some(item))).collect::<Result<Vec<_>, _>>()?,
            single => vec![convert_to::<T>(Some(single))?],
        };
        Ok(Some(items.into_iter().flatten().collect()))
    }
}
