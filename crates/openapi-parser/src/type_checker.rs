//! Shape checks for values and mapping keys.
//!
//! Every check passes for an absent value; absence is handled by the
//! factories' required/default rules.

use crate::context::Context;
use crate::error::{Error, Result, ValidationError, ValidationErrorKind};
use crate::raw::RawValue;
use crate::validation::Validatable;
use std::fmt;

/// Expected shape of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Map,
    Array,
    String,
    Integer,
    Number,
    Boolean,
}

impl ValueType {
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Map => "Object",
            ValueType::Array => "Array",
            ValueType::String => "String",
            ValueType::Integer => "Integer",
            ValueType::Number => "Number",
            ValueType::Boolean => "Boolean",
        }
    }

    pub fn is_container(self) -> bool {
        matches!(self, ValueType::Map | ValueType::Array)
    }

    pub fn matches(self, value: &RawValue) -> bool {
        match self {
            ValueType::Map => matches!(value, RawValue::Map(_)),
            ValueType::Array => matches!(value, RawValue::Array(_)),
            ValueType::String => matches!(value, RawValue::String(_)),
            ValueType::Integer => matches!(value, RawValue::Integer(_)),
            ValueType::Number => matches!(value, RawValue::Integer(_) | RawValue::Float(_)),
            ValueType::Boolean => matches!(value, RawValue::Bool(_)),
        }
    }

    /// Whether a key's canonical text reads as this type.
    pub fn matches_key(self, key: &str) -> bool {
        match self {
            ValueType::String => true,
            ValueType::Integer => key.parse::<i64>().is_ok(),
            ValueType::Number => key.parse::<f64>().is_ok(),
            ValueType::Boolean => matches!(key, "true" | "false"),
            ValueType::Map | ValueType::Array => false,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The error for a value of the wrong shape, if it is one.
fn type_error(context: &Context, expected: ValueType) -> Option<ValidationError> {
    let value = context.input()?;
    if expected.matches(value) {
        return None;
    }
    let expected_name = expected.name().to_string();
    let got = value.type_name().to_string();
    let kind = if expected.is_container() {
        ValidationErrorKind::ShapeMismatch {
            expected: expected_name,
            got,
        }
    } else {
        ValidationErrorKind::ValueType {
            expected: expected_name,
            got,
        }
    };
    Some(context.error(kind))
}

fn key_error(context: &Context, expected: ValueType) -> Option<ValidationError> {
    let map = context.input()?.as_map()?;
    let keys: Vec<String> = map
        .keys()
        .filter(|key| !expected.matches_key(key))
        .map(str::to_string)
        .collect();
    if keys.is_empty() {
        return None;
    }
    Some(context.error(ValidationErrorKind::KeyType {
        expected: expected.name().to_string(),
        keys,
    }))
}

/// Record an error when the input at `context` is not of `expected` type.
///
/// Returns whether the value passed.
pub fn validate_type(validatable: &mut Validatable, context: &Context, expected: ValueType) -> bool {
    match type_error(context, expected) {
        Some(error) => {
            validatable.push(error);
            false
        }
        None => true,
    }
}

/// Fail when the input at `context` is not of `expected` type.
pub fn raise_on_invalid_type(context: &Context, expected: ValueType) -> Result<()> {
    match type_error(context, expected) {
        Some(error) => Err(Error::invalid_data(&error)),
        None => Ok(()),
    }
}

/// Record one error listing every key of the mapping at `context` that is
/// not of `expected` type.
pub fn validate_keys(validatable: &mut Validatable, context: &Context, expected: ValueType) -> bool {
    match key_error(context, expected) {
        Some(error) => {
            validatable.push(error);
            false
        }
        None => true,
    }
}

pub fn raise_on_invalid_keys(context: &Context, expected: ValueType) -> Result<()> {
    match key_error(context, expected) {
        Some(error) => Err(Error::invalid_data(&error)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context(value: serde_json::Value) -> Context {
        Context::detached(Some(RawValue::from_json(&value)))
    }

    #[test]
    fn test_absent_always_passes() {
        let context = Context::detached(None);
        let mut validatable = Validatable::new(context.clone());
        for expected in [ValueType::Map, ValueType::String, ValueType::Boolean] {
            assert!(validate_type(&mut validatable, &context, expected));
            assert!(raise_on_invalid_type(&context, expected).is_ok());
        }
        assert!(validate_keys(&mut validatable, &context, ValueType::Integer));
        assert!(!validatable.has_errors());
    }

    #[test]
    fn test_container_mismatch_is_shape_error() {
        let context = context(json!("text"));
        let mut validatable = Validatable::new(context.clone());
        assert!(!validate_type(&mut validatable, &context, ValueType::Map));
        let error = validatable.errors().first().unwrap();
        assert_eq!(error.error_code(), "OA-1-10");
        assert_eq!(error.message(), "Invalid type. Expected Object, got string");
        assert_eq!(error.location(), "#/");
    }

    #[test]
    fn test_scalar_mismatch_raises() {
        let context = context(json!({"title": 3})).next_field("title");
        let err = raise_on_invalid_type(&context, ValueType::String).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid data for #/title. Invalid type. Expected String, got integer"
        );
    }

    #[test]
    fn test_number_accepts_integers() {
        let context = context(json!(3));
        assert!(raise_on_invalid_type(&context, ValueType::Number).is_ok());
        assert!(raise_on_invalid_type(&context, ValueType::Integer).is_ok());
        assert!(raise_on_invalid_type(&context, ValueType::Boolean).is_err());
    }

    #[test]
    fn test_keys_checked_on_canonical_text() {
        let context = context(json!({"200": "ok", "404": "missing", "default": "x"}));
        let mut validatable = Validatable::new(context.clone());
        assert!(!validate_keys(&mut validatable, &context, ValueType::Integer));
        assert_eq!(
            validatable.errors().first().unwrap().kind,
            ValidationErrorKind::KeyType {
                expected: "Integer".to_string(),
                keys: vec!["default".to_string()],
            }
        );
        assert!(raise_on_invalid_keys(&context, ValueType::String).is_ok());
    }
}
