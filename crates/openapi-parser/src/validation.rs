//! Error accumulation and validation hooks.

use crate::context::Context;
use crate::error::{ErrorCollection, ValidationError, ValidationErrorKind};
use crate::raw::RawValue;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// Keys matching this pattern are extension fields.
pub static EXTENSION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^x-").expect("valid extension pattern"));

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern")
});

static COMPONENT_KEY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9.\-_]+$").expect("valid component key pattern"));

pub fn is_extension(key: &str) -> bool {
    EXTENSION_PATTERN.is_match(key)
}

/// Errors collected while evaluating one container.
///
/// Created fresh for every evaluation, and the only channel checks and
/// hooks report through.
#[derive(Debug, Clone)]
pub struct Validatable {
    context: Context,
    errors: ErrorCollection,
}

impl Validatable {
    pub fn new(context: Context) -> Self {
        Self {
            context,
            errors: ErrorCollection::new(),
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The value being validated (the default when one was applied).
    pub fn input(&self) -> Option<&RawValue> {
        self.context.input()
    }

    /// A field of the input mapping.
    pub fn field(&self, key: &str) -> Option<&RawValue> {
        self.input()?.as_map()?.get(key)
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Add an error located at this container.
    pub fn add_error(&mut self, kind: ValidationErrorKind) {
        let error = self.context.error(kind);
        self.push(error);
    }

    pub fn add_error_at(&mut self, context: &Context, kind: ValidationErrorKind) {
        self.push(context.error(kind));
    }

    pub fn add_errors(&mut self, errors: &ErrorCollection) {
        self.errors.merge(errors);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &ErrorCollection {
        &self.errors
    }

    pub fn into_errors(self) -> ErrorCollection {
        self.errors
    }
}

/// Built-in checks referred to by name in declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedRule {
    /// A string that parses as an absolute URL
    Url,
    /// A string shaped like an e-mail address
    Email,
    /// Every key of the mapping is a valid component name
    ComponentKeys,
}

/// A check run after the built-in type checks.
#[derive(Clone)]
pub enum ValidationHook {
    Named(NamedRule),
    Custom(Arc<dyn Fn(&mut Validatable) + Send + Sync>),
}

impl ValidationHook {
    pub fn custom(hook: impl Fn(&mut Validatable) + Send + Sync + 'static) -> Self {
        ValidationHook::Custom(Arc::new(hook))
    }

    pub fn run(&self, validatable: &mut Validatable) {
        match self {
            ValidationHook::Named(rule) => rule.run(validatable),
            ValidationHook::Custom(hook) => hook(validatable),
        }
    }
}

impl fmt::Debug for ValidationHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationHook::Named(rule) => f.debug_tuple("Named").field(rule).finish(),
            ValidationHook::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<NamedRule> for ValidationHook {
    fn from(rule: NamedRule) -> Self {
        ValidationHook::Named(rule)
    }
}

impl NamedRule {
    fn run(self, validatable: &mut Validatable) {
        match self {
            NamedRule::Url => {
                if let Some(value) = validatable.input().and_then(RawValue::as_str)
                    && url::Url::parse(value).is_err()
                {
                    validatable.add_error(ValidationErrorKind::custom("Expected a valid URL"));
                }
            }
            NamedRule::Email => {
                if let Some(value) = validatable.input().and_then(RawValue::as_str)
                    && !EMAIL_PATTERN.is_match(value)
                {
                    validatable.add_error(ValidationErrorKind::custom("Expected a valid email address"));
                }
            }
            NamedRule::ComponentKeys => {
                let invalid: Vec<String> = validatable
                    .input()
                    .and_then(RawValue::as_map)
                    .map(|map| {
                        map.keys()
                            .filter(|key| !COMPONENT_KEY_PATTERN.is_match(key))
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();
                for key in invalid {
                    let context = validatable.context().next_field(&key);
                    validatable.add_error_at(
                        &context,
                        ValidationErrorKind::custom(format!(
                            "Invalid component key {}. Keys must match {}",
                            key,
                            COMPONENT_KEY_PATTERN.as_str()
                        )),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validatable(value: serde_json::Value) -> Validatable {
        Validatable::new(Context::detached(Some(RawValue::from_json(&value))))
    }

    #[test]
    fn test_extension_pattern() {
        assert!(is_extension("x-internal"));
        assert!(!is_extension("title"));
        assert!(!is_extension("X-upper"));
    }

    #[test]
    fn test_url_rule() {
        let mut valid = validatable(json!("https://example.com/path"));
        ValidationHook::from(NamedRule::Url).run(&mut valid);
        assert!(!valid.has_errors());

        let mut invalid = validatable(json!("not a url"));
        ValidationHook::from(NamedRule::Url).run(&mut invalid);
        assert_eq!(invalid.errors().len(), 1);
        assert_eq!(invalid.errors().first().unwrap().message(), "Expected a valid URL");
    }

    #[test]
    fn test_email_rule() {
        let mut valid = validatable(json!("api@example.com"));
        NamedRule::Email.run(&mut valid);
        assert!(!valid.has_errors());

        let mut invalid = validatable(json!("example.com"));
        NamedRule::Email.run(&mut invalid);
        assert!(invalid.has_errors());
    }

    #[test]
    fn test_component_keys_rule_reports_each_key() {
        let mut v = validatable(json!({"Pet": {}, "bad key": {}, "ok.name-1_2": {}, "no/slash": {}}));
        NamedRule::ComponentKeys.run(&mut v);
        let locations: Vec<&str> = v.errors().iter().map(|e| e.location()).collect();
        assert_eq!(locations, vec!["#/bad+key", "#/no%2Fslash"]);
    }

    #[test]
    fn test_custom_hook_sees_fields() {
        let hook = ValidationHook::custom(|v: &mut Validatable| {
            if v.field("min").and_then(RawValue::as_i64) > v.field("max").and_then(RawValue::as_i64) {
                v.add_error(ValidationErrorKind::custom("min must not exceed max"));
            }
        });
        let mut v = validatable(json!({"min": 5, "max": 1}));
        hook.run(&mut v);
        assert_eq!(v.errors().len(), 1);
        assert_eq!(v.errors().first().unwrap().location(), "#/");
    }
}
