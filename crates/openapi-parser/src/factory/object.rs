//! Factory for mappings with a declared set of fields.

use super::{FactoryFn, Field, NodeFactory};
use crate::context::Context;
use crate::error::{Error, ErrorCollection, Result, ValidationErrorKind};
use crate::node::{Node, Value};
use crate::raw::RawValue;
use crate::type_checker::{ValueType, raise_on_invalid_type, validate_type};
use crate::validation::{Validatable, ValidationHook, is_extension};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::trace;

/// One declared field.
pub struct FieldConfig {
    pub name: String,
    pub required: bool,
    /// Expected type when the field has no factory
    pub input_type: Option<ValueType>,
    pub factory: Option<FactoryFn>,
    /// Placed in the node when the field is absent
    pub default: Option<RawValue>,
    /// Run on the field's value once its type checks out
    pub validate: Option<ValidationHook>,
}

impl FieldConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            input_type: None,
            factory: None,
            default: None,
            validate: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn input_type(mut self, input_type: ValueType) -> Self {
        self.input_type = Some(input_type);
        self
    }

    pub fn factory(mut self, factory: FactoryFn) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn default_value(mut self, default: RawValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn validate(mut self, hook: impl Into<ValidationHook>) -> Self {
        self.validate = Some(hook.into());
        self
    }
}

#[derive(Default)]
pub struct ObjectConfig {
    pub fields: Vec<FieldConfig>,
    pub allow_extensions: bool,
    pub validate: Option<ValidationHook>,
}

impl ObjectConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: FieldConfig) -> Self {
        self.fields.push(field);
        self
    }

    pub fn allow_extensions(mut self) -> Self {
        self.allow_extensions = true;
        self
    }

    pub fn validate(mut self, hook: impl Into<ValidationHook>) -> Self {
        self.validate = Some(hook.into());
        self
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }
}

enum EntryKind {
    /// Index into `ObjectConfig::fields`
    Declared(usize),
    Extension,
    Unexpected,
}

struct Entry {
    key: String,
    kind: EntryKind,
    field: Field,
}

pub struct ObjectFactory {
    context: Context,
    config: Arc<ObjectConfig>,
    entries: Vec<Entry>,
    errors: OnceCell<ErrorCollection>,
    node: OnceCell<Result<Option<Value>>>,
    resolved_input: OnceCell<Option<RawValue>>,
}

impl ObjectFactory {
    pub fn new(context: Context, config: Arc<ObjectConfig>) -> Self {
        trace!(location = %context.document_location(), "object factory");
        let entries = context
            .input()
            .and_then(RawValue::as_map)
            .map(|map| {
                map.iter()
                    .filter(|(key, value)| !value.is_null() || config.position(key).is_none())
                    .map(|(key, value)| {
                        let (kind, field) = match config.position(key) {
                            Some(index) => {
                                let field = match &config.fields[index].factory {
                                    Some(factory) => Field::Factory(factory(context.next_field(key))),
                                    None => Field::Raw(value.clone()),
                                };
                                (EntryKind::Declared(index), field)
                            }
                            None if config.allow_extensions && is_extension(key) => {
                                (EntryKind::Extension, Field::Extension(value.clone()))
                            }
                            None => (EntryKind::Unexpected, Field::Raw(value.clone())),
                        };
                        Entry {
                            key: key.to_string(),
                            kind,
                            field,
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            context,
            config,
            entries,
            errors: OnceCell::new(),
            node: OnceCell::new(),
            resolved_input: OnceCell::new(),
        }
    }

    fn is_map(&self) -> bool {
        self.context.input().is_some_and(|input| ValueType::Map.matches(input))
    }

    fn missing_fields(&self) -> Vec<String> {
        self.config
            .fields
            .iter()
            .filter(|field| field.required && !self.entries.iter().any(|entry| entry.key == field.name))
            .map(|field| field.name.clone())
            .collect()
    }

    fn unexpected_fields(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.kind, EntryKind::Unexpected))
            .map(|entry| entry.key.clone())
            .collect()
    }

    /// Checks on the object itself, stopping at the first failure when
    /// `first_only` is set.
    fn check(&self, first_only: bool) -> Validatable {
        let mut validatable = Validatable::new(self.context.clone());
        let stop = |validatable: &Validatable| first_only && validatable.has_errors();

        let missing = self.missing_fields();
        if !missing.is_empty() {
            validatable.add_error(ValidationErrorKind::MissingFields { fields: missing });
        }
        let unexpected = self.unexpected_fields();
        if !unexpected.is_empty() {
            validatable.add_error(ValidationErrorKind::UnexpectedFields { fields: unexpected });
        }
        if stop(&validatable) {
            return validatable;
        }

        for entry in &self.entries {
            let EntryKind::Declared(index) = entry.kind else {
                continue;
            };
            let declared = &self.config.fields[index];
            let field_context = self.context.next_field(&entry.key);
            if matches!(entry.field, Field::Raw(_))
                && let Some(input_type) = declared.input_type
                && !validate_type(&mut validatable, &field_context, input_type)
            {
                if stop(&validatable) {
                    return validatable;
                }
                continue;
            }
            if let Some(hook) = &declared.validate {
                let mut field_validatable = Validatable::new(field_context);
                hook.run(&mut field_validatable);
                validatable.add_errors(field_validatable.errors());
                if stop(&validatable) {
                    return validatable;
                }
            }
        }

        if let Some(hook) = &self.config.validate {
            hook.run(&mut validatable);
        }
        validatable
    }

    fn collect_errors(&self) -> ErrorCollection {
        let mut validatable = Validatable::new(self.context.clone());
        if self.context.input().is_none()
            || !validate_type(&mut validatable, &self.context, ValueType::Map)
        {
            return validatable.into_errors();
        }
        validatable.add_errors(self.check(false).errors());
        for entry in &self.entries {
            if let Some(errors) = entry.field.errors() {
                validatable.add_errors(errors);
            }
        }
        validatable.into_errors()
    }

    fn build(&self) -> Result<Option<Value>> {
        if self.context.input().is_none() {
            return Ok(None);
        }
        raise_on_invalid_type(&self.context, ValueType::Map)?;
        if let Some(error) = self.check(true).errors().first() {
            return Err(Error::invalid_data(error));
        }

        let mut values = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            if let Some(value) = entry.field.node()? {
                values.push((entry.key.clone(), value));
            }
        }
        for declared in &self.config.fields {
            if let Some(default) = &declared.default
                && !self.entries.iter().any(|entry| entry.key == declared.name)
            {
                values.push((declared.name.clone(), Value::Raw(default.clone())));
            }
        }
        Ok(Some(Value::Node(Node::map(self.context.clone(), values))))
    }
}

impl NodeFactory for ObjectFactory {
    fn context(&self) -> &Context {
        &self.context
    }

    fn errors(&self) -> &ErrorCollection {
        self.errors.get_or_init(|| self.collect_errors())
    }

    fn node(&self) -> Result<Option<Value>> {
        self.node.get_or_init(|| self.build()).clone()
    }

    fn resolved_input(&self) -> Option<RawValue> {
        self.resolved_input
            .get_or_init(|| {
                if !self.is_map() {
                    return self.context.input().cloned();
                }
                Some(RawValue::map(
                    self.entries
                        .iter()
                        .map(|entry| (entry.key.as_str(), entry.field.resolved_input())),
                ))
            })
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory;
    use crate::validation::NamedRule;
    use serde_json::json;

    fn context(value: serde_json::Value) -> Context {
        Context::detached(Some(RawValue::from_json(&value)))
    }

    fn license() -> Arc<ObjectConfig> {
        Arc::new(
            ObjectConfig::new()
                .allow_extensions()
                .field(FieldConfig::new("name").required().input_type(ValueType::String))
                .field(
                    FieldConfig::new("url")
                        .input_type(ValueType::String)
                        .validate(NamedRule::Url),
                ),
        )
    }

    #[test]
    fn test_valid_object() {
        let factory = ObjectFactory::new(
            context(json!({"name": "MIT", "url": "https://opensource.org/licenses/MIT", "x-id": 1})),
            license(),
        );
        assert!(factory.is_valid());
        let node = factory.node().unwrap().unwrap();
        let node = node.as_node().unwrap();
        assert_eq!(node.keys().collect::<Vec<_>>(), vec!["name", "url", "x-id"]);
    }

    #[test]
    fn test_check_order() {
        let factory = ObjectFactory::new(
            context(json!({"url": "nope", "other": true})),
            license(),
        );
        let messages: Vec<String> = factory.errors().iter().map(|e| e.message()).collect();
        assert_eq!(
            messages,
            vec![
                "Missing required fields: name",
                "Unexpected fields: other",
                "Expected a valid URL",
            ]
        );
        assert_eq!(
            factory.node().unwrap_err().to_string(),
            "Invalid data for #/. Missing required fields: name"
        );
    }

    #[test]
    fn test_field_hook_skipped_on_type_error() {
        let factory = ObjectFactory::new(context(json!({"name": "MIT", "url": 5})), license());
        assert_eq!(factory.errors().len(), 1);
        assert_eq!(factory.errors().first().unwrap().location(), "#/url");
    }

    #[test]
    fn test_ordering_follows_input() {
        let config = Arc::new(
            ObjectConfig::new()
                .field(FieldConfig::new("b").input_type(ValueType::String))
                .field(FieldConfig::new("a").input_type(ValueType::String)),
        );
        let factory = ObjectFactory::new(context(json!({"a": 1, "b": 2})), config);

        let locations: Vec<&str> = factory.errors().iter().map(|e| e.location()).collect();
        assert_eq!(locations, vec!["#/a", "#/b"]);
        match factory.node().unwrap_err() {
            Error::InvalidData { location, .. } => assert_eq!(location, "#/a"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_defaults_fill_absent_fields() {
        let config = Arc::new(
            ObjectConfig::new()
                .field(FieldConfig::new("name").input_type(ValueType::String))
                .field(
                    FieldConfig::new("deprecated")
                        .input_type(ValueType::Boolean)
                        .default_value(RawValue::Bool(false)),
                ),
        );
        let factory = ObjectFactory::new(context(json!({"name": "x"})), config);

        let node = factory.node().unwrap().unwrap();
        assert_eq!(node.as_node().unwrap().get_bool("deprecated"), Some(false));
        assert_eq!(factory.resolved_input().unwrap().to_json(), json!({"name": "x"}));
    }

    #[test]
    fn test_nested_factory_errors_follow_own_errors() {
        let config = Arc::new(
            ObjectConfig::new()
                .field(FieldConfig::new("license").factory(factory::object(ObjectConfig {
                    fields: vec![FieldConfig::new("name").required()],
                    ..ObjectConfig::default()
                })))
                .validate(ValidationHook::custom(|v: &mut Validatable| {
                    v.add_error(ValidationErrorKind::custom("object hook"))
                })),
        );
        let factory = ObjectFactory::new(context(json!({"license": {}})), config);

        let locations: Vec<(&str, String)> = factory
            .errors()
            .iter()
            .map(|e| (e.location(), e.message()))
            .collect();
        assert_eq!(
            locations,
            vec![
                ("#/", "object hook".to_string()),
                ("#/license", "Missing required fields: name".to_string()),
            ]
        );
    }

    #[test]
    fn test_absent_and_wrong_shape() {
        let absent = ObjectFactory::new(Context::detached(None), license());
        assert!(absent.errors().is_empty());
        assert!(absent.node().unwrap().is_none());

        let wrong = ObjectFactory::new(context(json!("MIT")), license());
        assert_eq!(wrong.errors().len(), 1);
        assert_eq!(wrong.errors().first().unwrap().error_code(), "OA-1-10");
        assert!(wrong.node().is_err());
    }
}
