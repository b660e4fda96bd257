//! Factory for mappings with arbitrary keys.

use super::{FactoryFn, Field, NodeFactory};
use crate::context::Context;
use crate::error::{Error, ErrorCollection, Result};
use crate::node::{Node, Value};
use crate::raw::RawValue;
use crate::type_checker::{
    ValueType, raise_on_invalid_keys, raise_on_invalid_type, validate_keys, validate_type,
};
use crate::validation::{Validatable, ValidationHook, is_extension};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::trace;

/// Rules for a mapping; built once per declaration and shared.
#[derive(Default)]
pub struct MapConfig {
    /// Carry `x-` keys through unchecked
    pub allow_extensions: bool,
    /// Used when the input is absent or not a mapping
    pub default: Option<RawValue>,
    pub key_type: Option<ValueType>,
    /// Checked for every non-extension value without a factory
    pub value_type: Option<ValueType>,
    pub value_factory: Option<FactoryFn>,
    pub validate: Option<ValidationHook>,
}

impl MapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_extensions(mut self) -> Self {
        self.allow_extensions = true;
        self
    }

    pub fn default_value(mut self, default: RawValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn key_type(mut self, key_type: ValueType) -> Self {
        self.key_type = Some(key_type);
        self
    }

    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    pub fn value_factory(mut self, factory: FactoryFn) -> Self {
        self.value_factory = Some(factory);
        self
    }

    pub fn validate(mut self, hook: impl Into<ValidationHook>) -> Self {
        self.validate = Some(hook.into());
        self
    }
}

pub struct MapFactory {
    context: Context,
    /// `context` with the default applied when the input is unusable
    effective: Context,
    config: Arc<MapConfig>,
    fields: Vec<(String, Field)>,
    errors: OnceCell<ErrorCollection>,
    node: OnceCell<Result<Option<Value>>>,
    resolved_input: OnceCell<Option<RawValue>>,
}

impl MapFactory {
    pub fn new(context: Context, config: Arc<MapConfig>) -> Self {
        trace!(location = %context.document_location(), "map factory");
        let effective = match context.input() {
            Some(RawValue::Map(_)) => context.clone(),
            _ => context.with_input(config.default.clone()),
        };
        let fields = effective
            .input()
            .and_then(RawValue::as_map)
            .map(|map| {
                map.iter()
                    .map(|(key, value)| {
                        let field = if config.allow_extensions && is_extension(key) {
                            Field::Extension(value.clone())
                        } else if let Some(factory) = &config.value_factory {
                            Field::Factory(factory(effective.next_field(key)))
                        } else {
                            Field::Raw(value.clone())
                        };
                        (key.to_string(), field)
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            context,
            effective,
            config,
            fields,
            errors: OnceCell::new(),
            node: OnceCell::new(),
            resolved_input: OnceCell::new(),
        }
    }

    fn has_input(&self) -> bool {
        self.context.input().is_some()
    }

    fn is_map(&self) -> bool {
        self.context.input().is_some_and(|input| ValueType::Map.matches(input))
    }

    fn raw_fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().filter_map(|(key, field)| match field {
            Field::Raw(_) => Some(key.as_str()),
            _ => None,
        })
    }

    fn collect_errors(&self) -> ErrorCollection {
        let mut validatable = Validatable::new(self.effective.clone());
        if !self.has_input() {
            return validatable.into_errors();
        }
        if !validate_type(&mut validatable, &self.context, ValueType::Map) {
            return validatable.into_errors();
        }
        if let Some(key_type) = self.config.key_type {
            validate_keys(&mut validatable, &self.context, key_type);
        }
        if let Some(value_type) = self.config.value_type {
            for key in self.raw_fields() {
                validate_type(&mut validatable, &self.context.next_field(key), value_type);
            }
        }
        if let Some(hook) = &self.config.validate {
            hook.run(&mut validatable);
        }
        for (_, field) in &self.fields {
            if let Some(errors) = field.errors() {
                validatable.add_errors(errors);
            }
        }
        validatable.into_errors()
    }

    fn build(&self) -> Result<Option<Value>> {
        if self.has_input() {
            raise_on_invalid_type(&self.context, ValueType::Map)?;
            if let Some(key_type) = self.config.key_type {
                raise_on_invalid_keys(&self.context, key_type)?;
            }
            if let Some(value_type) = self.config.value_type {
                for key in self.raw_fields() {
                    raise_on_invalid_type(&self.context.next_field(key), value_type)?;
                }
            }
            if let Some(hook) = &self.config.validate {
                let mut validatable = Validatable::new(self.effective.clone());
                hook.run(&mut validatable);
                if let Some(error) = validatable.errors().first() {
                    return Err(Error::invalid_data(error));
                }
            }
        }
        if self.effective.input().is_none() {
            return Ok(None);
        }
        let mut entries = Vec::with_capacity(self.fields.len());
        for (key, field) in &self.fields {
            if let Some(value) = field.node()? {
                entries.push((key.clone(), value));
            }
        }
        Ok(Some(Value::Node(Node::map(self.context.clone(), entries))))
    }
}

impl NodeFactory for MapFactory {
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
                if self.has_input() && !self.is_map() {
                    return self.context.input().cloned();
                }
                self.effective.input()?;
                Some(RawValue::map(
                    self.fields
                        .iter()
                        .map(|(key, field)| (key.as_str(), field.resolved_input())),
                ))
            })
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationErrorKind;
    use crate::factory;
    use serde_json::json;

    fn context(value: serde_json::Value) -> Context {
        Context::detached(Some(RawValue::from_json(&value)))
    }

    fn strings() -> Arc<MapConfig> {
        Arc::new(MapConfig::new().value_type(ValueType::String))
    }

    #[test]
    fn test_absent_input_uses_default() {
        let default = RawValue::map([("a", RawValue::from("x"))]);
        let config = Arc::new(MapConfig::new().default_value(default.clone()));
        let factory = MapFactory::new(Context::detached(None), config);

        assert!(factory.errors().is_empty());
        let node = factory.node().unwrap().unwrap();
        assert_eq!(node.to_raw(), default);
        assert_eq!(factory.resolved_input(), Some(default));
    }

    #[test]
    fn test_absent_input_without_default() {
        let factory = MapFactory::new(Context::detached(None), strings());
        assert!(factory.errors().is_empty());
        assert!(factory.node().unwrap().is_none());
        assert!(factory.resolved_input().is_none());
    }

    #[test]
    fn test_wrong_shape_is_a_single_error_even_with_default() {
        let config = Arc::new(
            MapConfig::new()
                .value_type(ValueType::String)
                .default_value(RawValue::map([("a", RawValue::from("x"))])),
        );
        let factory = MapFactory::new(context(json!(["not", "a", "map"])), config);

        assert_eq!(factory.errors().len(), 1);
        let error = factory.errors().first().unwrap();
        assert_eq!(error.location(), "#/");
        assert_eq!(error.error_code(), "OA-1-10");

        let err = factory.node().unwrap_err();
        assert_eq!(err, Error::invalid_data(error));
    }

    #[test]
    fn test_first_violation_wins_in_input_order() {
        let factory = MapFactory::new(context(json!({"a": 1, "b": true})), strings());

        let locations: Vec<&str> = factory.errors().iter().map(|e| e.location()).collect();
        assert_eq!(locations, vec!["#/a", "#/b"]);
        match factory.node().unwrap_err() {
            Error::InvalidData { location, .. } => assert_eq!(location, "#/a"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_results_are_memoized() {
        let factory = MapFactory::new(context(json!({"a": "x"})), strings());

        assert!(std::ptr::eq(factory.errors(), factory.errors()));
        let first = factory.node().unwrap().unwrap();
        let second = factory.node().unwrap().unwrap();
        assert!(first.as_node().unwrap().ptr_eq(second.as_node().unwrap()));
    }

    #[test]
    fn test_extensions_are_carried_unchecked() {
        let config = Arc::new(MapConfig::new().allow_extensions().value_type(ValueType::String));
        let factory = MapFactory::new(context(json!({"a": "x", "x-count": 3})), config);

        assert!(factory.is_valid());
        let node = factory.node().unwrap().unwrap();
        let node = node.as_node().unwrap();
        assert_eq!(node.get("x-count").unwrap().as_raw(), Some(&RawValue::Integer(3)));
    }

    #[test]
    fn test_extensions_checked_when_not_allowed() {
        let factory = MapFactory::new(context(json!({"x-count": 3})), strings());
        assert_eq!(factory.errors().len(), 1);
    }

    #[test]
    fn test_key_type() {
        let config = Arc::new(MapConfig::new().key_type(ValueType::Integer));
        let factory = MapFactory::new(context(json!({"200": "ok", "oops": "x"})), config);

        let error = factory.errors().first().unwrap();
        assert_eq!(
            error.kind,
            ValidationErrorKind::KeyType {
                expected: "Integer".to_string(),
                keys: vec!["oops".to_string()],
            }
        );
        assert!(factory.node().is_err());
    }

    #[test]
    fn test_hook_runs_after_value_checks() {
        let config = Arc::new(
            MapConfig::new()
                .value_type(ValueType::String)
                .validate(ValidationHook::custom(|v: &mut Validatable| {
                    if v.field("b").is_none() {
                        v.add_error(ValidationErrorKind::custom("b is required"));
                    }
                })),
        );
        let factory = MapFactory::new(context(json!({"a": 1})), config);

        let messages: Vec<String> = factory.errors().iter().map(|e| e.message()).collect();
        assert_eq!(
            messages,
            vec!["Invalid type. Expected String, got integer", "b is required"]
        );
    }

    #[test]
    fn test_value_factory_children() {
        let inner = factory::map(MapConfig::new().value_type(ValueType::Integer));
        let config = Arc::new(MapConfig::new().value_factory(inner));
        let factory = MapFactory::new(
            context(json!({"first": {"n": 1}, "second": {"n": "two"}, "third": 3})),
            config,
        );

        let locations: Vec<&str> = factory.errors().iter().map(|e| e.location()).collect();
        assert_eq!(locations, vec!["#/second/n", "#/third"]);
        match factory.node().unwrap_err() {
            Error::InvalidData { location, .. } => assert_eq!(location, "#/second/n"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_resolved_input_echoes_valid_input() {
        let input = json!({"first": {"n": 1}, "x-note": "kept"});
        let inner = factory::map(MapConfig::new().value_type(ValueType::Integer));
        let config = Arc::new(MapConfig::new().allow_extensions().value_factory(inner));
        let factory = MapFactory::new(context(input.clone()), config);

        assert_eq!(factory.resolved_input().unwrap().to_json(), input);
    }
}
