//! Factory for sequences.

use super::{FactoryFn, Field, NodeFactory};
use crate::context::Context;
use crate::error::{Error, ErrorCollection, Result};
use crate::node::{Node, Value};
use crate::raw::RawValue;
use crate::type_checker::{ValueType, raise_on_invalid_type, validate_type};
use crate::validation::{Validatable, ValidationHook};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::trace;

#[derive(Default)]
pub struct ArrayConfig {
    /// Used when the input is absent or not a sequence
    pub default: Option<RawValue>,
    /// Checked for every item without a factory
    pub value_type: Option<ValueType>,
    pub value_factory: Option<FactoryFn>,
    pub validate: Option<ValidationHook>,
}

impl ArrayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_value(mut self, default: RawValue) -> Self {
        self.default = Some(default);
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

pub struct ArrayFactory {
    context: Context,
    effective: Context,
    config: Arc<ArrayConfig>,
    items: Vec<Field>,
    errors: OnceCell<ErrorCollection>,
    node: OnceCell<Result<Option<Value>>>,
    resolved_input: OnceCell<Option<RawValue>>,
}

impl ArrayFactory {
    pub fn new(context: Context, config: Arc<ArrayConfig>) -> Self {
        trace!(location = %context.document_location(), "array factory");
        let effective = match context.input() {
            Some(RawValue::Array(_)) => context.clone(),
            _ => context.with_input(config.default.clone()),
        };
        let items = effective
            .input()
            .and_then(RawValue::as_array)
            .map(|items| {
                items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| match &config.value_factory {
                        Some(factory) => Field::Factory(factory(effective.next_index(index))),
                        None => Field::Raw(item.clone()),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            context,
            effective,
            config,
            items,
            errors: OnceCell::new(),
            node: OnceCell::new(),
            resolved_input: OnceCell::new(),
        }
    }

    fn raw_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| matches!(item, Field::Raw(_)).then_some(index))
    }

    fn collect_errors(&self) -> ErrorCollection {
        let mut validatable = Validatable::new(self.effective.clone());
        if self.context.input().is_none()
            || !validate_type(&mut validatable, &self.context, ValueType::Array)
        {
            return validatable.into_errors();
        }
        if let Some(value_type) = self.config.value_type {
            for index in self.raw_indices() {
                validate_type(&mut validatable, &self.context.next_index(index), value_type);
            }
        }
        if let Some(hook) = &self.config.validate {
            hook.run(&mut validatable);
        }
        for item in &self.items {
            if let Some(errors) = item.errors() {
                validatable.add_errors(errors);
            }
        }
        validatable.into_errors()
    }

    fn build(&self) -> Result<Option<Value>> {
        if self.context.input().is_some() {
            raise_on_invalid_type(&self.context, ValueType::Array)?;
            if let Some(value_type) = self.config.value_type {
                for index in self.raw_indices() {
                    raise_on_invalid_type(&self.context.next_index(index), value_type)?;
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
        let mut values = Vec::with_capacity(self.items.len());
        for item in &self.items {
            if let Some(value) = item.node()? {
                values.push(value);
            }
        }
        Ok(Some(Value::Node(Node::array(self.context.clone(), values))))
    }
}

impl NodeFactory for ArrayFactory {
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
            .get_or_init(|| match self.context.input() {
                Some(input) if !ValueType::Array.matches(input) => Some(input.clone()),
                _ => {
                    self.effective.input()?;
                    Some(RawValue::array(self.items.iter().map(Field::resolved_input)))
                }
            })
            .clone()
    }
}
