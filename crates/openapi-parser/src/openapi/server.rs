//! Server and Server Variable objects.

use super::node_list;
use crate::error::ValidationErrorKind;
use crate::factory::{self, ArrayConfig, FactoryFn, FieldConfig, MapConfig, ObjectConfig};
use crate::node::Node;
use crate::raw::RawValue;
use crate::type_checker::ValueType;
use crate::validation::{Validatable, ValidationHook};
use once_cell::sync::Lazy;

static SERVER: Lazy<FactoryFn> = Lazy::new(|| {
    factory::object(
        ObjectConfig::new()
            .allow_extensions()
            .field(FieldConfig::new("url").required().input_type(ValueType::String))
            .field(FieldConfig::new("description").input_type(ValueType::String))
            .field(FieldConfig::new("variables").factory(factory::map(
                MapConfig::new().value_factory(server_variable_factory()),
            ))),
    )
});

static SERVER_VARIABLE: Lazy<FactoryFn> = Lazy::new(|| {
    factory::object(
        ObjectConfig::new()
            .allow_extensions()
            .field(FieldConfig::new("enum").factory(factory::array(
                ArrayConfig::new().value_type(ValueType::String),
            )))
            .field(FieldConfig::new("default").required().input_type(ValueType::String))
            .field(FieldConfig::new("description").input_type(ValueType::String))
            .validate(ValidationHook::custom(default_in_enum)),
    )
});

/// A variable's default must be one of its enumerated values.
fn default_in_enum(validatable: &mut Validatable) {
    let Some(values) = validatable.field("enum").and_then(RawValue::as_array) else {
        return;
    };
    let Some(default) = validatable.field("default").and_then(RawValue::as_str) else {
        return;
    };
    if values.iter().any(|value| value.as_str() == Some(default)) {
        return;
    }
    let message = format!("Default value {} is not one of the enum values", default);
    let context = validatable.context().next_field("default");
    validatable.add_error_at(&context, ValidationErrorKind::custom(message));
}

pub fn server_factory() -> FactoryFn {
    SERVER.clone()
}

pub fn server_variable_factory() -> FactoryFn {
    SERVER_VARIABLE.clone()
}

#[derive(Debug, Clone)]
pub struct Server(pub(crate) Node);

impl Server {
    pub fn url(&self) -> &str {
        self.0.get_str("url").unwrap_or_default()
    }

    pub fn description(&self) -> Option<&str> {
        self.0.get_str("description")
    }

    /// Variables in declaration order.
    pub fn variables(&self) -> Vec<(&str, ServerVariable)> {
        self.0
            .get_node("variables")
            .map(|variables| {
                variables
                    .entries()
                    .filter_map(|(name, value)| Some((name, ServerVariable(value.as_node()?.clone()))))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct ServerVariable(Node);

impl ServerVariable {
    pub fn default_value(&self) -> &str {
        self.0.get_str("default").unwrap_or_default()
    }

    pub fn description(&self) -> Option<&str> {
        self.0.get_str("description")
    }

    pub fn enum_values(&self) -> Vec<&str> {
        self.0
            .get_node("enum")
            .map(|values| values.items().iter().filter_map(|value| value.as_str()).collect())
            .unwrap_or_default()
    }
}

pub(crate) fn servers(node: &Node) -> Vec<Server> {
    node_list(node, "servers").into_iter().map(Server).collect()
}
