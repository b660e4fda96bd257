//! The root OpenAPI object.

use super::components::{Components, components_factory};
use super::info::{Info, info_factory};
use super::server::{Server, server_factory, servers};
use super::tag::{ExternalDocumentation, Tag, external_docs, external_docs_factory, tag_factory, tags};
use crate::error::ValidationErrorKind;
use crate::factory::{self, ArrayConfig, FactoryFn, FieldConfig, ObjectConfig};
use crate::node::Node;
use crate::raw::RawValue;
use crate::type_checker::ValueType;
use crate::validation::{Validatable, ValidationHook};
use once_cell::sync::Lazy;

static OPENAPI: Lazy<FactoryFn> = Lazy::new(|| {
    factory::object(
        ObjectConfig::new()
            .allow_extensions()
            .field(
                FieldConfig::new("openapi")
                    .required()
                    .input_type(ValueType::String)
                    .validate(ValidationHook::custom(supported_version)),
            )
            .field(FieldConfig::new("info").required().factory(info_factory()))
            .field(FieldConfig::new("jsonSchemaDialect").input_type(ValueType::String))
            .field(
                FieldConfig::new("servers")
                    .factory(factory::array(ArrayConfig::new().value_factory(server_factory())))
                    .default_value(RawValue::array([RawValue::map([("url", RawValue::from("/"))])])),
            )
            .field(FieldConfig::new("paths").input_type(ValueType::Map))
            .field(FieldConfig::new("webhooks").input_type(ValueType::Map))
            .field(FieldConfig::new("components").factory(components_factory()))
            .field(FieldConfig::new("security").input_type(ValueType::Array))
            .field(FieldConfig::new("tags").factory(factory::array(
                ArrayConfig::new().value_factory(tag_factory()),
            )))
            .field(FieldConfig::new("externalDocs").factory(external_docs_factory())),
    )
});

fn supported_version(validatable: &mut Validatable) {
    let message = validatable
        .input()
        .and_then(RawValue::as_str)
        .filter(|version| !version.starts_with("3."))
        .map(|version| format!("Unsupported OpenAPI version {}. Expected 3.x", version));
    if let Some(message) = message {
        validatable.add_error(ValidationErrorKind::custom(message));
    }
}

/// Factory for a whole OpenAPI document.
pub fn openapi_factory() -> FactoryFn {
    OPENAPI.clone()
}

/// The root object of an OpenAPI document.
#[derive(Debug, Clone)]
pub struct OpenApi(Node);

impl OpenApi {
    pub fn new(node: Node) -> Self {
        Self(node)
    }

    pub fn node(&self) -> &Node {
        &self.0
    }

    pub fn openapi(&self) -> &str {
        self.0.get_str("openapi").unwrap_or_default()
    }

    pub fn info(&self) -> Option<Info> {
        self.0.get_node("info").cloned().map(Info::new)
    }

    /// Declared servers; a single `/` server when none are declared.
    pub fn servers(&self) -> Vec<Server> {
        if let Some(value) = self.0.get("servers")
            && let Some(raw) = value.as_raw()
        {
            return default_servers(&self.0, raw);
        }
        servers(&self.0)
    }

    pub fn paths(&self) -> Option<&RawValue> {
        self.0.get("paths")?.as_raw()
    }

    pub fn components(&self) -> Option<Components> {
        self.0.get_node("components").cloned().map(Components)
    }

    pub fn tags(&self) -> Vec<Tag> {
        tags(&self.0)
    }

    pub fn external_docs(&self) -> Option<ExternalDocumentation> {
        external_docs(&self.0)
    }
}

/// Servers built from the declared default.
fn default_servers(node: &Node, raw: &RawValue) -> Vec<Server> {
    let context = node.context().next_field("servers").with_input(Some(raw.clone()));
    let factory = factory::array(ArrayConfig::new().value_factory(server_factory()))(context);
    match factory.node() {
        Ok(Some(value)) => value
            .as_node()
            .map(|list| {
                list.items()
                    .iter()
                    .filter_map(|item| item.as_node().cloned().map(Server))
                    .collect()
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}
