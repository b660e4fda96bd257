//! Schema objects, including composition and validation keywords.

use super::{external_docs_factory, resolve_node};
use crate::context::Context;
use crate::error::{Result, ValidationErrorKind};
use crate::factory::{self, ArrayConfig, FactoryFn, FieldConfig, MapConfig, NodeFactory, ObjectConfig, referenceable};
use crate::node::{Node, Value};
use crate::raw::RawValue;
use crate::type_checker::ValueType;
use crate::validation::{NamedRule, Validatable, ValidationHook};
use once_cell::sync::Lazy;
use std::sync::Arc;

const SCHEMA_TYPES: &[&str] = &["array", "boolean", "integer", "number", "object", "string", "null"];

static SCHEMA: Lazy<FactoryFn> = Lazy::new(|| {
    // Nested schemas must go through `schema_factory`; reading SCHEMA here
    // would re-enter this initializer.
    let nested = || referenceable(schema_factory());
    let schema_list = || factory::array(ArrayConfig::new().value_factory(nested()));
    let schema_map = || factory::map(MapConfig::new().value_factory(nested()));
    let strings = || factory::array(ArrayConfig::new().value_type(ValueType::String));

    let mut config = ObjectConfig::new()
        .allow_extensions()
        .field(FieldConfig::new("type").validate(ValidationHook::custom(known_type)))
        .field(FieldConfig::new("required").factory(strings()))
        .field(FieldConfig::new("properties").factory(schema_map()))
        .field(FieldConfig::new("patternProperties").factory(schema_map()))
        .field(FieldConfig::new("$defs").factory(schema_map()))
        .field(
            FieldConfig::new("additionalProperties").factory(factory::scalar_or(ValueType::Boolean, nested())),
        )
        .field(FieldConfig::new("items").factory(factory::scalar_or(ValueType::Boolean, nested())))
        .field(FieldConfig::new("prefixItems").factory(schema_list()))
        .field(FieldConfig::new("allOf").factory(schema_list()))
        .field(FieldConfig::new("oneOf").factory(schema_list()))
        .field(FieldConfig::new("anyOf").factory(schema_list()))
        .field(FieldConfig::new("not").factory(nested()))
        .field(FieldConfig::new("if").factory(nested()))
        .field(FieldConfig::new("then").factory(nested()))
        .field(FieldConfig::new("else").factory(nested()))
        .field(FieldConfig::new("contains").factory(nested()))
        .field(FieldConfig::new("propertyNames").factory(nested()))
        .field(FieldConfig::new("discriminator").factory(discriminator_factory()))
        .field(FieldConfig::new("xml").factory(xml_factory()))
        .field(FieldConfig::new("externalDocs").factory(external_docs_factory()))
        .field(FieldConfig::new("enum").input_type(ValueType::Array))
        .field(FieldConfig::new("examples").input_type(ValueType::Array))
        .field(FieldConfig::new("dependentRequired").input_type(ValueType::Map))
        // Boolean in 3.0, a number in 3.1
        .field(FieldConfig::new("exclusiveMinimum"))
        .field(FieldConfig::new("exclusiveMaximum"))
        .field(FieldConfig::new("const"))
        .field(FieldConfig::new("example"))
        .field(FieldConfig::new("default"));
    for name in STRING_KEYWORDS {
        config = config.field(FieldConfig::new(*name).input_type(ValueType::String));
    }
    for name in NUMBER_KEYWORDS {
        config = config.field(FieldConfig::new(*name).input_type(ValueType::Number));
    }
    for name in COUNT_KEYWORDS {
        config = config.field(FieldConfig::new(*name).input_type(ValueType::Integer));
    }
    for name in FLAG_KEYWORDS {
        config = config.field(FieldConfig::new(*name).input_type(ValueType::Boolean));
    }
    factory::object(config)
});

const STRING_KEYWORDS: &[&str] = &[
    "title",
    "description",
    "format",
    "pattern",
    "$id",
    "$schema",
    "$anchor",
    "$comment",
    "contentMediaType",
    "contentEncoding",
];

const NUMBER_KEYWORDS: &[&str] = &["multipleOf", "minimum", "maximum"];

const COUNT_KEYWORDS: &[&str] = &[
    "minLength",
    "maxLength",
    "minItems",
    "maxItems",
    "minProperties",
    "maxProperties",
    "minContains",
    "maxContains",
];

const FLAG_KEYWORDS: &[&str] = &["nullable", "uniqueItems", "readOnly", "writeOnly", "deprecated"];

static DISCRIMINATOR: Lazy<FactoryFn> = Lazy::new(|| {
    factory::object(
        ObjectConfig::new()
            .allow_extensions()
            .field(FieldConfig::new("propertyName").required().input_type(ValueType::String))
            .field(FieldConfig::new("mapping").factory(factory::map(
                MapConfig::new().value_type(ValueType::String),
            ))),
    )
});

static XML: Lazy<FactoryFn> = Lazy::new(|| {
    factory::object(
        ObjectConfig::new()
            .allow_extensions()
            .field(FieldConfig::new("name").input_type(ValueType::String))
            .field(
                FieldConfig::new("namespace")
                    .input_type(ValueType::String)
                    .validate(NamedRule::Url),
            )
            .field(FieldConfig::new("prefix").input_type(ValueType::String))
            .field(FieldConfig::new("attribute").input_type(ValueType::Boolean))
            .field(FieldConfig::new("wrapped").input_type(ValueType::Boolean)),
    )
});

/// `type` is a known name, or (3.1) a list of them.
fn known_type(validatable: &mut Validatable) {
    let names = match validatable.input() {
        Some(RawValue::Array(items)) => items.to_vec(),
        Some(other) => vec![other.clone()],
        None => return,
    };
    for name in names {
        let kind = match name.as_str() {
            Some(name) if SCHEMA_TYPES.contains(&name) => continue,
            Some(name) => ValidationErrorKind::custom(format!(
                "Unknown schema type {}. Expected one of {}",
                name,
                SCHEMA_TYPES.join(", ")
            )),
            None => ValidationErrorKind::ValueType {
                expected: ValueType::String.name().to_string(),
                got: name.type_name().to_string(),
            },
        };
        validatable.add_error(kind);
    }
}

pub fn discriminator_factory() -> FactoryFn {
    DISCRIMINATOR.clone()
}

pub fn xml_factory() -> FactoryFn {
    XML.clone()
}

/// Factory for a schema object.
pub fn schema_factory() -> FactoryFn {
    Arc::new(|context: Context| -> Box<dyn NodeFactory> { (*SCHEMA)(context) })
}

/// A schema object.
#[derive(Debug, Clone)]
pub struct Schema(Node);

impl Schema {
    pub fn new(node: Node) -> Self {
        Self(node)
    }

    /// The schema a node value stands for, building recursive targets.
    pub fn from_value(value: &Value) -> Result<Option<Schema>> {
        Ok(resolve_node(value)?.map(Schema))
    }

    pub fn node(&self) -> &Node {
        &self.0
    }

    pub fn schema_type(&self) -> Option<&str> {
        self.0.get_str("type")
    }

    pub fn title(&self) -> Option<&str> {
        self.0.get_str("title")
    }

    pub fn description(&self) -> Option<&str> {
        self.0.get_str("description")
    }

    pub fn format(&self) -> Option<&str> {
        self.0.get_str("format")
    }

    pub fn nullable(&self) -> bool {
        self.0.get_bool("nullable").unwrap_or(false)
    }

    pub fn required(&self) -> Vec<&str> {
        self.0
            .get_node("required")
            .map(|names| names.items().iter().filter_map(|name| name.as_str()).collect())
            .unwrap_or_default()
    }

    /// Property schemas in declaration order.
    pub fn properties(&self) -> Result<Vec<(String, Schema)>> {
        let Some(properties) = self.0.get_node("properties") else {
            return Ok(Vec::new());
        };
        let mut schemas = Vec::with_capacity(properties.len());
        for (name, value) in properties.entries() {
            if let Some(schema) = Schema::from_value(value)? {
                schemas.push((name.to_string(), schema));
            }
        }
        Ok(schemas)
    }

    pub fn property(&self, name: &str) -> Result<Option<Schema>> {
        match self.0.get_node("properties").and_then(|properties| properties.get(name)) {
            Some(value) => Schema::from_value(value),
            None => Ok(None),
        }
    }

    pub fn items(&self) -> Result<Option<Schema>> {
        match self.0.get("items") {
            Some(value) => Schema::from_value(value),
            None => Ok(None),
        }
    }

    /// Declared type names; `type` may be a single name or a list.
    pub fn types(&self) -> Vec<&str> {
        match self.0.get("type").and_then(Value::as_raw) {
            Some(RawValue::Array(names)) => names.iter().filter_map(RawValue::as_str).collect(),
            Some(name) => name.as_str().into_iter().collect(),
            None => Vec::new(),
        }
    }

    pub fn all_of(&self) -> Result<Vec<Schema>> {
        self.schema_list("allOf")
    }

    pub fn one_of(&self) -> Result<Vec<Schema>> {
        self.schema_list("oneOf")
    }

    pub fn any_of(&self) -> Result<Vec<Schema>> {
        self.schema_list("anyOf")
    }

    /// `additionalProperties` as a flag; `None` when absent or a schema.
    pub fn allows_additional_properties(&self) -> Option<bool> {
        self.0.get_bool("additionalProperties")
    }

    /// `additionalProperties` when it is a schema.
    pub fn additional_properties(&self) -> Result<Option<Schema>> {
        match self.0.get("additionalProperties") {
            Some(value) => Schema::from_value(value),
            None => Ok(None),
        }
    }

    pub fn minimum(&self) -> Option<f64> {
        self.0.get("minimum")?.as_raw()?.as_f64()
    }

    pub fn maximum(&self) -> Option<f64> {
        self.0.get("maximum")?.as_raw()?.as_f64()
    }

    pub fn discriminator(&self) -> Option<&str> {
        self.0.get_node("discriminator")?.get_str("propertyName")
    }

    fn schema_list(&self, key: &str) -> Result<Vec<Schema>> {
        let Some(list) = self.0.get_node(key) else {
            return Ok(Vec::new());
        };
        let mut schemas = Vec::with_capacity(list.len());
        for value in list.items() {
            if let Some(schema) = Schema::from_value(value)? {
                schemas.push(schema);
            }
        }
        Ok(schemas)
    }

    /// True when `name` is a property that refers back to a schema already
    /// being built.
    pub fn is_recursive_property(&self, name: &str) -> bool {
        self.0
            .get_node("properties")
            .and_then(|properties| properties.get(name))
            .is_some_and(Value::is_recursive)
    }
}
