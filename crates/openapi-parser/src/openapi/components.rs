//! The Components object and its named schemas.

use super::schema::{Schema, schema_factory};
use crate::error::Result;
use crate::factory::{self, FactoryFn, FieldConfig, MapConfig, ObjectConfig, referenceable};
use crate::node::Node;
use crate::type_checker::ValueType;
use crate::validation::NamedRule;
use once_cell::sync::Lazy;

static COMPONENTS: Lazy<FactoryFn> = Lazy::new(|| {
    let raw_components = || {
        factory::map(
            MapConfig::new()
                .value_type(ValueType::Map)
                .validate(NamedRule::ComponentKeys),
        )
    };
    factory::object(
        ObjectConfig::new()
            .allow_extensions()
            .field(FieldConfig::new("schemas").factory(factory::map(
                MapConfig::new()
                    .value_factory(referenceable(schema_factory()))
                    .validate(NamedRule::ComponentKeys),
            )))
            .field(FieldConfig::new("responses").factory(raw_components()))
            .field(FieldConfig::new("parameters").factory(raw_components()))
            .field(FieldConfig::new("examples").factory(raw_components()))
            .field(FieldConfig::new("requestBodies").factory(raw_components()))
            .field(FieldConfig::new("headers").factory(raw_components()))
            .field(FieldConfig::new("securitySchemes").factory(raw_components()))
            .field(FieldConfig::new("links").factory(raw_components()))
            .field(FieldConfig::new("callbacks").factory(raw_components()))
            .field(FieldConfig::new("pathItems").factory(raw_components())),
    )
});

pub fn components_factory() -> FactoryFn {
    COMPONENTS.clone()
}

/// Reusable objects of the document.
#[derive(Debug, Clone)]
pub struct Components(pub(crate) Node);

impl Components {
    pub fn node(&self) -> &Node {
        &self.0
    }

    pub fn schema_names(&self) -> Vec<&str> {
        self.0
            .get_node("schemas")
            .map(|schemas| schemas.keys().collect())
            .unwrap_or_default()
    }

    pub fn schema(&self, name: &str) -> Result<Option<Schema>> {
        match self.0.get_node("schemas").and_then(|schemas| schemas.get(name)) {
            Some(value) => Schema::from_value(value),
            None => Ok(None),
        }
    }

    /// All schemas in declaration order.
    pub fn schemas(&self) -> Result<Vec<(String, Schema)>> {
        let mut schemas = Vec::new();
        for name in self.schema_names() {
            if let Some(schema) = self.schema(name)? {
                schemas.push((name.to_string(), schema));
            }
        }
        Ok(schemas)
    }
}
