//! Tag and External Documentation objects.

use super::node_list;
use crate::factory::{self, FactoryFn, FieldConfig, ObjectConfig};
use crate::node::Node;
use crate::type_checker::ValueType;
use crate::validation::NamedRule;
use once_cell::sync::Lazy;

static TAG: Lazy<FactoryFn> = Lazy::new(|| {
    factory::object(
        ObjectConfig::new()
            .allow_extensions()
            .field(FieldConfig::new("name").required().input_type(ValueType::String))
            .field(FieldConfig::new("description").input_type(ValueType::String))
            .field(FieldConfig::new("externalDocs").factory(external_docs_factory())),
    )
});

static EXTERNAL_DOCS: Lazy<FactoryFn> = Lazy::new(|| {
    factory::object(
        ObjectConfig::new()
            .allow_extensions()
            .field(FieldConfig::new("description").input_type(ValueType::String))
            .field(
                FieldConfig::new("url")
                    .required()
                    .input_type(ValueType::String)
                    .validate(NamedRule::Url),
            ),
    )
});

pub fn tag_factory() -> FactoryFn {
    TAG.clone()
}

pub fn external_docs_factory() -> FactoryFn {
    EXTERNAL_DOCS.clone()
}

#[derive(Debug, Clone)]
pub struct Tag(Node);

impl Tag {
    pub fn name(&self) -> &str {
        self.0.get_str("name").unwrap_or_default()
    }

    pub fn description(&self) -> Option<&str> {
        self.0.get_str("description")
    }

    pub fn external_docs(&self) -> Option<ExternalDocumentation> {
        external_docs(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct ExternalDocumentation(Node);

impl ExternalDocumentation {
    pub fn url(&self) -> &str {
        self.0.get_str("url").unwrap_or_default()
    }

    pub fn description(&self) -> Option<&str> {
        self.0.get_str("description")
    }
}

pub(crate) fn tags(node: &Node) -> Vec<Tag> {
    node_list(node, "tags").into_iter().map(Tag).collect()
}

pub(crate) fn external_docs(node: &Node) -> Option<ExternalDocumentation> {
    node.get_node("externalDocs").cloned().map(ExternalDocumentation)
}
