//! OpenAPI 3 objects declared on the factory machinery.
//!
//! Each object has one shared factory, built on first use, and a thin typed
//! wrapper around the [`Node`] it produces.

mod components;
mod info;
mod root;
mod schema;
mod server;
mod tag;

pub use components::{Components, components_factory};
pub use info::{Contact, Info, License, contact_factory, info_factory, license_factory};
pub use root::{OpenApi, openapi_factory};
pub use schema::{Schema, schema_factory};
pub use server::{Server, ServerVariable, server_factory, server_variable_factory};
pub use tag::{ExternalDocumentation, Tag, external_docs_factory, tag_factory};

use crate::error::Result;
use crate::node::{Node, Value};
use crate::validation::is_extension;

/// Extension fields (`x-...`) of a node, in input order.
pub fn extensions(node: &Node) -> impl Iterator<Item = (&str, &Value)> {
    node.entries().filter(|(key, _)| is_extension(key))
}

/// The nodes of an array field; empty when the field is absent.
fn node_list(node: &Node, key: &str) -> Vec<Node> {
    node.get_node(key)
        .map(|list| list.items().iter().filter_map(Value::as_node).cloned().collect())
        .unwrap_or_default()
}

/// The node behind a value, building recursive targets when needed.
fn resolve_node(value: &Value) -> Result<Option<Node>> {
    Ok(match value.resolve()? {
        Some(Value::Node(node)) => Some(node),
        _ => None,
    })
}
