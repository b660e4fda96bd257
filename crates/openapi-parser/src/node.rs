//! Validated, read-only views of document regions.

use crate::context::Context;
use crate::error::Result;
use crate::factory::FactoryFn;
use crate::raw::RawValue;
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

/// A validated mapping or sequence, bound to the context it was built from.
///
/// Cloning shares the underlying data.
#[derive(Clone)]
pub struct Node(Arc<NodeInner>);

struct NodeInner {
    context: Context,
    data: NodeData,
}

enum NodeData {
    Map(IndexMap<String, Value>),
    Array(Vec<Value>),
}

/// A node entry.
#[derive(Debug, Clone)]
pub enum Value {
    Node(Node),
    Raw(RawValue),
    /// A reference back into data already on the current path
    Recursive(Placeholder),
}

impl Node {
    pub fn map(context: Context, entries: impl IntoIterator<Item = (String, Value)>) -> Self {
        Node(Arc::new(NodeInner {
            context,
            data: NodeData::Map(entries.into_iter().collect()),
        }))
    }

    pub fn array(context: Context, items: Vec<Value>) -> Self {
        Node(Arc::new(NodeInner {
            context,
            data: NodeData::Array(items),
        }))
    }

    pub fn context(&self) -> &Context {
        &self.0.context
    }

    pub fn is_map(&self) -> bool {
        matches!(self.0.data, NodeData::Map(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.0.data, NodeData::Array(_))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        match &self.0.data {
            NodeData::Map(entries) => entries.get(key),
            NodeData::Array(_) => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Field names in order; empty for arrays.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries().map(|(k, _)| k)
    }

    /// Map entries in order; empty for arrays.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        let entries = match &self.0.data {
            NodeData::Map(entries) => Some(entries),
            NodeData::Array(_) => None,
        };
        entries
            .into_iter()
            .flat_map(|entries| entries.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Array items; empty for maps.
    pub fn items(&self) -> &[Value] {
        match &self.0.data {
            NodeData::Array(items) => items,
            NodeData::Map(_) => &[],
        }
    }

    pub fn len(&self) -> usize {
        match &self.0.data {
            NodeData::Map(entries) => entries.len(),
            NodeData::Array(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_str()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key)?.as_raw()?.as_bool()
    }

    pub fn get_node(&self, key: &str) -> Option<&Node> {
        self.get(key)?.as_node()
    }

    /// True when both handles share the same built node.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Node-shaped raw echo; recursive entries keep their `$ref`.
    pub fn to_raw(&self) -> RawValue {
        match &self.0.data {
            NodeData::Map(entries) => RawValue::map(entries.iter().map(|(k, v)| (k.as_str(), v.to_raw()))),
            NodeData::Array(items) => RawValue::array(items.iter().map(Value::to_raw)),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.data {
            NodeData::Map(entries) => f
                .debug_map()
                .entries(entries.iter().map(|(k, v)| (k, v)))
                .finish(),
            NodeData::Array(items) => f.debug_list().entries(items).finish(),
        }
    }
}

impl Value {
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_raw(&self) -> Option<&RawValue> {
        match self {
            Value::Raw(raw) => Some(raw),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_raw()?.as_str()
    }

    pub fn as_placeholder(&self) -> Option<&Placeholder> {
        match self {
            Value::Recursive(placeholder) => Some(placeholder),
            _ => None,
        }
    }

    pub fn is_recursive(&self) -> bool {
        matches!(self, Value::Recursive(_))
    }

    /// The value with a recursive placeholder replaced by its target.
    pub fn resolve(&self) -> Result<Option<Value>> {
        match self {
            Value::Recursive(placeholder) => placeholder.resolve(),
            other => Ok(Some(other.clone())),
        }
    }

    pub fn to_raw(&self) -> RawValue {
        match self {
            Value::Node(node) => node.to_raw(),
            Value::Raw(raw) => raw.clone(),
            Value::Recursive(placeholder) => placeholder.raw().clone(),
        }
    }
}

/// Stand-in for a reference target that is already being built further up.
///
/// The target is only built when asked for, and then once.
#[derive(Clone)]
pub struct Placeholder(Arc<PlaceholderInner>);

struct PlaceholderInner {
    raw: RawValue,
    target: Context,
    factory: FactoryFn,
    resolved: OnceCell<Result<Option<Value>>>,
}

impl Placeholder {
    pub fn new(raw: RawValue, target: Context, factory: FactoryFn) -> Self {
        Placeholder(Arc::new(PlaceholderInner {
            raw,
            target,
            factory,
            resolved: OnceCell::new(),
        }))
    }

    /// The `$ref` mapping as written.
    pub fn raw(&self) -> &RawValue {
        &self.0.raw
    }

    pub fn reference(&self) -> Option<&str> {
        self.0.raw.as_map()?.get("$ref")?.as_str()
    }

    /// Where the target lives.
    pub fn target(&self) -> &Context {
        &self.0.target
    }

    /// Build the target node.
    pub fn resolve(&self) -> Result<Option<Value>> {
        self.0
            .resolved
            .get_or_init(|| (self.0.factory)(self.0.target.clone()).node())
            .clone()
    }
}

impl fmt::Debug for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Placeholder").field(&self.reference()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_access() {
        let context = Context::detached(None);
        let license = Node::map(
            context.next_field("license"),
            vec![("name".to_string(), Value::Raw(RawValue::from("MIT")))],
        );
        let root = Node::map(
            context,
            vec![
                ("title".to_string(), Value::Raw(RawValue::from("Pets"))),
                ("license".to_string(), Value::Node(license)),
            ],
        );

        assert!(root.is_map());
        assert_eq!(root.keys().collect::<Vec<_>>(), vec!["title", "license"]);
        assert_eq!(root.get_str("title"), Some("Pets"));
        assert_eq!(root.get_node("license").unwrap().get_str("name"), Some("MIT"));
        assert!(root.items().is_empty());
        assert_eq!(
            root.to_raw(),
            RawValue::map([
                ("title", RawValue::from("Pets")),
                ("license", RawValue::map([("name", RawValue::from("MIT"))])),
            ])
        );
    }

    #[test]
    fn test_ptr_eq() {
        let node = Node::array(Context::detached(None), vec![Value::Raw(RawValue::Integer(1))]);
        let copy = node.clone();
        let other = Node::array(Context::detached(None), vec![Value::Raw(RawValue::Integer(1))]);
        assert!(node.ptr_eq(&copy));
        assert!(!node.ptr_eq(&other));
        assert_eq!(node.len(), 1);
        assert!(node.entries().next().is_none());
    }
}
