//! YAML value with source location tracking.

use crate::SourceLocation;
use yaml_rust2::Yaml;

/// A YAML value with source location information.
///
/// Wraps an owned `yaml-rust2::Yaml` value together with the location of the
/// node and a parallel structure of located children:
///
/// - no children for scalars and null
/// - one node per element for sequences
/// - one [`YamlEntry`] per key/value pair for mappings, in input order
///
/// ```rust
/// use openapi_yaml::parse;
///
/// let yaml = parse("title: Pets").unwrap();
/// let title = yaml.get_hash_value("title").unwrap();
/// assert_eq!(title.yaml.as_str(), Some("Pets"));
/// assert_eq!(title.source_location.col, 8);
/// ```
#[derive(Debug, Clone)]
pub struct YamlNode {
    /// The complete yaml-rust2 value (owned).
    pub yaml: Yaml,

    /// Source location for this node.
    pub source_location: SourceLocation,

    /// Tag suffix, e.g. `str` for `!!str`.
    pub tag: Option<String>,

    children: Children,
}

#[derive(Debug, Clone)]
enum Children {
    None,
    Array(Vec<YamlNode>),
    Hash(Vec<YamlEntry>),
}

/// A key-value pair in a mapping.
#[derive(Debug, Clone)]
pub struct YamlEntry {
    pub key: YamlNode,
    pub value: YamlNode,
}

impl YamlNode {
    /// Create a node for a scalar or null.
    pub fn new_scalar(yaml: Yaml, source_location: SourceLocation) -> Self {
        Self {
            yaml,
            source_location,
            tag: None,
            children: Children::None,
        }
    }

    /// Create a node for a sequence.
    pub fn new_array(yaml: Yaml, source_location: SourceLocation, items: Vec<YamlNode>) -> Self {
        Self {
            yaml,
            source_location,
            tag: None,
            children: Children::Array(items),
        }
    }

    /// Create a node for a mapping.
    pub fn new_hash(yaml: Yaml, source_location: SourceLocation, entries: Vec<YamlEntry>) -> Self {
        Self {
            yaml,
            source_location,
            tag: None,
            children: Children::Hash(entries),
        }
    }

    pub fn with_tag(mut self, tag: Option<String>) -> Self {
        self.tag = tag;
        self
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.children, Children::None)
    }

    pub fn is_array(&self) -> bool {
        matches!(self.children, Children::Array(_))
    }

    pub fn is_hash(&self) -> bool {
        matches!(self.children, Children::Hash(_))
    }

    pub fn as_array(&self) -> Option<&[YamlNode]> {
        match &self.children {
            Children::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_hash(&self) -> Option<&[YamlEntry]> {
        match &self.children {
            Children::Hash(entries) => Some(entries),
            _ => None,
        }
    }

    /// Get a value from a mapping by key.
    ///
    /// Keys are compared by their scalar text, so `200` matches an integer
    /// key. When a key is repeated the last occurrence wins, matching how
    /// the value would be loaded.
    pub fn get_hash_value(&self, key: &str) -> Option<&YamlNode> {
        self.as_hash()?
            .iter()
            .rev()
            .find(|entry| entry.key.scalar_text().as_deref() == Some(key))
            .map(|entry| &entry.value)
    }

    pub fn get_array_item(&self, index: usize) -> Option<&YamlNode> {
        self.as_array()?.get(index)
    }

    /// Number of children (sequence length or mapping entry count).
    pub fn len(&self) -> usize {
        match &self.children {
            Children::None => 0,
            Children::Array(items) => items.len(),
            Children::Hash(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Text form of a scalar node, used for mapping keys.
    ///
    /// Returns `None` for sequences and mappings.
    pub fn scalar_text(&self) -> Option<String> {
        match &self.yaml {
            Yaml::String(s) | Yaml::Real(s) => Some(s.clone()),
            Yaml::Integer(i) => Some(i.to_string()),
            Yaml::Boolean(b) => Some(b.to_string()),
            Yaml::Null => Some("null".to_string()),
            _ => None,
        }
    }

    /// Follow a path of mapping keys and sequence indices.
    ///
    /// Segments addressing a sequence must be decimal indices. Returns `None`
    /// as soon as a segment cannot be followed.
    pub fn navigate<S: AsRef<str>>(&self, segments: &[S]) -> Option<&YamlNode> {
        let Some((segment, rest)) = segments.split_first() else {
            return Some(self);
        };
        let segment = segment.as_ref();
        let next = match &self.children {
            Children::Hash(_) => self.get_hash_value(segment)?,
            Children::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            Children::None => return None,
        };
        next.navigate(rest)
    }
}
