//! Immutable, normalized document trees.
//!
//! Every source is read once and normalized into a [`RawValue`]: mapping keys
//! become immutable text, nested structures are normalized recursively and the
//! result is shared through reference counting. Nothing in a `RawValue` is
//! mutated after construction, so slices of it can be handed to any number of
//! contexts and factories without copying.

use indexmap::IndexMap;
use openapi_yaml::YamlNode;
use std::fmt;
use std::sync::Arc;
use yaml_rust2::Yaml;

/// A normalized document value.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(Arc<str>),
    Array(Arc<[RawValue]>),
    Map(Arc<RawMap>),
}

/// An insertion-ordered mapping with text keys.
///
/// Equality compares entries regardless of order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawMap {
    entries: IndexMap<Arc<str>, RawValue>,
}

impl RawMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing an existing key in place.
    pub fn insert(&mut self, key: impl Into<Arc<str>>, value: RawValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(AsRef::as_ref)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.entries.iter().map(|(k, v)| (k.as_ref(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<Arc<str>>> FromIterator<(K, RawValue)> for RawMap {
    fn from_iter<I: IntoIterator<Item = (K, RawValue)>>(iter: I) -> Self {
        let mut map = RawMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl RawValue {
    /// Build a mapping value from key/value pairs.
    pub fn map<K: Into<Arc<str>>>(entries: impl IntoIterator<Item = (K, RawValue)>) -> Self {
        RawValue::Map(Arc::new(entries.into_iter().collect()))
    }

    /// Build a sequence value.
    pub fn array(items: impl IntoIterator<Item = RawValue>) -> Self {
        RawValue::Array(items.into_iter().collect())
    }

    pub fn string(s: impl Into<Arc<str>>) -> Self {
        RawValue::String(s.into())
    }

    /// Normalize a located YAML tree.
    pub fn from_yaml(node: &YamlNode) -> Self {
        if let Some(entries) = node.as_hash() {
            let map: RawMap = entries
                .iter()
                .map(|entry| (canonical_key(&entry.key), RawValue::from_yaml(&entry.value)))
                .collect();
            return RawValue::Map(Arc::new(map));
        }
        if let Some(items) = node.as_array() {
            return RawValue::array(items.iter().map(RawValue::from_yaml));
        }
        match &node.yaml {
            Yaml::Boolean(b) => RawValue::Bool(*b),
            Yaml::Integer(i) => RawValue::Integer(*i),
            Yaml::Real(s) => parse_real(s).map_or_else(|| RawValue::string(s.as_str()), RawValue::Float),
            Yaml::String(s) => RawValue::string(s.as_str()),
            _ => RawValue::Null,
        }
    }

    /// Normalize a JSON value.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => RawValue::Null,
            serde_json::Value::Bool(b) => RawValue::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => RawValue::Integer(i),
                None => RawValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => RawValue::string(s.as_str()),
            serde_json::Value::Array(items) => RawValue::array(items.iter().map(RawValue::from_json)),
            serde_json::Value::Object(map) => {
                RawValue::map(map.iter().map(|(k, v)| (k.as_str(), RawValue::from_json(v))))
            }
        }
    }

    /// Convert back to JSON; non-finite floats become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            RawValue::Null => serde_json::Value::Null,
            RawValue::Bool(b) => serde_json::Value::Bool(*b),
            RawValue::Integer(i) => serde_json::Value::Number((*i).into()),
            RawValue::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            RawValue::String(s) => serde_json::Value::String(s.to_string()),
            RawValue::Array(items) => serde_json::Value::Array(items.iter().map(RawValue::to_json).collect()),
            RawValue::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.to_string(), v.to_json())).collect(),
            ),
        }
    }

    /// Human-readable type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            RawValue::Null => "null",
            RawValue::Bool(_) => "boolean",
            RawValue::Integer(_) => "integer",
            RawValue::Float(_) => "number",
            RawValue::String(_) => "string",
            RawValue::Array(_) => "array",
            RawValue::Map(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RawValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RawValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RawValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Integer(i) => Some(*i as f64),
            RawValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&RawMap> {
        match self {
            RawValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[RawValue]> {
        match self {
            RawValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a path of mapping keys and sequence indices.
    pub fn dig<S: AsRef<str>>(&self, segments: &[S]) -> Option<&RawValue> {
        segments.iter().try_fold(self, |value, segment| {
            let segment = segment.as_ref();
            match value {
                RawValue::Map(map) => map.get(segment),
                RawValue::Array(items) => items.get(segment.parse::<usize>().ok()?),
                _ => None,
            }
        })
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::String(s) => write!(f, "{}", s),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::string(s)
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::string(s)
    }
}

impl From<i64> for RawValue {
    fn from(i: i64) -> Self {
        RawValue::Integer(i)
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        RawValue::Bool(b)
    }
}

impl From<&serde_json::Value> for RawValue {
    fn from(value: &serde_json::Value) -> Self {
        RawValue::from_json(value)
    }
}

/// Canonical text for a mapping key; complex keys are rendered as JSON.
fn canonical_key(key: &YamlNode) -> String {
    key.scalar_text()
        .unwrap_or_else(|| RawValue::from_yaml(key).to_json().to_string())
}

fn parse_real(s: &str) -> Option<f64> {
    match s.trim_start_matches('+') {
        ".inf" | ".Inf" | ".INF" => Some(f64::INFINITY),
        "-.inf" | "-.Inf" | "-.INF" => Some(f64::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" => Some(f64::NAN),
        other => other.parse::<f64>().ok(),
    }
}
