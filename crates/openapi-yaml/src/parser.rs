//! YAML parser that builds located `YamlNode` trees.

use crate::{Error, Result, SourceLocation, YamlEntry, YamlNode};
use std::collections::HashMap;
use yaml_rust2::Yaml;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser, Tag};
use yaml_rust2::scanner::{Marker, TScalarStyle};

/// Parse YAML (or JSON) from a string.
///
/// Only the first document of a multi-document stream is parsed.
///
/// ```rust
/// use openapi_yaml::parse;
///
/// let yaml = parse(r#"{"openapi": "3.0.3"}"#).unwrap();
/// assert!(yaml.is_hash());
/// ```
///
/// # Errors
///
/// Returns an error if the text is not valid YAML or contains no document.
pub fn parse(content: &str) -> Result<YamlNode> {
    parse_impl(content, None)
}

/// Parse YAML from a string with an associated filename.
///
/// The filename is recorded in every node's [`SourceLocation`].
///
/// ```rust
/// use openapi_yaml::parse_file;
///
/// let yaml = parse_file("openapi: 3.0.3", "api.yaml").unwrap();
/// assert_eq!(yaml.source_location.file, Some("api.yaml".into()));
/// ```
///
/// # Errors
///
/// Returns an error if the text is not valid YAML or contains no document.
pub fn parse_file(content: &str, filename: &str) -> Result<YamlNode> {
    parse_impl(content, Some(filename))
}

fn parse_impl(content: &str, filename: Option<&str>) -> Result<YamlNode> {
    let mut parser = Parser::new_from_str(content);
    let mut builder = YamlBuilder::new(filename);

    parser.load(&mut builder, false).map_err(|err| {
        let mut error = Error::from(err);
        if let (Error::ParseError { location: Some(loc), .. }, Some(file)) = (&mut error, filename) {
            loc.file = Some(file.to_string());
        }
        error
    })?;

    builder.result()
}

/// Event receiver that assembles the located tree.
struct YamlBuilder {
    filename: Option<String>,

    /// Stack of collections being constructed
    stack: Vec<BuildNode>,

    /// Completed nodes by anchor id, for alias expansion
    anchors: HashMap<usize, YamlNode>,

    root: Option<YamlNode>,

    /// First structural problem seen; the event stream itself cannot fail
    error: Option<Error>,
}

enum BuildNode {
    Sequence {
        start_marker: Marker,
        anchor_id: usize,
        tag: Option<String>,
        items: Vec<YamlNode>,
    },
    Mapping {
        start_marker: Marker,
        anchor_id: usize,
        tag: Option<String>,
        entries: Vec<(YamlNode, Option<YamlNode>)>,
    },
}

impl YamlBuilder {
    fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(|s| s.to_string()),
            stack: Vec::new(),
            anchors: HashMap::new(),
            root: None,
            error: None,
        }
    }

    fn result(self) -> Result<YamlNode> {
        if let Some(error) = self.error {
            return Err(error);
        }
        self.root.ok_or(Error::EmptyDocument)
    }

    fn structural_error(&mut self, message: &str, marker: &Marker) {
        if self.error.is_none() {
            self.error = Some(Error::ParseError {
                message: message.to_string(),
                location: Some(self.make_location(marker, 0)),
            });
        }
    }

    fn push_complete(&mut self, node: YamlNode, anchor_id: usize) {
        if anchor_id > 0 {
            self.anchors.insert(anchor_id, node.clone());
        }

        match self.stack.last_mut() {
            None => self.root = Some(node),
            Some(BuildNode::Sequence { items, .. }) => items.push(node),
            Some(BuildNode::Mapping { entries, .. }) => match entries.last_mut() {
                Some((_, value @ None)) => *value = Some(node),
                _ => entries.push((node, None)),
            },
        }
    }

    fn make_location(&self, marker: &Marker, len: usize) -> SourceLocation {
        let location = SourceLocation::from_marker(marker, len);
        match &self.filename {
            Some(filename) => location.with_file(filename.clone()),
            None => location,
        }
    }

    fn finish_sequence(&mut self, end: &Marker) {
        let Some(BuildNode::Sequence {
            start_marker,
            anchor_id,
            tag,
            items,
        }) = self.stack.pop()
        else {
            self.structural_error("sequence end without a matching start", end);
            return;
        };

        let len = end.index().saturating_sub(start_marker.index());
        let location = self.make_location(&start_marker, len);
        let yaml = Yaml::Array(items.iter().map(|n| n.yaml.clone()).collect());
        let node = YamlNode::new_array(yaml, location, items).with_tag(tag);
        self.push_complete(node, anchor_id);
    }

    fn finish_mapping(&mut self, end: &Marker) {
        let Some(BuildNode::Mapping {
            start_marker,
            anchor_id,
            tag,
            entries,
        }) = self.stack.pop()
        else {
            self.structural_error("mapping end without a matching start", end);
            return;
        };

        let len = end.index().saturating_sub(start_marker.index());
        let location = self.make_location(&start_marker, len);

        let mut yaml_hash = yaml_rust2::yaml::Hash::new();
        let mut located = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let Some(value) = value else {
                self.structural_error("mapping key without a value", end);
                continue;
            };
            yaml_hash.insert(key.yaml.clone(), value.yaml.clone());
            located.push(YamlEntry { key, value });
        }

        let node = YamlNode::new_hash(Yaml::Hash(yaml_hash), location, located).with_tag(tag);
        self.push_complete(node, anchor_id);
    }
}

impl MarkedEventReceiver for YamlBuilder {
    fn on_event(&mut self, ev: Event, marker: Marker) {
        match ev {
            Event::Scalar(value, style, anchor_id, tag) => {
                let len = scalar_len(&value, style);
                let location = self.make_location(&marker, len);
                let tag = tag.map(tag_suffix);
                let yaml = match (&tag, style) {
                    (Some(tag), _) => tagged_scalar_value(&value, tag),
                    (None, TScalarStyle::Plain) => plain_scalar_value(&value),
                    (None, _) => Yaml::String(value),
                };
                let node = YamlNode::new_scalar(yaml, location).with_tag(tag);
                self.push_complete(node, anchor_id);
            }

            Event::SequenceStart(anchor_id, tag) => {
                self.stack.push(BuildNode::Sequence {
                    start_marker: marker,
                    anchor_id,
                    tag: tag.map(tag_suffix),
                    items: Vec::new(),
                });
            }

            Event::SequenceEnd => self.finish_sequence(&marker),

            Event::MappingStart(anchor_id, tag) => {
                self.stack.push(BuildNode::Mapping {
                    start_marker: marker,
                    anchor_id,
                    tag: tag.map(tag_suffix),
                    entries: Vec::new(),
                });
            }

            Event::MappingEnd => self.finish_mapping(&marker),

            Event::Alias(anchor_id) => {
                let node = match self.anchors.get(&anchor_id) {
                    Some(anchored) => anchored.clone(),
                    None => YamlNode::new_scalar(Yaml::Null, self.make_location(&marker, 0)),
                };
                self.push_complete(node, 0);
            }

            // Stream and document boundaries carry nothing we keep
            _ => {}
        }
    }
}

fn tag_suffix(tag: Tag) -> String {
    tag.suffix
}

fn scalar_len(value: &str, style: TScalarStyle) -> usize {
    match style {
        TScalarStyle::SingleQuoted | TScalarStyle::DoubleQuoted => value.len() + 2,
        _ => value.len(),
    }
}

/// Type a plain scalar with the YAML 1.2 core schema.
fn plain_scalar_value(value: &str) -> Yaml {
    match value {
        "" | "~" | "null" | "Null" | "NULL" => return Yaml::Null,
        "true" | "True" | "TRUE" => return Yaml::Boolean(true),
        "false" | "False" | "FALSE" => return Yaml::Boolean(false),
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" | "-.inf" | "-.Inf" | "-.INF"
        | ".nan" | ".NaN" | ".NAN" => return Yaml::Real(value.to_string()),
        _ => {}
    }

    if let Ok(i) = value.parse::<i64>() {
        return Yaml::Integer(i);
    }
    if let Some(hex) = value.strip_prefix("0x")
        && let Ok(i) = i64::from_str_radix(hex, 16)
    {
        return Yaml::Integer(i);
    }
    if let Some(octal) = value.strip_prefix("0o")
        && let Ok(i) = i64::from_str_radix(octal, 8)
    {
        return Yaml::Integer(i);
    }
    if looks_numeric(value) && value.parse::<f64>().is_ok() {
        return Yaml::Real(value.to_string());
    }

    Yaml::String(value.to_string())
}

/// Rust accepts `inf` and `NaN` as floats; YAML does not.
fn looks_numeric(value: &str) -> bool {
    let digits = value.trim_start_matches(['-', '+']);
    digits
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '.')
        && digits.chars().any(|c| c.is_ascii_digit())
}

/// Type a scalar carrying an explicit `!!` tag.
fn tagged_scalar_value(value: &str, tag: &str) -> Yaml {
    match tag {
        "int" => value
            .parse::<i64>()
            .map_or_else(|_| Yaml::String(value.to_string()), Yaml::Integer),
        "float" => Yaml::Real(value.to_string()),
        "bool" => match value {
            "true" | "True" | "TRUE" => Yaml::Boolean(true),
            "false" | "False" | "FALSE" => Yaml::Boolean(false),
            _ => Yaml::String(value.to_string()),
        },
        "null" => Yaml::Null,
        _ => Yaml::String(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalar() {
        let yaml = parse("hello").unwrap();
        assert!(yaml.is_scalar());
        assert_eq!(yaml.yaml.as_str(), Some("hello"));
    }

    #[test]
    fn test_parse_integer_and_float() {
        assert_eq!(parse("42").unwrap().yaml.as_i64(), Some(42));
        assert_eq!(parse("0x1F").unwrap().yaml.as_i64(), Some(31));
        assert!(matches!(parse("1.5").unwrap().yaml, Yaml::Real(_)));
    }

    #[test]
    fn test_quoted_scalars_stay_strings() {
        let yaml = parse(r#"{"version": "1.0", "count": "3", "flag": 'true'}"#).unwrap();
        assert_eq!(yaml.get_hash_value("version").unwrap().yaml.as_str(), Some("1.0"));
        assert_eq!(yaml.get_hash_value("count").unwrap().yaml.as_str(), Some("3"));
        assert_eq!(yaml.get_hash_value("flag").unwrap().yaml.as_str(), Some("true"));
    }

    #[test]
    fn test_core_schema_words() {
        assert_eq!(parse("yes").unwrap().yaml.as_str(), Some("yes"));
        assert_eq!(parse("inf").unwrap().yaml.as_str(), Some("inf"));
        assert_eq!(parse("3.0.3").unwrap().yaml.as_str(), Some("3.0.3"));
        assert_eq!(parse("TRUE").unwrap().yaml.as_bool(), Some(true));
        assert!(parse("~").unwrap().yaml.is_null());
    }

    #[test]
    fn test_explicit_tags() {
        let yaml = parse("a: !!str 123\nb: !!int '7'").unwrap();
        assert_eq!(yaml.get_hash_value("a").unwrap().yaml.as_str(), Some("123"));
        assert_eq!(yaml.get_hash_value("a").unwrap().tag.as_deref(), Some("str"));
        assert_eq!(yaml.get_hash_value("b").unwrap().yaml.as_i64(), Some(7));
    }

    #[test]
    fn test_parse_array() {
        let yaml = parse("[1, 2, 3]").unwrap();
        assert!(yaml.is_array());
        let items = yaml.as_array().unwrap();
        assert_eq!(items[2].yaml.as_i64(), Some(3));
    }

    #[test]
    fn test_parse_hash_keeps_order() {
        let yaml = parse("zeta: 1\nalpha: 2\nmid: 3").unwrap();
        let keys: Vec<String> = yaml
            .as_hash()
            .unwrap()
            .iter()
            .filter_map(|e| e.key.scalar_text())
            .collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_aliases_are_expanded() {
        let yaml = parse("base: &base\n  name: MIT\nlicense: *base\n").unwrap();
        let license = yaml.get_hash_value("license").unwrap();
        assert!(license.is_hash());
        assert_eq!(license.get_hash_value("name").unwrap().yaml.as_str(), Some("MIT"));
    }

    #[test]
    fn test_source_location_tracking() {
        let yaml = parse("info:\n  title: Pets\n").unwrap();
        let title = yaml.navigate(&["info", "title"]).unwrap();
        assert_eq!(title.source_location.line, 2);
        assert_eq!(title.source_location.col, 10);
        assert_eq!(title.source_location.len, 4);
    }

    #[test]
    fn test_parse_with_filename() {
        let yaml = parse_file("title: Test", "api.yaml").unwrap();
        assert_eq!(yaml.source_location.file, Some("api.yaml".into()));
    }

    #[test]
    fn test_syntax_error_has_location() {
        let err = parse_file("a: [1, 2", "broken.yaml").unwrap_err();
        let location = err.location().unwrap();
        assert_eq!(location.file.as_deref(), Some("broken.yaml"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse("").unwrap_err(), Error::EmptyDocument);
    }
}
