//! Location tokens threaded through every factory.

use crate::error::{Result, ValidationError, ValidationErrorKind};
use crate::input::JsonInput;
use crate::pointer::Pointer;
use crate::raw::RawValue;
use crate::source::{ResolvedReference, Source};
use openapi_yaml::SourceLocation;
use std::sync::Arc;

/// A place in a source.
#[derive(Debug, Clone)]
pub struct Location {
    pub source: Arc<Source>,
    pub pointer: Pointer,
}

impl Location {
    fn same_source(&self, source: &Arc<Source>) -> bool {
        Arc::ptr_eq(&self.source, source)
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.source, &other.source) && self.pointer == other.pointer
    }
}

/// The input at one place in the document, and how we got there.
///
/// The *document location* is the logical path from the root the caller
/// walked; the *source location* is where the data actually lives, which
/// differs once a reference has been followed. Contexts are cheap to clone
/// and never change.
#[derive(Debug, Clone)]
pub struct Context {
    input: Option<RawValue>,
    document_location: Pointer,
    source_location: Location,
    followed: Arc<Vec<Location>>,
}

impl Context {
    /// Root context over a source's whole document.
    pub fn root(source: Arc<Source>) -> Result<Self> {
        let input = source.contents()?.clone();
        Ok(Self::new(Some(input), source))
    }

    /// Root context with an explicit input, which may be absent.
    pub fn new(input: Option<RawValue>, source: Arc<Source>) -> Self {
        Self {
            input,
            document_location: Pointer::root(),
            source_location: Location {
                source,
                pointer: Pointer::root(),
            },
            followed: Arc::new(Vec::new()),
        }
    }

    /// Root context over a standalone in-memory document holding `input`.
    pub fn detached(input: Option<RawValue>) -> Self {
        let json = input.as_ref().map_or(serde_json::Value::Null, RawValue::to_json);
        let source = Source::new(Arc::new(JsonInput::new("inline", json)));
        Self::new(input, source)
    }

    /// Child context for a mapping key.
    pub fn next_field(&self, key: &str) -> Self {
        let input = self
            .input
            .as_ref()
            .and_then(RawValue::as_map)
            .and_then(|map| map.get(key))
            .cloned();
        self.descend(key.to_string(), input)
    }

    /// Child context for a sequence index.
    pub fn next_index(&self, index: usize) -> Self {
        let input = self
            .input
            .as_ref()
            .and_then(RawValue::as_array)
            .and_then(|items| items.get(index))
            .cloned();
        self.descend(index.to_string(), input)
    }

    fn descend(&self, segment: String, input: Option<RawValue>) -> Self {
        Self {
            input: input.filter(is_present),
            document_location: self.document_location.child(segment.clone()),
            source_location: Location {
                source: Arc::clone(&self.source_location.source),
                pointer: self.source_location.pointer.child(segment),
            },
            followed: Arc::clone(&self.followed),
        }
    }

    /// The context for a reference target: same document location, with the
    /// data and source location of the target.
    pub fn resolved_reference(&self, source: Arc<Source>, resolved: ResolvedReference) -> Self {
        let target = Location {
            source,
            pointer: resolved.pointer,
        };
        let mut followed = self.followed.as_ref().clone();
        followed.push(target.clone());
        Self {
            input: Some(resolved.value).filter(is_present),
            document_location: self.document_location.clone(),
            source_location: target,
            followed: Arc::new(followed),
        }
    }

    /// The same location with a different input, used for defaults.
    pub fn with_input(&self, input: Option<RawValue>) -> Self {
        Self {
            input,
            ..self.clone()
        }
    }

    pub fn input(&self) -> Option<&RawValue> {
        self.input.as_ref()
    }

    pub fn document_location(&self) -> &Pointer {
        &self.document_location
    }

    pub fn source(&self) -> &Arc<Source> {
        &self.source_location.source
    }

    pub fn source_pointer(&self) -> &Pointer {
        &self.source_location.pointer
    }

    /// True once at least one reference has been followed.
    pub fn is_referenced(&self) -> bool {
        !self.followed.is_empty()
    }

    /// Line and column of the input, when the source is located.
    pub fn source_location(&self) -> Option<SourceLocation> {
        self.source().source_location_at(self.source_pointer().segments())
    }

    /// Human-readable location, e.g. `#/info/termsOfService`.
    ///
    /// Data reached through a reference also names where it lives:
    /// `#/components/schemas/Dog/items (#/components/schemas/Pet)`.
    pub fn location_summary(&self) -> String {
        if !self.is_referenced() {
            return self.document_location.to_string();
        }
        let source = self.source();
        if source.parent().is_some() {
            format!(
                "{} ({}{})",
                self.document_location,
                source.identity(),
                self.source_pointer()
            )
        } else {
            format!("{} ({})", self.document_location, self.source_pointer())
        }
    }

    /// Whether following a reference to `target` would revisit data already
    /// on the current path.
    ///
    /// That is the case when the target was followed before, or when it is
    /// an ancestor of the current location or of any followed target.
    pub fn is_recursive(&self, source: &Arc<Source>, target: &Pointer) -> bool {
        std::iter::once(&self.source_location)
            .chain(self.followed.iter())
            .any(|location| location.same_source(source) && location.pointer.starts_with(target))
    }

    /// A validation error located here.
    pub fn error(&self, kind: ValidationErrorKind) -> ValidationError {
        ValidationError::new(kind, self.location_summary()).with_source_location(self.source_location())
    }
}

/// A `null` value below the root counts as absent.
fn is_present(value: &RawValue) -> bool {
    !value.is_null()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::StringInput;

    fn context(text: &str) -> Context {
        let source = Source::new(Arc::new(StringInput::new("api.yaml", text)));
        Context::root(source).unwrap()
    }

    #[test]
    fn test_next_field_appends_one_segment() {
        let root = context("info:\n  title: Pets\n");
        let info = root.next_field("info");
        let title = info.next_field("title");

        assert_eq!(title.document_location().segments(), ["info", "title"]);
        assert_eq!(title.input().and_then(RawValue::as_str), Some("Pets"));
        assert_eq!(title.location_summary(), "#/info/title");
        assert_eq!(title.source_location().unwrap().line, 2);
    }

    #[test]
    fn test_missing_field_has_absent_input() {
        let root = context("info: {}\n");
        let missing = root.next_field("info").next_field("title");
        assert!(missing.input().is_none());
        assert!(missing.source_location().is_none());
    }

    #[test]
    fn test_null_field_has_absent_input() {
        let root = context("info:\n  title: ~\n  version: null\nservers: [~]\n");
        let info = root.next_field("info");
        assert!(info.next_field("title").input().is_none());
        assert!(info.next_field("version").input().is_none());
        assert!(root.next_field("servers").next_index(0).input().is_none());
    }

    #[test]
    fn test_next_index() {
        let root = context("servers:\n  - url: a\n  - url: b\n");
        let second = root.next_field("servers").next_index(1);
        assert_eq!(second.location_summary(), "#/servers/1");
        assert_eq!(
            second.next_field("url").input().and_then(RawValue::as_str),
            Some("b")
        );
    }

    #[test]
    fn test_resolved_reference_keeps_document_location() {
        let root = context("a:\n  $ref: '#/b'\nb:\n  c: 1\n");
        let field = root.next_field("a");
        let resolved = root.source().resolve_reference("#/b").unwrap();
        let target = field.resolved_reference(Arc::clone(root.source()), resolved);

        assert_eq!(target.location_summary(), "#/a (#/b)");
        assert_eq!(target.next_field("c").location_summary(), "#/a/c (#/b/c)");
        assert!(target.is_referenced());
    }

    #[test]
    fn test_recursion_detection() {
        let root = context("a:\n  b:\n    $ref: '#/a'\n");
        let inner = root.next_field("a").next_field("b");
        let source = Arc::clone(root.source());

        assert!(inner.is_recursive(&source, &Pointer::from_segments(["a"])));
        assert!(!inner.is_recursive(&source, &Pointer::from_segments(["c"])));
    }

    #[test]
    fn test_error_location() {
        let root = context("termsOfService: nope\n");
        let error = root
            .next_field("termsOfService")
            .error(ValidationErrorKind::custom("Expected a valid URL"));
        assert_eq!(error.location(), "#/termsOfService");
        assert_eq!(error.source_location.unwrap().line, 1);
    }
}
