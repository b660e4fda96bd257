//! Sources: one loaded document each, plus the registry that deduplicates
//! them across references.

use crate::error::{Error, Result};
use crate::input::{Input, InputData};
use crate::pointer::Pointer;
use crate::raw::RawValue;
use crate::reference::Reference;
use once_cell::sync::OnceCell;
use openapi_yaml::{SourceLocation, YamlNode};
use std::fmt;
use std::sync::{Arc, Mutex, Weak};
use tracing::debug;

/// A value found by following an anchor pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedReference {
    pub value: RawValue,
    pub pointer: Pointer,
}

#[derive(Debug)]
struct Contents {
    raw: RawValue,
    yaml: Option<YamlNode>,
}

/// One logical document.
///
/// The raw document is read and normalized on first access and cached,
/// failure included. Nothing else about a source changes after construction.
pub struct Source {
    input: Arc<dyn Input>,
    identity: String,
    parent: Option<Arc<Source>>,
    registry: Weak<SourceRegistry>,
    contents: OnceCell<Result<Contents>>,
}

impl Source {
    /// A source outside any registry; external references from it are not
    /// deduplicated.
    pub fn new(input: Arc<dyn Input>) -> Arc<Self> {
        Arc::new(Self::build(input, None, Weak::new()))
    }

    fn build(input: Arc<dyn Input>, parent: Option<Arc<Source>>, registry: Weak<SourceRegistry>) -> Self {
        let identity = input.identity();
        Self {
            input,
            identity,
            parent,
            registry,
            contents: OnceCell::new(),
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn input(&self) -> &Arc<dyn Input> {
        &self.input
    }

    /// The source whose reference led here, if any.
    pub fn parent(&self) -> Option<&Arc<Source>> {
        self.parent.as_ref()
    }

    /// The normalized document.
    pub fn contents(&self) -> Result<&RawValue> {
        self.loaded().map(|contents| &contents.raw)
    }

    /// The located tree behind the contents, when the input had one.
    pub fn yaml(&self) -> Option<&YamlNode> {
        self.loaded().ok()?.yaml.as_ref()
    }

    fn loaded(&self) -> Result<&Contents> {
        self.contents
            .get_or_init(|| {
                debug!(source = %self.identity, "loading source");
                Ok(match self.input.read()? {
                    InputData::Yaml(yaml) => Contents {
                        raw: RawValue::from_yaml(&yaml),
                        yaml: Some(yaml),
                    },
                    InputData::Json(json) => Contents {
                        raw: RawValue::from_json(&json),
                        yaml: None,
                    },
                })
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Follow an anchor pointer (`#/a/b`) within this document.
    pub fn resolve_reference(&self, pointer: &str) -> Result<ResolvedReference> {
        if !Reference::parse(pointer).is_anchor() {
            return Err(Error::reference(format!(
                "only anchor references are currently supported: {}",
                pointer
            )));
        }
        let parsed = Pointer::parse_fragment(pointer)?;
        self.contents()?;
        let value = self
            .data_at_pointer(parsed.segments())
            .ok_or_else(|| Error::reference(format!("could not resolve reference {}", pointer)))?;
        debug!(source = %self.identity, pointer, "resolved reference");
        Ok(ResolvedReference {
            value,
            pointer: parsed,
        })
    }

    /// The source a reference's resource part names.
    ///
    /// Fragment-only references resolve against this source, not the root
    /// document.
    pub fn resolve_source(self: &Arc<Self>, reference: &Reference) -> Result<Arc<Source>> {
        if reference.is_only_fragment() {
            return Ok(Arc::clone(self));
        }
        let next = self.input.resolve_next(reference)?;
        match self.registry.upgrade() {
            Some(registry) => Ok(registry.source_for(next, self)),
            None => Ok(Arc::new(Source::build(next, Some(Arc::clone(self)), Weak::new()))),
        }
    }

    /// The value at a path; the whole document for an empty path.
    pub fn data_at_pointer<S: AsRef<str>>(&self, segments: &[S]) -> Option<RawValue> {
        self.contents().ok()?.dig(segments).cloned()
    }

    pub fn has_pointer<S: AsRef<str>>(&self, segments: &[S]) -> bool {
        self.data_at_pointer(segments).is_some()
    }

    /// Line and column of the node at a path.
    pub fn source_location_at<S: AsRef<str>>(&self, segments: &[S]) -> Option<SourceLocation> {
        self.yaml()?
            .navigate(segments)
            .map(|node| node.source_location.clone())
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("identity", &self.identity)
            .field("parent", &self.parent.as_ref().map(|p| p.identity.as_str()))
            .field("loaded", &self.contents.get().is_some())
            .finish()
    }
}

/// Every source of one document, keyed by input identity.
///
/// Two references reaching the same external document share one `Source`,
/// so it is read and normalized once.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    sources: Mutex<Vec<Arc<Source>>>,
}

impl SourceRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register the document's root source.
    pub fn register_root(self: &Arc<Self>, input: Arc<dyn Input>) -> Arc<Source> {
        self.find_or_insert(input, None)
    }

    /// The source for an input reached from `parent`, reusing a registered
    /// one with the same identity.
    pub fn source_for(self: &Arc<Self>, input: Arc<dyn Input>, parent: &Arc<Source>) -> Arc<Source> {
        self.find_or_insert(input, Some(Arc::clone(parent)))
    }

    fn find_or_insert(self: &Arc<Self>, input: Arc<dyn Input>, parent: Option<Arc<Source>>) -> Arc<Source> {
        let identity = input.identity();
        let mut sources = self.sources.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(existing) = sources.iter().find(|source| source.identity == identity) {
            return Arc::clone(existing);
        }
        debug!(source = %identity, "registering source");
        let source = Arc::new(Source::build(input, parent, Arc::downgrade(self)));
        sources.push(Arc::clone(&source));
        source
    }

    /// Registered sources in registration order.
    pub fn sources(&self) -> Vec<Arc<Source>> {
        self.sources
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.sources().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{FileInput, JsonInput, StringInput};
    use serde_json::json;

    fn widgets() -> Arc<Source> {
        Source::new(Arc::new(JsonInput::new(
            "widgets",
            json!({"components": {"widgets": {"x": 1}}}),
        )))
    }

    #[test]
    fn test_resolves_anchor_pointer() {
        let resolved = widgets().resolve_reference("#/components/widgets/x").unwrap();
        assert_eq!(resolved.value, RawValue::Integer(1));
        assert_eq!(resolved.pointer.segments(), ["components", "widgets", "x"]);
    }

    #[test]
    fn test_missing_pointer_is_a_reference_error() {
        let err = widgets().resolve_reference("#/components/missing").unwrap_err();
        assert!(err.is_reference());
        assert!(err.to_string().contains("could not resolve reference"));
    }

    #[test]
    fn test_non_anchor_is_rejected() {
        let err = widgets().resolve_reference("widgets.yaml#/x").unwrap_err();
        assert!(err.is_reference());
        assert!(err
            .to_string()
            .contains("only anchor references are currently supported"));
    }

    #[test]
    fn test_contents_are_memoized() {
        let source = widgets();
        let first = source.contents().unwrap() as *const RawValue;
        let second = source.contents().unwrap() as *const RawValue;
        assert_eq!(first, second);
    }

    #[test]
    fn test_data_at_pointer() {
        let source = widgets();
        assert_eq!(source.data_at_pointer::<&str>(&[]), Some(source.contents().unwrap().clone()));
        assert!(source.has_pointer(&["components", "widgets"]));
        assert!(!source.has_pointer(&["components", "gadgets"]));
    }

    #[test]
    fn test_fragment_only_resolves_to_self() {
        let source = widgets();
        let resolved = source.resolve_source(&Reference::parse("#/x")).unwrap();
        assert!(Arc::ptr_eq(&source, &resolved));
    }

    #[test]
    fn test_source_location_at() {
        let source = Source::new(Arc::new(StringInput::new(
            "api.yaml",
            "info:\n  title: Pets\n",
        )));
        let location = source.source_location_at(&["info", "title"]).unwrap();
        assert_eq!((location.line, location.col), (2, 10));
        assert!(source.source_location_at(&["info", "version"]).is_none());
    }

    #[test]
    fn test_load_failure_is_cached() {
        let source = Source::new(Arc::new(StringInput::new("bad.yaml", "a: [1")));
        assert!(source.contents().is_err());
        assert!(source.contents().is_err());
        assert!(source.data_at_pointer::<&str>(&[]).is_none());
    }

    #[test]
    fn test_registry_deduplicates_external_sources() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("api.yaml"), "a: 1\n").unwrap();
        std::fs::write(dir.path().join("common.yaml"), "x: 2\n").unwrap();

        let registry = SourceRegistry::new();
        let root = registry.register_root(Arc::new(FileInput::new(dir.path().join("api.yaml"))));

        let first = root.resolve_source(&Reference::parse("common.yaml#/x")).unwrap();
        let second = root.resolve_source(&Reference::parse("./common.yaml#/x")).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(first.parent().unwrap(), &root));
        assert_eq!(registry.len(), 2);
        assert_eq!(first.resolve_reference("#/x").unwrap().value, RawValue::Integer(2));
    }
}
