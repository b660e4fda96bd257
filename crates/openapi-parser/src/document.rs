//! Whole-document entry point.

use crate::context::Context;
use crate::error::{Error, ErrorCollection, Result};
use crate::factory::NodeFactory;
use crate::input::{FileInput, Input, JsonInput, StringInput};
use crate::node::Value;
use crate::openapi::{OpenApi, openapi_factory};
use crate::raw::RawValue;
use crate::source::{Source, SourceRegistry};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// An OpenAPI document loaded from an input, with every source it reaches.
///
/// Validation and building are lazy and cached; a `Document` can be shared
/// between threads.
pub struct Document {
    registry: Arc<SourceRegistry>,
    source: Arc<Source>,
    factory: Box<dyn NodeFactory>,
}

impl Document {
    /// Load the document behind `input`. Fails only when the input cannot be
    /// read or parsed.
    pub fn from_input(input: Arc<dyn Input>) -> Result<Self> {
        let registry = SourceRegistry::new();
        let source = registry.register_root(input);
        debug!(source = %source.identity(), "loading document");
        let context = Context::root(Arc::clone(&source))?;
        let factory = openapi_factory()(context);
        Ok(Self {
            registry,
            source,
            factory,
        })
    }

    /// Load YAML or JSON text; `name` is used in diagnostics.
    pub fn from_yaml_str(name: &str, text: &str) -> Result<Self> {
        Self::from_input(Arc::new(StringInput::new(name, text)))
    }

    pub fn from_json(name: &str, value: serde_json::Value) -> Result<Self> {
        Self::from_input(Arc::new(JsonInput::new(name, value)))
    }

    /// Load a file. Relative external references resolve against its
    /// directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let input = FileInput::new(path.as_ref());
        if !input.is_available() {
            return Err(Error::input(format!(
                "File not found: {}",
                path.as_ref().display()
            )));
        }
        Self::from_input(Arc::new(input))
    }

    /// Every violation in the document, referenced sources included.
    pub fn errors(&self) -> &ErrorCollection {
        let errors = self.factory.errors();
        info!(
            source = %self.source.identity(),
            errors = errors.len(),
            "validated document"
        );
        errors
    }

    pub fn is_valid(&self) -> bool {
        self.factory.is_valid()
    }

    /// The built root object, or the first violation.
    pub fn root(&self) -> Result<OpenApi> {
        match self.factory.node()? {
            Some(Value::Node(node)) => Ok(OpenApi::new(node)),
            _ => Err(Error::input(format!(
                "{} does not contain an OpenAPI object",
                self.source.identity()
            ))),
        }
    }

    /// The document with every followed reference replaced by its target.
    pub fn resolved_input(&self) -> Option<RawValue> {
        self.factory.resolved_input()
    }

    /// The raw contents of the root source.
    pub fn contents(&self) -> Result<&RawValue> {
        self.source.contents()
    }

    pub fn source(&self) -> &Arc<Source> {
        &self.source
    }

    /// The root source followed by every external source reached so far.
    pub fn sources(&self) -> Vec<Arc<Source>> {
        self.registry.sources()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("source", &self.source)
            .field("sources", &self.registry.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PETS: &str = "\
openapi: 3.0.3
info:
  title: Pets
  version: '1.0'
paths: {}
";

    #[test]
    fn test_valid_document() {
        let document = Document::from_yaml_str("pets.yaml", PETS).unwrap();
        assert!(document.is_valid());
        let root = document.root().unwrap();
        assert_eq!(root.info().unwrap().version(), "1.0");
        assert_eq!(document.sources().len(), 1);
    }

    #[test]
    fn test_parse_failure() {
        let error = Document::from_yaml_str("broken.yaml", "openapi: [3.0\n").unwrap_err();
        assert!(matches!(error, Error::Input { .. }));
    }

    #[test]
    fn test_root_of_invalid_document() {
        let document = Document::from_yaml_str("pets.yaml", "openapi: 3.0.3\n").unwrap();
        assert!(!document.is_valid());
        let error = document.root().unwrap_err();
        assert_eq!(
            error.to_string(),
            "Invalid data for #/. Missing required fields: info"
        );
    }

    #[test]
    fn test_null_document_is_invalid() {
        let document = Document::from_yaml_str("empty.yaml", "~\n").unwrap();
        assert!(!document.is_valid());
        assert_eq!(
            document.errors().first().unwrap().message(),
            "Invalid type. Expected Object, got null"
        );
    }

    #[test]
    fn test_missing_file() {
        let error = Document::open("/nonexistent/openapi.yaml").unwrap_err();
        assert_eq!(error.to_string(), "File not found: /nonexistent/openapi.yaml");
    }
}
