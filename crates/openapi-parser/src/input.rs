//! Input handles: where a source's raw document comes from.

use crate::error::{Error, Result};
use crate::reference::Reference;
use openapi_yaml::YamlNode;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Data produced by reading an input.
#[derive(Debug, Clone)]
pub enum InputData {
    /// A located YAML (or JSON) tree
    Yaml(YamlNode),
    /// An already-parsed JSON value; no line information
    Json(serde_json::Value),
}

/// A readable document that can also locate the documents it references.
pub trait Input: Send + Sync + fmt::Debug {
    /// Read and parse the whole document.
    fn read(&self) -> Result<InputData>;

    fn is_available(&self) -> bool;

    /// The input an external reference points at.
    fn resolve_next(&self, reference: &Reference) -> Result<Arc<dyn Input>>;

    /// Canonical identity used to deduplicate sources.
    fn identity(&self) -> String;
}

/// Named in-memory YAML or JSON text.
#[derive(Debug, Clone)]
pub struct StringInput {
    name: String,
    text: String,
}

impl StringInput {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

impl Input for StringInput {
    fn read(&self) -> Result<InputData> {
        Ok(InputData::Yaml(openapi_yaml::parse_file(&self.text, &self.name)?))
    }

    fn is_available(&self) -> bool {
        true
    }

    fn resolve_next(&self, reference: &Reference) -> Result<Arc<dyn Input>> {
        Err(Error::reference(format!(
            "cannot resolve {} from in-memory input {}",
            reference, self.name
        )))
    }

    fn identity(&self) -> String {
        format!("string:{}", self.name)
    }
}

/// A YAML or JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileInput {
    path: PathBuf,
}

impl FileInput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Input for FileInput {
    fn read(&self) -> Result<InputData> {
        debug!(path = %self.path.display(), "reading input file");
        let text = std::fs::read_to_string(&self.path).map_err(|err| {
            Error::input(format!("Failed to read {}: {}", self.path.display(), err))
        })?;
        let name = self.path.display().to_string();
        Ok(InputData::Yaml(openapi_yaml::parse_file(&text, &name)?))
    }

    fn is_available(&self) -> bool {
        self.path.is_file()
    }

    fn resolve_next(&self, reference: &Reference) -> Result<Arc<dyn Input>> {
        let resource = reference.resource();
        if resource.contains("://") {
            return Err(Error::reference(format!(
                "remote references are not supported: {}",
                reference
            )));
        }
        let base = self.path.parent().unwrap_or_else(|| Path::new(""));
        let next = FileInput::new(base.join(resource));
        if !next.is_available() {
            return Err(Error::reference(format!(
                "could not resolve reference {}: {} is not a readable file",
                reference,
                next.path.display()
            )));
        }
        Ok(Arc::new(next))
    }

    fn identity(&self) -> String {
        let path = std::fs::canonicalize(&self.path).unwrap_or_else(|_| self.path.clone());
        format!("file:{}", path.display())
    }
}

/// An in-memory JSON value.
#[derive(Debug, Clone)]
pub struct JsonInput {
    name: String,
    value: serde_json::Value,
}

impl JsonInput {
    pub fn new(name: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl Input for JsonInput {
    fn read(&self) -> Result<InputData> {
        Ok(InputData::Json(self.value.clone()))
    }

    fn is_available(&self) -> bool {
        true
    }

    fn resolve_next(&self, reference: &Reference) -> Result<Arc<dyn Input>> {
        Err(Error::reference(format!(
            "cannot resolve {} from in-memory input {}",
            reference, self.name
        )))
    }

    fn identity(&self) -> String {
        format!("json:{}", self.name)
    }
}
