// Error types for document validation

use indexmap::IndexMap;
use openapi_yaml::SourceLocation;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the build path and by reference resolution.
///
/// The collection path (`errors()`) never produces these; it records
/// [`ValidationError`]s instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The first violation found while building a node
    #[error("Invalid data for {location}. {message}")]
    InvalidData {
        location: String,
        message: String,
        kind: ValidationErrorKind,
    },

    /// A malformed or unresolvable reference
    #[error("{message}")]
    Reference { message: String },

    /// The input could not be read or parsed
    #[error("{message}")]
    Input { message: String },
}

impl Error {
    pub fn reference(message: impl Into<String>) -> Self {
        Error::Reference {
            message: message.into(),
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Error::Input {
            message: message.into(),
        }
    }

    /// Build-path error for a validation error.
    pub fn invalid_data(error: &ValidationError) -> Self {
        Error::InvalidData {
            location: error.location.clone(),
            message: error.message(),
            kind: error.kind.clone(),
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Error::Reference { .. })
    }
}

impl From<openapi_yaml::Error> for Error {
    fn from(err: openapi_yaml::Error) -> Self {
        match err.location() {
            Some(location) => Error::input(format!("{} at {}", err, location)),
            None => Error::input(err.to_string()),
        }
    }
}

/// Structured validation error kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ValidationErrorKind {
    /// Container/scalar shape does not match
    ShapeMismatch { expected: String, got: String },

    /// One or more mapping keys are of the wrong type
    KeyType { expected: String, keys: Vec<String> },

    /// A field value is of the wrong type
    ValueType { expected: String, got: String },

    /// Required fields are absent
    MissingFields { fields: Vec<String> },

    /// Fields not declared for this object
    UnexpectedFields { fields: Vec<String> },

    /// Raised by a validation hook
    Custom { message: String },

    /// A `$ref` could not be followed
    Reference { message: String },
}

impl ValidationErrorKind {
    pub fn custom(message: impl Into<String>) -> Self {
        ValidationErrorKind::Custom {
            message: message.into(),
        }
    }

    /// Get the error code for this error kind
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationErrorKind::ShapeMismatch { .. } => "OA-1-10",
            ValidationErrorKind::KeyType { .. } => "OA-1-11",
            ValidationErrorKind::ValueType { .. } => "OA-1-12",
            ValidationErrorKind::MissingFields { .. } => "OA-1-13",
            ValidationErrorKind::UnexpectedFields { .. } => "OA-1-14",
            ValidationErrorKind::Reference { .. } => "OA-1-15",
            ValidationErrorKind::Custom { .. } => "OA-1-99",
        }
    }

    /// Format a human-readable message from this error kind
    pub fn message(&self) -> String {
        match self {
            ValidationErrorKind::ShapeMismatch { expected, got }
            | ValidationErrorKind::ValueType { expected, got } => {
                format!("Invalid type. Expected {}, got {}", expected, got)
            }
            ValidationErrorKind::KeyType { expected, keys } => format!(
                "Invalid keys. Expected keys to be of type {} ({})",
                expected,
                keys.join(", ")
            ),
            ValidationErrorKind::MissingFields { fields } => {
                format!("Missing required fields: {}", fields.join(", "))
            }
            ValidationErrorKind::UnexpectedFields { fields } => {
                format!("Unexpected fields: {}", fields.join(", "))
            }
            ValidationErrorKind::Custom { message } | ValidationErrorKind::Reference { message } => {
                message.clone()
            }
        }
    }
}

/// A violation found at a location in the document.
///
/// Two errors are equal when their location and message are equal.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The structured error kind
    pub kind: ValidationErrorKind,
    /// Location summary, e.g. `#/info/termsOfService`
    pub location: String,
    /// File/line/column of the offending node, when the source is located
    pub source_location: Option<SourceLocation>,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, location: impl Into<String>) -> Self {
        Self {
            kind,
            location: location.into(),
            source_location: None,
        }
    }

    pub fn with_source_location(mut self, source_location: Option<SourceLocation>) -> Self {
        self.source_location = source_location;
        self
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Get the human-readable message for this error
    pub fn message(&self) -> String {
        self.kind.message()
    }

    pub fn error_code(&self) -> &'static str {
        self.kind.error_code()
    }

    /// Machine-readable form used by the CLI's JSON output.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "code": self.error_code(),
            "location": self.location,
            "message": self.message(),
            "error_kind": self.kind,
            "source_location": self.source_location,
        })
    }
}

impl PartialEq for ValidationError {
    fn eq(&self, other: &Self) -> bool {
        self.location == other.location && self.message() == other.message()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source_location {
            Some(loc) => write!(f, "{} ({}): {}", self.location, loc, self.message()),
            None => write!(f, "{}: {}", self.location, self.message()),
        }
    }
}

impl std::error::Error for ValidationError {}

impl Serialize for ValidationError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Ordered collection of validation errors.
///
/// Within one container the order is the order checks ran in; merged child
/// collections follow their parent's own errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorCollection {
    errors: Vec<ValidationError>,
}

impl ErrorCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Append every error of another collection, keeping its order.
    pub fn merge(&mut self, other: &ErrorCollection) {
        self.errors.extend(other.errors.iter().cloned());
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    pub fn first(&self) -> Option<&ValidationError> {
        self.errors.first()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors grouped by location, in order of first appearance.
    pub fn group_by_location(&self) -> Vec<(&str, Vec<&ValidationError>)> {
        let mut groups: IndexMap<&str, Vec<&ValidationError>> = IndexMap::new();
        for error in &self.errors {
            groups.entry(error.location.as_str()).or_default().push(error);
        }
        groups.into_iter().collect()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(self.errors.iter().map(ValidationError::to_json).collect())
    }
}

impl fmt::Display for ErrorCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for error in &self.errors {
            writeln!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl Serialize for ErrorCollection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.errors)
    }
}

impl<'a> IntoIterator for &'a ErrorCollection {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl FromIterator<ValidationError> for ErrorCollection {
    fn from_iter<I: IntoIterator<Item = ValidationError>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}
