//! Error types for YAML parsing with source locations.

use crate::SourceLocation;
use thiserror::Error;

/// Result type alias for openapi-yaml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing a document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// YAML syntax error
    #[error("Parse error: {message}")]
    ParseError {
        message: String,
        location: Option<SourceLocation>,
    },

    /// The input contained no document at all
    #[error("No YAML document found")]
    EmptyDocument,
}

impl Error {
    /// Location of the error, when the scanner reported one.
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Error::ParseError { location, .. } => location.as_ref(),
            Error::EmptyDocument => None,
        }
    }
}

impl From<yaml_rust2::ScanError> for Error {
    fn from(err: yaml_rust2::ScanError) -> Self {
        let location = SourceLocation::from_marker(err.marker(), 0);
        Error::ParseError {
            message: err.info().to_string(),
            location: Some(location),
        }
    }
}
