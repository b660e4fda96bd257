//! Source location information for YAML nodes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a node in the original source text.
///
/// Lines and columns are 1-based; offsets and lengths are in bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Optional filename or source identifier
    pub file: Option<String>,

    /// Byte offset from start of source (0-based)
    pub offset: usize,

    /// Line number (1-based)
    pub line: usize,

    /// Column number (1-based, in characters not bytes)
    pub col: usize,

    /// Length in bytes
    pub len: usize,
}

impl SourceLocation {
    pub fn new(file: Option<String>, offset: usize, line: usize, col: usize, len: usize) -> Self {
        Self {
            file,
            offset,
            line,
            col,
            len,
        }
    }

    /// Create a location from a yaml-rust2 marker.
    ///
    /// The marker only carries the start position; the length is supplied by
    /// the caller. Marker lines are already 1-based, columns are 0-based.
    pub fn from_marker(marker: &yaml_rust2::scanner::Marker, len: usize) -> Self {
        Self {
            file: None,
            offset: marker.index(),
            line: marker.line(),
            col: marker.col() + 1,
            len,
        }
    }

    /// Set the filename for this source location.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Get the end offset (exclusive) of this location.
    pub fn end_offset(&self) -> usize {
        self.offset + self.len
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self {
            file: None,
            offset: 0,
            line: 1,
            col: 1,
            len: 0,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}:{}", file, self.line, self.col),
            None => write!(f, "{}:{}", self.line, self.col),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_location_creation() {
        let loc = SourceLocation::new(Some("api.yaml".into()), 10, 2, 5, 8);
        assert_eq!(loc.file, Some("api.yaml".into()));
        assert_eq!(loc.offset, 10);
        assert_eq!(loc.end_offset(), 18);
    }

    #[test]
    fn test_display() {
        let loc = SourceLocation::new(None, 0, 3, 7, 1);
        assert_eq!(loc.to_string(), "3:7");
        assert_eq!(loc.with_file("api.yaml").to_string(), "api.yaml:3:7");
    }

    #[test]
    fn test_default() {
        let loc = SourceLocation::default();
        assert_eq!(loc.file, None);
        assert_eq!((loc.line, loc.col, loc.len), (1, 1, 0));
    }
}
