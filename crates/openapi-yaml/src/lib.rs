//! # openapi-yaml
//!
//! YAML (and therefore JSON) parsing with source location tracking.
//!
//! This crate provides `YamlNode`, which wraps `yaml-rust2::Yaml` with a
//! [`SourceLocation`] for every node in the tree. The document engine in
//! `openapi-parser` normalizes these trees into its own immutable raw values
//! and keeps the located tree around so diagnostics can point at a line and
//! column.
//!
//! ## Design
//!
//! Uses the **owned data approach**: each node owns its `Yaml` value together
//! with a parallel structure of located children. Scalars are typed with the
//! YAML 1.2 core schema, and only plain (unquoted) scalars are inferred, so
//! `"1.0"` in a JSON document stays a string.
//!
//! ## Example
//!
//! ```rust
//! use openapi_yaml::parse;
//!
//! let yaml = parse("openapi: 3.0.3\ninfo:\n  title: Pets\n").unwrap();
//! let info = yaml.get_hash_value("info").unwrap();
//! assert_eq!(info.source_location.line, 3);
//! ```

mod error;
mod parser;
mod source_location;
mod yaml_node;

pub use error::{Error, Result};
pub use parser::{parse, parse_file};
pub use source_location::SourceLocation;
pub use yaml_node::{YamlEntry, YamlNode};
