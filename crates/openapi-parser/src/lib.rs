//! # openapi-parser
//!
//! Validation and reference resolution for OpenAPI 3 documents.
//!
//! A document is read from an [`Input`] into an immutable [`RawValue`] tree
//! held by a [`Source`]. Node factories walk that tree through [`Context`]s:
//! each factory checks the shape of its region, delegates to child factories
//! and follows `$ref`s lazily, possibly into other sources. Every factory
//! offers two views of the same region:
//!
//! - `errors()` collects every violation and never fails
//! - `node()` builds the typed [`Node`] tree, failing on the first violation
//!
//! Both are computed once and cached.
//!
//! ## Example
//!
//! ```rust
//! use openapi_parser::Document;
//!
//! let document = Document::from_yaml_str(
//!     "pets.yaml",
//!     "openapi: 3.0.3\ninfo:\n  title: Pets\n  version: '1.0'\n",
//! )
//! .unwrap();
//! assert!(document.is_valid());
//! assert_eq!(document.root().unwrap().info().unwrap().title(), "Pets");
//! ```

mod context;
mod document;
mod error;
pub mod factory;
mod input;
mod node;
pub mod openapi;
mod pointer;
mod raw;
mod reference;
mod source;
pub mod type_checker;
pub mod validation;

pub use context::{Context, Location};
pub use document::Document;
pub use error::{Error, ErrorCollection, Result, ValidationError, ValidationErrorKind};
pub use factory::{FactoryFn, NodeFactory};
pub use input::{FileInput, Input, InputData, JsonInput, StringInput};
pub use node::{Node, Placeholder, Value};
pub use openapi::OpenApi;
pub use pointer::Pointer;
pub use raw::{RawMap, RawValue};
pub use reference::Reference;
pub use source::{ResolvedReference, Source, SourceRegistry};
pub use type_checker::ValueType;
pub use validation::{NamedRule, Validatable, ValidationHook};

pub use openapi_yaml::SourceLocation;
