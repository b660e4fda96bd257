//! Parsed `$ref` strings.

use crate::error::Result;
use crate::pointer::Pointer;
use std::fmt;

/// A reference string split into its resource and fragment parts.
///
/// `widgets.yaml#/x` has resource `widgets.yaml` and fragment `/x`;
/// `#/components/schemas/Pet` has an empty resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    raw: String,
    resource: String,
    fragment: Option<String>,
}

impl Reference {
    pub fn parse(raw: &str) -> Self {
        let (resource, fragment) = match raw.split_once('#') {
            Some((resource, fragment)) => (resource, Some(fragment.to_string())),
            None => (raw, None),
        };
        Self {
            raw: raw.to_string(),
            resource: resource.to_string(),
            fragment,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// True when the reference stays inside the current document.
    pub fn is_only_fragment(&self) -> bool {
        self.resource.is_empty()
    }

    /// True for `#` and `#/...` only.
    pub fn is_anchor(&self) -> bool {
        self.is_only_fragment()
            && matches!(self.fragment(), Some(fragment) if fragment.is_empty() || fragment.starts_with('/'))
    }

    /// The fragment as an anchor string (`#/...`), `#` when there is none.
    pub fn anchor(&self) -> String {
        format!("#{}", self.fragment().unwrap_or_default())
    }

    pub fn pointer(&self) -> Result<Pointer> {
        Pointer::parse_fragment(&self.anchor())
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
