//! Anchor pointers (`#/a/b/c`) into a document.

use crate::error::{Error, Result};
use std::fmt;
use url::form_urlencoded;

/// A path of segments from a document root.
///
/// Rendered as an anchor fragment: `#/` for the root, otherwise the escaped
/// segments joined with `/`, e.g. `#/paths/%2Fpets/get`. Both `#` and `#/`
/// parse back to the root, so a mapping key that is the empty string cannot
/// be addressed on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Pointer {
    segments: Vec<String>,
}

impl Pointer {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_segments<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Self {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse an anchor fragment such as `#/components/schemas/Pet`.
    ///
    /// The leading empty segment is dropped, `+` is read as a space and
    /// percent escapes are decoded.
    pub fn parse_fragment(fragment: &str) -> Result<Self> {
        let Some(path) = fragment.strip_prefix('#') else {
            return Err(Error::reference(format!("{} is not an anchor pointer", fragment)));
        };
        if path.is_empty() || path == "/" {
            return Ok(Self::root());
        }
        let Some(path) = path.strip_prefix('/') else {
            return Err(Error::reference(format!("{} is not an anchor pointer", fragment)));
        };
        Ok(Self::from_segments(path.split('/').map(decode_segment)))
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// A new pointer with one more segment.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// True when `self` is `other` or lies beneath it.
    pub fn starts_with(&self, other: &Pointer) -> bool {
        self.segments.starts_with(&other.segments)
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#/")?;
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{}", encode_segment(segment))?;
        }
        Ok(())
    }
}

/// Form-decode one pointer segment.
pub(crate) fn decode_segment(segment: &str) -> String {
    // form_urlencoded splits on `&` and `=`; escape them so the whole
    // segment decodes as a single key.
    let escaped = segment.replace('&', "%26").replace('=', "%3D");
    form_urlencoded::parse(escaped.as_bytes())
        .next()
        .map(|(key, _)| key.into_owned())
        .unwrap_or_default()
}

/// Escape one pointer segment so that [`decode_segment`] restores it.
///
/// Only characters that would change the meaning of the fragment are
/// escaped, keeping keys like `$ref` or `{id}` readable.
pub(crate) fn encode_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for c in segment.chars() {
        match c {
            ' ' => encoded.push('+'),
            '%' | '/' | '+' | '#' => encoded.push_str(&format!("%{:02X}", c as u32)),
            c => encoded.push(c),
        }
    }
    encoded
}
