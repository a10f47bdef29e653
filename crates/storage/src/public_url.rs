//! Mapping between public asset URLs and object keys.
//!
//! Assets are served from a public base (a CDN or bucket domain); the part
//! of an asset URL after that base is its object key.

use percent_encoding::percent_decode_str;

/// The configured public base URL, without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicBaseUrl {
    base: String,
}

impl PublicBaseUrl {
    pub fn new(base: impl AsRef<str>) -> Self {
        Self {
            base: base.as_ref().trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.base
    }

    /// Derive the object key for an asset URL.
    ///
    /// Returns `None` when the URL is not under this base, or when nothing
    /// but the base remains. Query strings and fragments are dropped and
    /// percent-escapes decoded.
    pub fn object_key(&self, url: &str) -> Option<String> {
        if self.base.is_empty() {
            return None;
        }
        let rest = url.strip_prefix(self.base.as_str())?.strip_prefix('/')?;
        let path = rest.split(['?', '#']).next().unwrap_or_default();
        let key = percent_decode_str(path).decode_utf8().ok()?;
        let key = key.trim_start_matches('/');
        if key.is_empty() {
            None
        } else {
            Some(key.to_string())
        }
    }

    /// Public URL for an object key.
    pub fn url_for_key(&self, key: &str) -> String {
        format!("{}/{}", self.base, key.trim_start_matches('/'))
    }
}
