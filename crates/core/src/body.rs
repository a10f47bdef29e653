//! Rich-text document bodies.
//!
//! Bodies are stored as serialized block documents in the Editor.js shape:
//!
//! ```json
//! {"time": 1700000000, "blocks": [{"type": "image", "data": {"file": {"url": "..."}}}], "version": "2.28.2"}
//! ```
//!
//! The only thing the backend interprets is the set of media URLs a body
//! references. Any `file` object with a `url` string counts, at any depth
//! inside a block and whatever the block's `type` (gallery items, nested
//! column blocks and so on).

use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;

/// Body served when no about page has been written yet.
pub const EMPTY_DOCUMENT: &str = r#"{"time":0,"blocks":[],"version":"2.28.2"}"#;

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    blocks: Vec<Value>,
}

/// Reject bodies that carry no document at all.
///
/// Whitespace-only input and the JSON literal `null` are refused; anything
/// else is accepted as-is (an unparsable body simply references no assets).
pub fn validate(body: &str) -> Result<()> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(Error::EmptyBody);
    }
    if trimmed == "null" {
        return Err(Error::InvalidDocument("body is null".to_string()));
    }
    Ok(())
}

/// Collect the asset URLs referenced by a document body.
///
/// Never fails: malformed or empty input yields an empty set.
pub fn extract(body: &str) -> BTreeSet<String> {
    let Ok(document) = serde_json::from_str::<RawDocument>(body) else {
        return BTreeSet::new();
    };

    let mut urls = BTreeSet::new();
    for block in &document.blocks {
        collect_file_urls(block, &mut urls);
    }
    urls
}

/// Every `{"file": {"url": ...}}` object at any depth below `value`.
fn collect_file_urls(value: &Value, urls: &mut BTreeSet<String>) {
    match value {
        Value::Object(fields) => {
            if let Some(url) = file_url(value) {
                urls.insert(url.to_string());
            }
            for child in fields.values() {
                collect_file_urls(child, urls);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_file_urls(item, urls);
            }
        }
        _ => {}
    }
}

fn file_url(value: &Value) -> Option<&str> {
    value
        .get("file")?
        .as_object()?
        .get("url")?
        .as_str()
        .filter(|url| !url.is_empty())
}
