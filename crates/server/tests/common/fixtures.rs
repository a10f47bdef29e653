//! Test fixtures for documents and posts.

use folio_server::PostDraft;
use serde_json::json;

/// Editor.js document whose image blocks reference `urls`, in order.
#[allow(dead_code)]
pub fn doc_with_images(urls: &[&str]) -> String {
    let blocks: Vec<_> = urls
        .iter()
        .map(|url| {
            json!({
                "type": "image",
                "data": { "file": { "url": url }, "caption": "" }
            })
        })
        .chain(std::iter::once(json!({
            "type": "paragraph",
            "data": { "text": "hello" }
        })))
        .collect();

    json!({ "time": 1_717_000_000_000u64, "blocks": blocks, "version": "2.28.2" }).to_string()
}

/// Public URL for `key` under the test public base.
#[allow(dead_code)]
pub fn asset_url(key: &str) -> String {
    format!("{}/{}", crate::common::PUBLIC_BASE, key)
}

/// A valid draft with the given slug, body and cover.
#[allow(dead_code)]
pub fn draft(slug: &str, body: String, cover: Option<&str>) -> PostDraft {
    PostDraft {
        title: format!("Post {slug}"),
        slug: slug.to_string(),
        category_id: None,
        body,
        cover_url: cover.map(str::to_string),
        is_published: false,
    }
}
