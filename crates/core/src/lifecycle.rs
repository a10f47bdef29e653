//! Asset lifecycle planning.
//!
//! Given the previous and next state of a document, decide which asset rows
//! must be registered (inserted as active) and which must be retired
//! (moved to pending_delete). Planning is pure; the metadata store applies
//! the plan inside the same transaction that writes the document.

use crate::asset::AssetKind;
use crate::body;
use crate::refs;

/// One asset reference: a URL in a given role.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct AssetRef {
    pub url: String,
    pub kind: AssetKind,
}

impl AssetRef {
    pub fn new(url: impl Into<String>, kind: AssetKind) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }
}

/// Asset row changes implied by one document write.
///
/// Retirements are applied before registrations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetPlan {
    pub register: Vec<AssetRef>,
    pub retire: Vec<AssetRef>,
}

impl AssetPlan {
    pub fn is_empty(&self) -> bool {
        self.register.is_empty() && self.retire.is_empty()
    }
}

/// Treat a blank cover the same as no cover.
pub fn normalize_cover(cover: Option<&str>) -> Option<&str> {
    cover.map(str::trim).filter(|c| !c.is_empty())
}

/// Assets for a freshly created post: every body reference plus the cover.
pub fn plan_create(body: &str, cover: Option<&str>) -> AssetPlan {
    let mut register: Vec<AssetRef> = body::extract(body)
        .into_iter()
        .map(|url| AssetRef::new(url, AssetKind::Inline))
        .collect();

    if let Some(cover) = normalize_cover(cover) {
        register.push(AssetRef::new(cover, AssetKind::Cover));
    }

    AssetPlan {
        register,
        retire: Vec::new(),
    }
}

/// Assets for a post update.
///
/// Body references are diffed. The cover is handled on its own: a previous
/// cover that differs from the next one is retired, and a new cover is
/// registered whenever it changes (including the first time one is set).
pub fn plan_update(
    previous_body: &str,
    previous_cover: Option<&str>,
    next_body: &str,
    next_cover: Option<&str>,
) -> AssetPlan {
    let mut plan = plan_body_diff(previous_body, next_body, AssetKind::Inline);

    let previous_cover = normalize_cover(previous_cover);
    let next_cover = normalize_cover(next_cover);

    if previous_cover != next_cover {
        if let Some(old) = previous_cover {
            plan.retire.push(AssetRef::new(old, AssetKind::Cover));
        }
        if let Some(new) = next_cover {
            plan.register.push(AssetRef::new(new, AssetKind::Cover));
        }
    }

    plan
}

/// Assets for an about-page write. With no previous page every reference
/// in the new body is registered.
pub fn plan_about(previous_body: Option<&str>, next_body: &str) -> AssetPlan {
    plan_body_diff(previous_body.unwrap_or(""), next_body, AssetKind::About)
}

fn plan_body_diff(previous_body: &str, next_body: &str, kind: AssetKind) -> AssetPlan {
    let diff = refs::diff(&body::extract(previous_body), &body::extract(next_body));

    AssetPlan {
        register: diff
            .added
            .into_iter()
            .map(|url| AssetRef::new(url, kind))
            .collect(),
        retire: diff
            .removed
            .into_iter()
            .map(|url| AssetRef::new(url, kind))
            .collect(),
    }
}
