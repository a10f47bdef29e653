//! Database models mapping to the metadata schema.

use folio_core::{AssetKind, AssetScope, AssetStatus};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

// =============================================================================
// Posts
// =============================================================================

/// Post record. Soft-deleted posts keep their row.
#[derive(Debug, Clone, FromRow)]
pub struct PostRow {
    pub post_id: Uuid,
    pub title: String,
    /// Unique across all posts, deleted ones included.
    pub slug: String,
    /// Opaque category identifier.
    pub category_id: Option<i64>,
    /// Serialized block document.
    pub body: String,
    pub cover_url: Option<String>,
    pub is_published: bool,
    pub is_deleted: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Replacement values for an existing post.
#[derive(Debug, Clone)]
pub struct PostUpdate {
    pub title: String,
    pub slug: String,
    pub category_id: Option<i64>,
    pub body: String,
    pub cover_url: Option<String>,
    pub is_published: bool,
}

// =============================================================================
// Assets
// =============================================================================

/// Asset reference record.
#[derive(Debug, Clone, FromRow)]
pub struct AssetRow {
    pub asset_id: Uuid,
    pub url: String,
    /// NULL for the about page.
    pub owner_post_id: Option<Uuid>,
    /// One of `inline`, `cover`, `about`.
    pub kind: String,
    /// One of `active`, `pending_delete`.
    pub status: String,
    pub is_tombstoned: bool,
    pub tombstoned_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl AssetRow {
    pub fn kind(&self) -> folio_core::Result<AssetKind> {
        self.kind.parse()
    }

    pub fn status(&self) -> folio_core::Result<AssetStatus> {
        self.status.parse()
    }

    pub fn scope(&self) -> AssetScope {
        AssetScope::from(self.owner_post_id)
    }

    pub fn is_pending(&self) -> bool {
        self.status == AssetStatus::PendingDelete.as_str() && !self.is_tombstoned
    }
}

// =============================================================================
// About page
// =============================================================================

/// Fixed primary key of the about page singleton.
pub const ABOUT_PAGE_ID: i64 = 1;

/// About page record (at most one row).
#[derive(Debug, Clone, FromRow)]
pub struct AboutRow {
    pub about_id: i64,
    pub body: String,
    pub updated_at: OffsetDateTime,
}
