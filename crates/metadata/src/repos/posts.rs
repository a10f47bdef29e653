//! Post repository.
//!
//! Every write here also applies the asset plan for the post inside the same
//! transaction: either the post and all of its asset rows change, or nothing does.

use crate::error::MetadataResult;
use crate::models::{PostRow, PostUpdate};
use async_trait::async_trait;
use folio_core::AssetPlan;
use time::OffsetDateTime;
use uuid::Uuid;

/// Repository for post documents.
#[async_trait]
pub trait PostRepo: Send + Sync {
    /// Insert a post and register its body references and cover as active assets.
    ///
    /// Fails with `AlreadyExists` if the slug is taken.
    async fn create_post(&self, post: &PostRow) -> MetadataResult<AssetPlan>;

    /// Get a post by ID, including soft-deleted ones.
    async fn get_post(&self, post_id: Uuid) -> MetadataResult<Option<PostRow>>;

    /// Replace a post's content.
    ///
    /// The previous body and cover are read inside the transaction and diffed
    /// against the new ones. Fails with `NotFound` if the post is missing or
    /// soft-deleted.
    async fn update_post(
        &self,
        post_id: Uuid,
        update: &PostUpdate,
        now: OffsetDateTime,
    ) -> MetadataResult<(PostRow, AssetPlan)>;

    /// Soft-delete a post, moving every live asset it owns to pending_delete.
    ///
    /// Returns the number of asset rows touched. Fails with `NotFound` if the
    /// post is missing or already deleted.
    async fn soft_delete_post(&self, post_id: Uuid, now: OffsetDateTime) -> MetadataResult<u64>;
}
