//! Document write service.
//!
//! Validates input, stamps times from the injected clock, hands the write to
//! the metadata store (which applies the asset plan in the same transaction)
//! and schedules a site refresh once the write has committed.

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::refresh::{SiteRefresher, spawn_refresh};
use folio_core::{Clock, body, lifecycle};
use folio_metadata::MetadataStore;
use folio_metadata::models::{AboutRow, PostRow, PostUpdate};
use std::sync::Arc;
use uuid::Uuid;

/// Client-supplied post fields. Updates replace every field.
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub title: String,
    pub slug: String,
    pub category_id: Option<i64>,
    pub body: String,
    pub cover_url: Option<String>,
    pub is_published: bool,
}

impl PostDraft {
    /// Reject drafts that must never reach a transaction.
    fn validate(&self) -> ApiResult<()> {
        body::validate(&self.body)?;
        if self.title.trim().is_empty() {
            return Err(ApiError::BadRequest("title must not be empty".to_string()));
        }
        if self.slug.trim().is_empty() {
            return Err(ApiError::BadRequest("slug must not be empty".to_string()));
        }
        Ok(())
    }

    fn into_update(self) -> PostUpdate {
        let cover_url = lifecycle::normalize_cover(self.cover_url.as_deref()).map(str::to_string);
        PostUpdate {
            title: self.title.trim().to_string(),
            slug: self.slug.trim().to_string(),
            category_id: self.category_id,
            body: self.body,
            cover_url,
            is_published: self.is_published,
        }
    }
}

/// Orchestrates post and about-page writes.
#[derive(Clone)]
pub struct PostService {
    metadata: Arc<dyn MetadataStore>,
    clock: Arc<dyn Clock>,
    refresher: Arc<dyn SiteRefresher>,
}

impl PostService {
    pub fn new(
        metadata: Arc<dyn MetadataStore>,
        clock: Arc<dyn Clock>,
        refresher: Arc<dyn SiteRefresher>,
    ) -> Self {
        Self {
            metadata,
            clock,
            refresher,
        }
    }

    /// Create a post and register its assets.
    pub async fn create(&self, draft: PostDraft) -> ApiResult<PostRow> {
        draft.validate()?;
        let fields = draft.into_update();
        let now = self.clock.now();

        let post = PostRow {
            post_id: Uuid::new_v4(),
            title: fields.title,
            slug: fields.slug,
            category_id: fields.category_id,
            body: fields.body,
            cover_url: fields.cover_url,
            is_published: fields.is_published,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };

        let plan = self.metadata.create_post(&post).await?;

        metrics::POST_MUTATIONS.with_label_values(&["create"]).inc();
        metrics::record_asset_plan(&plan);
        tracing::info!(
            post_id = %post.post_id,
            slug = %post.slug,
            registered = plan.register.len(),
            "post created"
        );

        if post.is_published {
            spawn_refresh(self.refresher.clone(), "post created");
        }
        Ok(post)
    }

    /// Fetch a live post.
    pub async fn get(&self, post_id: Uuid) -> ApiResult<PostRow> {
        self.metadata
            .get_post(post_id)
            .await?
            .filter(|post| !post.is_deleted)
            .ok_or_else(|| ApiError::NotFound(format!("post {post_id}")))
    }

    /// Replace a post's content, retiring references it no longer makes.
    pub async fn update(&self, post_id: Uuid, draft: PostDraft) -> ApiResult<PostRow> {
        draft.validate()?;
        let update = draft.into_update();
        let now = self.clock.now();

        let (post, plan) = self.metadata.update_post(post_id, &update, now).await?;

        metrics::POST_MUTATIONS.with_label_values(&["update"]).inc();
        metrics::record_asset_plan(&plan);
        tracing::info!(
            post_id = %post_id,
            registered = plan.register.len(),
            retired = plan.retire.len(),
            "post updated"
        );

        if post.is_published {
            spawn_refresh(self.refresher.clone(), "post updated");
        }
        Ok(post)
    }

    /// Soft-delete a post. Every asset it owns becomes pending deletion.
    pub async fn delete(&self, post_id: Uuid) -> ApiResult<()> {
        let now = self.clock.now();
        let retired = self.metadata.soft_delete_post(post_id, now).await?;

        metrics::POST_MUTATIONS.with_label_values(&["delete"]).inc();
        metrics::ASSETS_RETIRED.inc_by(retired);
        tracing::info!(post_id = %post_id, retired, "post deleted");

        spawn_refresh(self.refresher.clone(), "post deleted");
        Ok(())
    }

    /// Current about-page body, if one was ever written.
    pub async fn about(&self) -> ApiResult<Option<AboutRow>> {
        Ok(self.metadata.get_about().await?)
    }

    /// Create or replace the about page.
    pub async fn update_about(&self, new_body: String) -> ApiResult<AboutRow> {
        body::validate(&new_body)?;
        let now = self.clock.now();

        let (about, plan) = self.metadata.upsert_about(&new_body, now).await?;

        metrics::POST_MUTATIONS.with_label_values(&["about"]).inc();
        metrics::record_asset_plan(&plan);
        tracing::info!(
            registered = plan.register.len(),
            retired = plan.retire.len(),
            "about page updated"
        );

        spawn_refresh(self.refresher.clone(), "about page updated");
        Ok(about)
    }
}
