//! Post endpoints.

use crate::error::ApiResult;
use crate::handlers::common::{format_timestamp, parse_id, parse_json};
use crate::lifecycle::PostDraft;
use crate::state::AppState;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use folio_metadata::models::PostRow;
use serde::{Deserialize, Serialize};

/// Request body for creating or replacing a post.
#[derive(Debug, Deserialize)]
pub struct PostRequest {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub category_id: Option<i64>,
    /// Serialized block document.
    pub body: String,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

impl From<PostRequest> for PostDraft {
    fn from(req: PostRequest) -> Self {
        Self {
            title: req.title,
            slug: req.slug,
            category_id: req.category_id,
            body: req.body,
            cover_url: req.cover_url,
            is_published: req.is_published,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub post_id: String,
    pub title: String,
    pub slug: String,
    pub category_id: Option<i64>,
    pub body: String,
    pub cover_url: Option<String>,
    pub is_published: bool,
    pub created_at: String,
    pub updated_at: String,
}

fn post_row_to_response(post: PostRow) -> ApiResult<PostResponse> {
    Ok(PostResponse {
        post_id: post.post_id.to_string(),
        created_at: format_timestamp(post.created_at, "created_at")?,
        updated_at: format_timestamp(post.updated_at, "updated_at")?,
        title: post.title,
        slug: post.slug,
        category_id: post.category_id,
        body: post.body,
        cover_url: post.cover_url,
        is_published: post.is_published,
    })
}

/// POST /api/post - Create a post.
pub async fn create_post(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<PostResponse>)> {
    let req: PostRequest = parse_json(&body)?;
    let post = state.posts().create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(post_row_to_response(post)?)))
}

/// GET /api/post/{post_id} - Get a post.
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> ApiResult<Json<PostResponse>> {
    let post_id = parse_id(&post_id, "post")?;
    let post = state.posts().get(post_id).await?;
    Ok(Json(post_row_to_response(post)?))
}

/// PATCH /api/post/{post_id} - Replace a post's fields.
pub async fn update_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<PostResponse>> {
    let post_id = parse_id(&post_id, "post")?;
    let req: PostRequest = parse_json(&body)?;
    let post = state.posts().update(post_id, req.into()).await?;
    Ok(Json(post_row_to_response(post)?))
}

/// DELETE /api/post/{post_id} - Soft-delete a post.
pub async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> ApiResult<StatusCode> {
    let post_id = parse_id(&post_id, "post")?;
    state.posts().delete(post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
