//! About page endpoints.

use crate::error::ApiResult;
use crate::handlers::common::{format_timestamp, parse_json};
use crate::state::AppState;
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use folio_core::body::EMPTY_DOCUMENT;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct AboutRequest {
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct AboutResponse {
    pub body: String,
    /// Absent until the page is first written.
    pub updated_at: Option<String>,
}

/// GET /api/post/about - Get the about page, or an empty document.
pub async fn get_about(State(state): State<AppState>) -> ApiResult<Json<AboutResponse>> {
    let response = match state.posts().about().await? {
        Some(about) => AboutResponse {
            updated_at: Some(format_timestamp(about.updated_at, "updated_at")?),
            body: about.body,
        },
        None => AboutResponse {
            body: EMPTY_DOCUMENT.to_string(),
            updated_at: None,
        },
    };
    Ok(Json(response))
}

/// POST /api/post/about - Create or replace the about page.
pub async fn update_about(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<AboutResponse>> {
    let req: AboutRequest = parse_json(&body)?;
    let about = state.posts().update_about(req.body).await?;
    Ok(Json(AboutResponse {
        updated_at: Some(format_timestamp(about.updated_at, "updated_at")?),
        body: about.body,
    }))
}
