//! Batch maintenance endpoints.

use crate::error::ApiResult;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CleanImagesResponse {
    /// Assets deleted and tombstoned by this run.
    pub count: u64,
    pub scanned: u64,
    pub unresolvable: u64,
    pub failed: u64,
}

/// POST /api/batch/clean-images - Run one sweep of pending assets.
pub async fn clean_images(State(state): State<AppState>) -> ApiResult<Json<CleanImagesResponse>> {
    let stats = state.sweeper().run().await?;
    Ok(Json(CleanImagesResponse {
        count: stats.tombstoned,
        scanned: stats.scanned,
        unresolvable: stats.unresolvable,
        failed: stats.failed,
    }))
}
