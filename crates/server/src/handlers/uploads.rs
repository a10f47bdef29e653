//! Presigned upload URL issuance.
//!
//! Clients upload media straight to the object store; the server only signs
//! the PUT and tells the client the public URL the object will have.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct UploadUrlQuery {
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadUrlResponse {
    /// Presigned PUT target.
    pub upload_url: String,
    /// Public URL of the object once uploaded.
    pub image_url: String,
    /// Seconds until `upload_url` stops being accepted.
    pub expires_in: u64,
    /// Generated object key.
    pub filename: String,
}

/// Extension (with the dot) of a client filename, or `default` when it has
/// none usable as part of an object key.
fn upload_extension(filename: &str, default: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 10)
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_else(|| default.to_string())
}

/// GET /api/post/upload-url?filename=<name> - Presign an upload.
pub async fn get_upload_url(
    State(state): State<AppState>,
    Query(query): Query<UploadUrlQuery>,
) -> ApiResult<Json<UploadUrlResponse>> {
    let filename = query
        .filename
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("filename query parameter is required".to_string()))?;

    let assets = &state.config.assets;
    let key = format!(
        "{}{}",
        Uuid::new_v4(),
        upload_extension(&filename, &assets.default_extension)
    );
    let ttl = assets.upload_url_ttl();

    let upload = state.storage.presign_put(&key, ttl).await?;
    tracing::debug!(key = %key, backend = state.storage.backend_name(), "issued upload URL");

    Ok(Json(UploadUrlResponse {
        upload_url: upload.url,
        image_url: state.public_base.url_for_key(&key),
        expires_in: ttl.as_secs(),
        filename: key,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_extension() {
        assert_eq!(upload_extension("photo.PNG", ".jpg"), ".png");
        assert_eq!(upload_extension("archive.tar.gz", ".jpg"), ".gz");
        assert_eq!(upload_extension("noext", ".jpg"), ".jpg");
        assert_eq!(upload_extension(".hidden", ".jpg"), ".jpg");
        assert_eq!(upload_extension("weird.p g", ".jpg"), ".jpg");
        assert_eq!(upload_extension("trailing.", ".webp"), ".webp");
    }
}
