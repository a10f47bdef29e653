//! Integration tests for HTTP API endpoints.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::TestServer;
use common::fixtures::{asset_url, doc_with_images};
use folio_core::AssetScope;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

/// Helper to make JSON requests.
async fn json_request(
    router: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    let body = match body {
        Some(v) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&v).unwrap())
        }
        None => Body::empty(),
    };

    let request = builder.body(body).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let json: Value = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

fn post_payload(slug: &str, urls: &[&str], cover: Option<&str>) -> Value {
    json!({
        "title": format!("Post {slug}"),
        "slug": slug,
        "body": doc_with_images(urls),
        "cover_url": cover,
        "is_published": true,
    })
}

async fn create(server: &TestServer, payload: Value) -> Value {
    let (status, body) = json_request(&server.router, "POST", "/api/post", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    body
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::new().await;

    let (status, body) = json_request(&server.router, "GET", "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage_backend"], "recording");
    assert!(body["version"].is_string());
}

// =============================================================================
// Posts
// =============================================================================

#[tokio::test]
async fn test_create_and_get_post() {
    let server = TestServer::new().await;
    let image = asset_url("a.png");
    let cover = asset_url("cover.png");

    let created = create(&server, post_payload("hello", &[&image], Some(&cover))).await;
    assert_eq!(created["slug"], "hello");
    assert_eq!(created["cover_url"], cover);
    assert_eq!(created["created_at"], "2024-06-01T09:00:00Z");

    let post_id = created["post_id"].as_str().unwrap();
    let (status, fetched) =
        json_request(&server.router, "GET", &format!("/api/post/{post_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "Post hello");
    assert_eq!(fetched["is_published"], true);

    let assets = server
        .metadata()
        .list_assets(AssetScope::Post(Uuid::parse_str(post_id).unwrap()))
        .await
        .unwrap();
    assert_eq!(assets.len(), 2);
}

#[tokio::test]
async fn test_create_post_rejects_empty_body() {
    let server = TestServer::new().await;

    let (status, body) = json_request(
        &server.router,
        "POST",
        "/api/post",
        Some(json!({ "title": "t", "slug": "empty", "body": "   " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
    assert!(server.metadata().get_pending_assets().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_post_rejects_malformed_json() {
    let server = TestServer::new().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/post")
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = server.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_post_duplicate_slug_conflicts() {
    let server = TestServer::new().await;
    create(&server, post_payload("taken", &[], None)).await;

    let (status, body) = json_request(
        &server.router,
        "POST",
        "/api/post",
        Some(post_payload("taken", &[], None)),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");
}

#[tokio::test]
async fn test_update_post_retires_removed_images() {
    let server = TestServer::new().await;
    let keep = asset_url("keep.png");
    let drop = asset_url("drop.png");

    let created = create(&server, post_payload("edit", &[&keep, &drop], None)).await;
    let post_id = created["post_id"].as_str().unwrap().to_string();

    server.clock.advance(time::Duration::hours(1));
    let (status, updated) = json_request(
        &server.router,
        "PATCH",
        &format!("/api/post/{post_id}"),
        Some(post_payload("edit", &[&keep], None)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["updated_at"], "2024-06-01T10:00:00Z");
    assert_eq!(updated["created_at"], "2024-06-01T09:00:00Z");

    let pending = server.metadata().get_pending_assets().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].url, drop);
}

#[tokio::test]
async fn test_update_missing_post_is_not_found() {
    let server = TestServer::new().await;

    let (status, body) = json_request(
        &server.router,
        "PATCH",
        &format!("/api/post/{}", Uuid::new_v4()),
        Some(post_payload("ghost", &[], None)),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn test_delete_post_then_get_is_not_found() {
    let server = TestServer::new().await;
    let created = create(&server, post_payload("bye", &[&asset_url("x.png")], None)).await;
    let uri = format!("/api/post/{}", created["post_id"].as_str().unwrap());

    let (status, body) = json_request(&server.router, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = json_request(&server.router, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = json_request(&server.router, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(server.metadata().get_pending_assets().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_post_id_is_bad_request() {
    let server = TestServer::new().await;

    let (status, body) = json_request(&server.router, "GET", "/api/post/not-a-uuid", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");
}

// =============================================================================
// About page
// =============================================================================

#[tokio::test]
async fn test_about_defaults_to_empty_document() {
    let server = TestServer::new().await;

    let (status, body) = json_request(&server.router, "GET", "/api/post/about", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["body"], folio_core::body::EMPTY_DOCUMENT);
    assert_eq!(body["updated_at"], Value::Null);
}

#[tokio::test]
async fn test_about_update_diffs_images() {
    let server = TestServer::new().await;
    let first = asset_url("me.png");
    let second = asset_url("me-2.png");

    let (status, body) = json_request(
        &server.router,
        "POST",
        "/api/post/about",
        Some(json!({ "body": doc_with_images(&[&first]) })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated_at"], "2024-06-01T09:00:00Z");

    let (status, _) = json_request(
        &server.router,
        "POST",
        "/api/post/about",
        Some(json!({ "body": doc_with_images(&[&second]) })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, fetched) = json_request(&server.router, "GET", "/api/post/about", None).await;
    assert_eq!(fetched["body"], doc_with_images(&[&second]));

    let pending = server.metadata().get_pending_assets().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].url, first);
    assert_eq!(pending[0].owner_post_id, None);
}

// =============================================================================
// Uploads
// =============================================================================

#[tokio::test]
async fn test_upload_url_requires_filename() {
    let server = TestServer::new().await;

    let (status, _) = json_request(&server.router, "GET", "/api/post/upload-url", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) =
        json_request(&server.router, "GET", "/api/post/upload-url?filename=", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_url_issues_presigned_put() {
    let server = TestServer::new().await;

    let (status, body) = json_request(
        &server.router,
        "GET",
        "/api/post/upload-url?filename=Holiday.JPEG",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let key = body["filename"].as_str().unwrap();
    assert!(key.ends_with(".jpeg"));
    assert!(Uuid::parse_str(key.trim_end_matches(".jpeg")).is_ok());
    assert_eq!(body["image_url"], asset_url(key));
    assert_eq!(
        body["upload_url"],
        format!("https://upload.example.com/{key}?signature=test")
    );
    assert_eq!(body["expires_in"], 300);
}

// =============================================================================
// Batch
// =============================================================================

#[tokio::test]
async fn test_clean_images_reports_count() {
    let server = TestServer::new().await;
    server.storage.insert("old.png");
    let created = create(&server, post_payload("swap", &[&asset_url("old.png")], None)).await;
    let post_id = created["post_id"].as_str().unwrap();

    json_request(
        &server.router,
        "PATCH",
        &format!("/api/post/{post_id}"),
        Some(post_payload("swap", &[&asset_url("new.png")], None)),
    )
    .await;

    let (status, body) =
        json_request(&server.router, "POST", "/api/batch/clean-images", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["scanned"], 1);
    assert_eq!(body["failed"], 0);
    assert!(!server.storage.contains("old.png"));

    let (_, again) = json_request(&server.router, "POST", "/api/batch/clean-images", None).await;
    assert_eq!(again["count"], 0);
}

// =============================================================================
// Metrics
// =============================================================================

#[tokio::test]
async fn test_metrics_endpoint_enabled_by_default() {
    let server = TestServer::new().await;
    create(&server, post_payload("counted", &[], None)).await;

    let request = Request::builder()
        .method("GET")
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let response = server.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("folio_post_mutations_total"));
}

#[tokio::test]
async fn test_metrics_endpoint_can_be_disabled() {
    let server = TestServer::with_config(|config| config.server.metrics_enabled = false).await;

    let (status, _) = json_request(&server.router, "GET", "/metrics", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
