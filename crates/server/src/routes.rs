//! Route configuration.

use crate::handlers;
use crate::metrics::{metrics_handler, register_metrics};
use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/api/health", get(handlers::health_check))
        // Posts
        .route("/api/post", post(handlers::create_post))
        // Static segments take precedence over the {post_id} capture.
        .route(
            "/api/post/about",
            get(handlers::get_about).post(handlers::update_about),
        )
        .route("/api/post/upload-url", get(handlers::get_upload_url))
        .route(
            "/api/post/{post_id}",
            get(handlers::get_post)
                .patch(handlers::update_post)
                .delete(handlers::delete_post),
        )
        // Maintenance
        .route("/api/batch/clean-images", post(handlers::clean_images));

    let mut router = Router::new().merge(api_routes);

    // Unauthenticated; restrict /metrics to the scraper at the network level.
    if state.config.server.metrics_enabled {
        register_metrics();
        let metrics_routes = Router::new().route("/metrics", get(metrics_handler));
        router = router.merge(metrics_routes);
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
