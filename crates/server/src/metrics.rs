//! Prometheus metrics for the folio server.
//!
//! Exposes counters for document writes, asset lifecycle transitions, sweep
//! runs and site refreshes.
//!
//! The `/metrics` endpoint is unauthenticated. Restrict it to the scraper at
//! the network level.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    self, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use std::sync::{LazyLock, Once};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// Document metrics
pub static POST_MUTATIONS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "folio_post_mutations_total",
            "Committed document writes by operation",
        ),
        &["operation"],
    )
    .expect("metric creation failed")
});

// Asset lifecycle metrics
pub static ASSETS_REGISTERED: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "folio_assets_registered_total",
            "Asset references registered as active, by kind",
        ),
        &["kind"],
    )
    .expect("metric creation failed")
});

pub static ASSETS_RETIRED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "folio_assets_retired_total",
        "Asset references moved to pending_delete",
    )
    .expect("metric creation failed")
});

// Sweep metrics
pub static SWEEP_RUNS: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new("folio_sweep_runs_total", "Total number of sweep runs")
        .expect("metric creation failed")
});

pub static SWEEP_TOMBSTONED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "folio_sweep_assets_tombstoned_total",
        "Assets deleted from the object store and tombstoned",
    )
    .expect("metric creation failed")
});

pub static SWEEP_UNRESOLVABLE: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "folio_sweep_unresolvable_total",
        "Pending assets skipped because their URL has no object key",
    )
    .expect("metric creation failed")
});

pub static SWEEP_FAILURES: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "folio_sweep_failures_total",
            "Pending assets left in place after a failed step, by step",
        ),
        &["step"],
    )
    .expect("metric creation failed")
});

pub static SWEEP_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        HistogramOpts::new("folio_sweep_duration_seconds", "Duration of a sweep run")
            .buckets(vec![0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 300.0]),
    )
    .expect("metric creation failed")
});

// Refresh metrics
pub static REFRESH_RUNS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "folio_refresh_runs_total",
            "Background site refreshes by outcome",
        ),
        &["outcome"],
    )
    .expect("metric creation failed")
});

/// Guard to ensure metrics are only registered once.
static REGISTER_ONCE: Once = Once::new();

/// Register all metrics with the global registry.
///
/// Idempotent, so tests can build as many routers as they like.
pub fn register_metrics() {
    REGISTER_ONCE.call_once(|| {
        REGISTRY
            .register(Box::new(POST_MUTATIONS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(ASSETS_REGISTERED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(ASSETS_RETIRED.clone()))
            .expect("metric registration failed");

        REGISTRY
            .register(Box::new(SWEEP_RUNS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(SWEEP_TOMBSTONED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(SWEEP_UNRESOLVABLE.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(SWEEP_FAILURES.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(SWEEP_DURATION.clone()))
            .expect("metric registration failed");

        REGISTRY
            .register(Box::new(REFRESH_RUNS.clone()))
            .expect("metric registration failed");
    });
}

/// GET /metrics - Prometheus metrics endpoint.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {e}").into_bytes(),
        ),
    }
}

/// Record the asset rows a committed write touched.
pub fn record_asset_plan(plan: &folio_core::AssetPlan) {
    for asset in &plan.register {
        ASSETS_REGISTERED
            .with_label_values(&[asset.kind.as_str()])
            .inc();
    }
    ASSETS_RETIRED.inc_by(plan.retire.len() as u64);
}
