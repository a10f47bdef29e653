//! HTTP server for the folio publishing backend.
//!
//! This crate provides:
//! - Post and about-page writes with transactional asset bookkeeping
//! - Presigned upload URL issuance
//! - The sweep that deletes unreferenced assets from object storage
//! - Post-commit site refresh hooks
//! - Prometheus metrics

pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod metrics;
pub mod refresh;
pub mod routes;
pub mod state;
pub mod sweep;

pub use error::ApiError;
pub use lifecycle::{PostDraft, PostService};
pub use refresh::{HttpRefresher, NoopRefresher, SiteRefresher};
pub use routes::create_router;
pub use state::AppState;
pub use sweep::{SweepStats, Sweeper};
