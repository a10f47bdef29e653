//! Server test utilities.

use folio_core::config::{AppConfig, MetadataConfig, StorageConfig};
use folio_core::{Clock, FixedClock};
use folio_metadata::{MetadataStore, SqliteStore};
use folio_server::{AppState, NoopRefresher, SiteRefresher, create_router};
use folio_storage::ObjectStore;
use std::sync::Arc;
use tempfile::TempDir;
use time::macros::datetime;

/// Public base used by every test server.
#[allow(dead_code)]
pub const PUBLIC_BASE: &str = "https://assets.example.com";

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    pub storage: Arc<crate::common::RecordingStore>,
    pub clock: Arc<FixedClock>,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server over a recording object store.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test server with custom config modifications.
    pub async fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        Self::build(modifier, Arc::new(NoopRefresher)).await
    }

    /// Create a test server whose post-commit refreshes go to `refresher`.
    pub async fn with_refresher(refresher: Arc<dyn SiteRefresher>) -> Self {
        Self::build(|_| {}, refresher).await
    }

    async fn build<F>(modifier: F, refresher: Arc<dyn SiteRefresher>) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

        let db_path = temp_dir.path().join("metadata.db");
        let metadata: Arc<dyn MetadataStore> = Arc::new(
            SqliteStore::new(&db_path)
                .await
                .expect("Failed to create metadata store"),
        );

        let storage = crate::common::RecordingStore::new();
        let clock = Arc::new(FixedClock::new(datetime!(2024-06-01 09:00:00 UTC)));

        let mut config = AppConfig::for_testing();
        config.assets.public_base_url = PUBLIC_BASE.to_string();
        config.storage = StorageConfig::Filesystem {
            path: temp_dir.path().join("storage"),
        };
        config.metadata = MetadataConfig::Sqlite { path: db_path };

        modifier(&mut config);

        let state = AppState::new(
            config,
            storage.clone() as Arc<dyn ObjectStore>,
            metadata,
            clock.clone() as Arc<dyn Clock>,
            refresher,
        );
        let router = create_router(state.clone());

        Self {
            router,
            state,
            storage,
            clock,
            _temp_dir: temp_dir,
        }
    }

    /// Get access to the underlying metadata.
    pub fn metadata(&self) -> Arc<dyn MetadataStore> {
        self.state.metadata.clone()
    }
}
