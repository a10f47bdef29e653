//! Application state shared across handlers.

use crate::lifecycle::PostService;
use crate::refresh::SiteRefresher;
use crate::sweep::Sweeper;
use folio_core::Clock;
use folio_core::config::AppConfig;
use folio_metadata::MetadataStore;
use folio_storage::{ObjectStore, PublicBaseUrl};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Object storage backend.
    pub storage: Arc<dyn ObjectStore>,
    /// Metadata store.
    pub metadata: Arc<dyn MetadataStore>,
    /// Wall clock for timestamps written to the store.
    pub clock: Arc<dyn Clock>,
    /// Post-commit refresh hook.
    pub refresher: Arc<dyn SiteRefresher>,
    /// Public base under which stored objects are served.
    pub public_base: PublicBaseUrl,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        config: AppConfig,
        storage: Arc<dyn ObjectStore>,
        metadata: Arc<dyn MetadataStore>,
        clock: Arc<dyn Clock>,
        refresher: Arc<dyn SiteRefresher>,
    ) -> Self {
        let public_base = PublicBaseUrl::new(&config.assets.public_base_url);
        Self {
            config: Arc::new(config),
            storage,
            metadata,
            clock,
            refresher,
            public_base,
        }
    }

    /// Document write service over this state's stores.
    pub fn posts(&self) -> PostService {
        PostService::new(
            self.metadata.clone(),
            self.clock.clone(),
            self.refresher.clone(),
        )
    }

    /// Sweeper over this state's stores.
    pub fn sweeper(&self) -> Sweeper {
        Sweeper::new(
            self.metadata.clone(),
            self.storage.clone(),
            self.public_base.clone(),
            self.clock.clone(),
        )
    }
}
