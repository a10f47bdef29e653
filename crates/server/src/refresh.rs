//! Site refresh after content changes: purge the edge cache, then trigger a redeploy.
//!
//! Refreshes run detached from the request that caused them. A failed
//! refresh is logged and counted; the write that triggered it has already
//! committed and is not affected.

use async_trait::async_trait;
use folio_core::config::RefreshConfig;
use reqwest::StatusCode;
use std::sync::Arc;

/// Errors from a refresh attempt.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("{step} request failed: {source}")]
    Transport {
        step: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{step} returned unexpected status {status}")]
    Status {
        step: &'static str,
        status: StatusCode,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Hook invoked after a qualifying content change commits.
#[async_trait]
pub trait SiteRefresher: Send + Sync + 'static {
    async fn refresh(&self) -> Result<(), RefreshError>;
}

/// Refresher used when no refresh hooks are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRefresher;

#[async_trait]
impl SiteRefresher for NoopRefresher {
    async fn refresh(&self) -> Result<(), RefreshError> {
        Ok(())
    }
}

/// Calls the cache purge endpoint, then the deploy hook.
#[derive(Clone)]
pub struct HttpRefresher {
    client: reqwest::Client,
    purge_url: String,
    purge_token: String,
    deploy_hook_url: String,
}

impl std::fmt::Debug for HttpRefresher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRefresher")
            .field("purge_url", &self.purge_url)
            .field("deploy_hook_url", &self.deploy_hook_url)
            .finish_non_exhaustive()
    }
}

impl HttpRefresher {
    pub fn new(config: &RefreshConfig) -> Result<Self, RefreshError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(RefreshError::Client)?;
        Ok(Self {
            client,
            purge_url: config.purge_url.clone(),
            purge_token: config.purge_token.clone(),
            deploy_hook_url: config.deploy_hook_url.clone(),
        })
    }

    async fn post(
        &self,
        step: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<(), RefreshError> {
        let response = request
            .send()
            .await
            .map_err(|source| RefreshError::Transport { step, source })?;
        let status = response.status();
        if !status.is_success() {
            return Err(RefreshError::Status { step, status });
        }
        Ok(())
    }
}

#[async_trait]
impl SiteRefresher for HttpRefresher {
    async fn refresh(&self) -> Result<(), RefreshError> {
        self.post(
            "cache purge",
            self.client
                .post(&self.purge_url)
                .bearer_auth(&self.purge_token),
        )
        .await?;
        tracing::debug!(url = %self.purge_url, "edge cache purged");

        // The redeploy would otherwise rebuild from stale cached pages.
        self.post("deploy hook", self.client.post(&self.deploy_hook_url))
            .await?;
        tracing::debug!("deploy hook triggered");
        Ok(())
    }
}

/// Build the refresher for an optional refresh section.
pub fn from_config(
    config: Option<&RefreshConfig>,
) -> Result<Arc<dyn SiteRefresher>, RefreshError> {
    match config {
        Some(config) => Ok(Arc::new(HttpRefresher::new(config)?)),
        None => Ok(Arc::new(NoopRefresher)),
    }
}

/// Run a refresh in the background. The handle is dropped; nothing awaits it.
pub fn spawn_refresh(refresher: Arc<dyn SiteRefresher>, reason: &'static str) {
    tokio::spawn(async move {
        match refresher.refresh().await {
            Ok(()) => {
                crate::metrics::REFRESH_RUNS.with_label_values(&["ok"]).inc();
                tracing::info!(reason, "site refresh completed");
            }
            Err(e) => {
                crate::metrics::REFRESH_RUNS.with_label_values(&["failed"]).inc();
                tracing::warn!(reason, error = %e, "site refresh failed");
            }
        }
    });
}
