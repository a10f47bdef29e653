//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Enable the /metrics endpoint for Prometheus scraping (default: true).
    /// The endpoint is unauthenticated; restrict it at the network level.
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            metrics_enabled: default_metrics_enabled(),
        }
    }
}

/// Storage backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Local filesystem storage. Cannot issue presigned upload URLs.
    Filesystem {
        /// Root directory for storage.
        path: PathBuf,
    },
    /// S3-compatible storage (AWS S3, Cloudflare R2, MinIO).
    S3 {
        /// Bucket name.
        bucket: String,
        /// Optional endpoint URL (for R2, MinIO, etc.).
        endpoint: Option<String>,
        /// Region. R2 accepts "auto".
        region: Option<String>,
        /// Optional key prefix.
        prefix: Option<String>,
        /// Access key ID. Falls back to the ambient AWS credential chain if not set.
        access_key_id: Option<String>,
        /// Secret access key. Must be set together with `access_key_id`.
        secret_access_key: Option<String>,
        /// Force path-style URLs (`endpoint/bucket/key`). Required for MinIO.
        #[serde(default)]
        force_path_style: bool,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Filesystem {
            path: PathBuf::from("./data/assets"),
        }
    }
}

impl StorageConfig {
    /// Validate storage configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            StorageConfig::S3 {
                bucket,
                access_key_id,
                secret_access_key,
                ..
            } => {
                if bucket.trim().is_empty() {
                    return Err("s3 config requires a non-empty bucket".to_string());
                }
                match (access_key_id.as_ref(), secret_access_key.as_ref()) {
                    (Some(_), Some(_)) | (None, None) => Ok(()),
                    _ => Err(
                        "s3 config requires both access_key_id and secret_access_key when either is set"
                            .to_string(),
                    ),
                }
            }
            StorageConfig::Filesystem { .. } => Ok(()),
        }
    }
}

/// Metadata store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MetadataConfig {
    /// SQLite database (single writer; suited to small deployments and tests).
    Sqlite {
        /// Database file path.
        path: PathBuf,
    },
    /// PostgreSQL database.
    Postgres {
        /// Connection URL.
        url: String,
        /// Maximum connections in the pool.
        #[serde(default = "default_max_connections")]
        max_connections: u32,
        /// Statement timeout in milliseconds.
        #[serde(default = "default_statement_timeout_ms")]
        statement_timeout_ms: Option<u64>,
    },
}

fn default_max_connections() -> u32 {
    10
}

fn default_statement_timeout_ms() -> Option<u64> {
    Some(30_000)
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: PathBuf::from("./data/folio.db"),
        }
    }
}

impl MetadataConfig {
    /// Validate metadata configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            MetadataConfig::Sqlite { .. } => Ok(()),
            MetadataConfig::Postgres {
                url,
                max_connections,
                ..
            } => {
                if url.trim().is_empty() {
                    return Err("postgres config requires a non-empty 'url'".to_string());
                }
                if *max_connections == 0 {
                    return Err("metadata.max_connections must be at least 1".to_string());
                }
                Ok(())
            }
        }
    }
}

/// Public asset addressing and upload issuance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Base URL under which stored objects are publicly served
    /// (e.g. "https://cdn.example.com"). Object keys are derived from asset
    /// URLs by stripping this prefix.
    pub public_base_url: String,
    /// Lifetime of presigned upload URLs in seconds.
    #[serde(default = "default_upload_url_ttl_secs")]
    pub upload_url_ttl_secs: u64,
    /// Extension used when an upload filename has none.
    #[serde(default = "default_extension")]
    pub default_extension: String,
}

fn default_upload_url_ttl_secs() -> u64 {
    300
}

fn default_extension() -> String {
    ".jpg".to_string()
}

impl AssetsConfig {
    /// Get the upload URL lifetime as a std::time::Duration.
    pub fn upload_url_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.upload_url_ttl_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        let base = self.public_base_url.trim();
        if base.is_empty() {
            return Err("assets.public_base_url must be set".to_string());
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(format!(
                "assets.public_base_url must be an http(s) URL, got '{base}'"
            ));
        }
        if self.upload_url_ttl_secs == 0 {
            return Err("assets.upload_url_ttl_secs cannot be 0".to_string());
        }
        if !self.default_extension.starts_with('.') {
            return Err("assets.default_extension must start with '.'".to_string());
        }
        Ok(())
    }
}

/// Pending-asset sweep scheduling.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Run the sweeper periodically inside the server process (disabled by default).
    #[serde(default)]
    pub auto_schedule_enabled: bool,
    /// Interval in seconds between automatic sweeps (default: 1 hour).
    #[serde(default = "default_sweep_interval_secs")]
    pub auto_schedule_interval_secs: u64,
}

fn default_sweep_interval_secs() -> u64 {
    3600
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            auto_schedule_enabled: false,
            auto_schedule_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl SweepConfig {
    /// Get the auto schedule interval as a std::time::Duration.
    pub fn auto_schedule_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.auto_schedule_interval_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        // A zero interval would make the scheduler loop without pausing.
        if self.auto_schedule_enabled && self.auto_schedule_interval_secs == 0 {
            return Err("sweep.auto_schedule_interval_secs cannot be 0".to_string());
        }
        Ok(())
    }
}

/// Edge cache purge and static-site redeploy hooks, fired after content changes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Cache purge endpoint (POST).
    pub purge_url: String,
    /// Bearer token sent to the purge endpoint.
    pub purge_token: String,
    /// Deploy hook (POST), called after a successful purge.
    pub deploy_hook_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_refresh_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_refresh_timeout_secs() -> u64 {
    10
}

impl RefreshConfig {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.purge_url.trim().is_empty() || self.deploy_hook_url.trim().is_empty() {
            return Err("refresh.purge_url and refresh.deploy_hook_url must be set".to_string());
        }
        Ok(())
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage backend configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Metadata store configuration.
    #[serde(default)]
    pub metadata: MetadataConfig,
    /// Public asset addressing (required).
    pub assets: AssetsConfig,
    /// Sweep scheduling.
    #[serde(default)]
    pub sweep: SweepConfig,
    /// Site refresh hooks (optional; disabled when absent).
    #[serde(default)]
    pub refresh: Option<RefreshConfig>,
}

impl AppConfig {
    /// Create a test configuration with sensible defaults.
    ///
    /// **For testing only.** Uses filesystem storage, SQLite metadata
    /// and no refresh hooks.
    pub fn for_testing() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            metadata: MetadataConfig::default(),
            assets: AssetsConfig {
                public_base_url: "https://assets.example.com".to_string(),
                upload_url_ttl_secs: default_upload_url_ttl_secs(),
                default_extension: default_extension(),
            },
            sweep: SweepConfig::default(),
            refresh: None,
        }
    }

    /// Validate every section, returning the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        self.storage.validate()?;
        self.metadata.validate()?;
        self.assets.validate()?;
        self.sweep.validate()?;
        if let Some(refresh) = &self.refresh {
            refresh.validate()?;
        }
        Ok(())
    }
}
