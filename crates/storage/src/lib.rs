//! Object storage abstraction and backends for folio.
//!
//! This crate provides:
//! - The `ObjectStore` trait used for media assets (put, delete, presigned uploads)
//! - Backends: local filesystem and S3-compatible (AWS S3, R2, MinIO)
//! - Mapping between public asset URLs and object keys

pub mod backends;
pub mod error;
pub mod public_url;
pub mod traits;

pub use backends::{filesystem::FilesystemBackend, s3::S3Backend};
pub use error::{StorageError, StorageResult};
pub use public_url::PublicBaseUrl;
pub use traits::{ObjectStore, PresignedUpload};

use folio_core::config::StorageConfig;
use std::sync::Arc;

/// Create an object store from configuration.
pub async fn from_config(config: &StorageConfig) -> StorageResult<Arc<dyn ObjectStore>> {
    config.validate().map_err(StorageError::Config)?;

    match config {
        StorageConfig::Filesystem { path } => {
            let backend = FilesystemBackend::new(path).await?;
            Ok(Arc::new(backend))
        }
        StorageConfig::S3 {
            bucket,
            endpoint,
            region,
            prefix,
            access_key_id,
            secret_access_key,
            force_path_style,
        } => {
            let backend = S3Backend::new(
                bucket,
                endpoint.clone(),
                region.clone(),
                prefix.clone(),
                access_key_id.clone(),
                secret_access_key.clone(),
                *force_path_style,
            )
            .await?;
            Ok(Arc::new(backend))
        }
    }
}
