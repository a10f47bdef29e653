//! Storage trait definitions.

use crate::error::StorageResult;
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use time::OffsetDateTime;

/// A time-limited URL a client can PUT an object to directly.
#[derive(Clone, Debug)]
pub struct PresignedUpload {
    /// Signed URL accepting a single PUT.
    pub url: String,
    /// When the signature stops being accepted.
    pub expires_at: OffsetDateTime,
}

/// Object store abstraction for media assets.
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Whether `key` is present.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Read the object stored under `key`.
    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// Write `data` under `key`, replacing any existing object.
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()>;

    /// Delete an object.
    ///
    /// Returns `StorageError::NotFound` when the key does not exist, so
    /// callers can tell "already gone" apart from a failed delete.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Issue a presigned PUT URL for `key`, valid for `expires_in`.
    async fn presign_put(&self, key: &str, expires_in: Duration)
    -> StorageResult<PresignedUpload>;

    /// Short backend identifier reported by the health endpoint and logs.
    fn backend_name(&self) -> &'static str;

    /// Probe the backend. Local backends have nothing to probe.
    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}
