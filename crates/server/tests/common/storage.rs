//! Storage test utilities.

use async_trait::async_trait;
use bytes::Bytes;
use folio_storage::{ObjectStore, PresignedUpload, StorageError, StorageResult};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use time::OffsetDateTime;

/// In-memory object store that records every call.
///
/// Keys listed in `failing` make `delete` return an S3-style error.
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingStore {
    objects: Mutex<HashSet<String>>,
    failing: Mutex<HashSet<String>>,
    deletes: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert(&self, key: &str) {
        self.objects.lock().unwrap().insert(key.to_string());
    }

    pub fn fail_deletes_for(&self, key: &str) {
        self.failing.lock().unwrap().insert(key.to_string());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains(key)
    }

    /// Keys passed to `delete`, in call order.
    pub fn deleted_keys(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }

    /// Total number of calls made through the `ObjectStore` trait.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.record();
        Ok(self.contains(key))
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        self.record();
        if self.contains(key) {
            Ok(Bytes::from_static(b"data"))
        } else {
            Err(StorageError::NotFound(key.to_string()))
        }
    }

    async fn put(&self, key: &str, _data: Bytes) -> StorageResult<()> {
        self.record();
        self.insert(key);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.record();
        self.deletes.lock().unwrap().push(key.to_string());
        if self.failing.lock().unwrap().contains(key) {
            return Err(StorageError::S3("simulated outage".into()));
        }
        if self.objects.lock().unwrap().remove(key) {
            Ok(())
        } else {
            Err(StorageError::NotFound(key.to_string()))
        }
    }

    async fn presign_put(&self, key: &str, expires_in: Duration) -> StorageResult<PresignedUpload> {
        self.record();
        Ok(PresignedUpload {
            url: format!("https://upload.example.com/{key}?signature=test"),
            expires_at: OffsetDateTime::now_utc() + expires_in,
        })
    }

    fn backend_name(&self) -> &'static str {
        "recording"
    }
}
