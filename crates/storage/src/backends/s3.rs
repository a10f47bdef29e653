//! S3-compatible storage backend using AWS SDK.
//!
//! Works against AWS S3, Cloudflare R2 and MinIO. For R2 set the account
//! endpoint and region "auto"; for MinIO set `force_path_style`.

use crate::error::{StorageError, StorageResult};
use crate::traits::{ObjectStore, PresignedUpload};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_smithy_http_client::Builder as SmithyHttpClientBuilder;
use bytes::Bytes;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::instrument;

/// Upper bound on presigned URL lifetime accepted by SigV4.
const MAX_PRESIGN_EXPIRY: Duration = Duration::from_secs(7 * 24 * 60 * 60);

fn s3_error<E>(err: SdkError<E>) -> StorageError
where
    E: std::error::Error + Send + Sync + 'static,
{
    StorageError::S3(Box::new(err))
}

fn is_not_found<E>(err: &SdkError<E>) -> bool {
    matches!(err, SdkError::ServiceError(service_err) if service_err.raw().status().as_u16() == 404)
}

/// S3-compatible object store using AWS SDK.
pub struct S3Backend {
    client: Client,
    bucket: String,
    prefix: Option<String>,
}

impl std::fmt::Debug for S3Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Backend")
            .field("bucket", &self.bucket)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl S3Backend {
    /// Create a new S3 backend.
    ///
    /// Explicit credentials must be given as a pair; without them the ambient
    /// AWS credential chain is used.
    pub async fn new(
        bucket: &str,
        endpoint: Option<String>,
        region: Option<String>,
        prefix: Option<String>,
        access_key_id: Option<String>,
        secret_access_key: Option<String>,
        force_path_style: bool,
    ) -> StorageResult<Self> {
        let region = aws_config::Region::new(region.unwrap_or_else(|| "us-east-1".to_string()));

        let mut builder = match (access_key_id, secret_access_key) {
            (Some(key_id), Some(secret)) => {
                let credentials =
                    aws_sdk_s3::config::Credentials::new(key_id, secret, None, None, "folio-config");
                aws_sdk_s3::config::Builder::new()
                    .behavior_version(BehaviorVersion::latest())
                    .region(region)
                    .credentials_provider(credentials)
            }
            (None, None) => {
                let shared = aws_config::defaults(BehaviorVersion::latest())
                    .region(region)
                    .load()
                    .await;
                aws_sdk_s3::config::Builder::from(&shared)
            }
            _ => {
                return Err(StorageError::Config(
                    "s3 config requires both access_key_id and secret_access_key when either is set"
                        .to_string(),
                ));
            }
        };

        if let Some(endpoint) = endpoint {
            // Accept bare host:port endpoints such as "minio:9000".
            let endpoint = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
                endpoint
            } else {
                format!("http://{endpoint}")
            };
            if endpoint.starts_with("http://") {
                builder = builder.http_client(SmithyHttpClientBuilder::new().build_http());
            }
            builder = builder.endpoint_url(endpoint);
        }

        if force_path_style {
            builder = builder.force_path_style(true);
        }

        let prefix = prefix
            .map(|p| p.trim_matches('/').to_string())
            .filter(|p| !p.is_empty());

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: bucket.to_string(),
            prefix,
        })
    }

    /// Object key in the bucket, with the configured prefix applied.
    fn full_key(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}/{key}"),
            None => key.to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Backend {
    #[instrument(skip(self), fields(backend = "s3"))]
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(self.full_key(key))
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) if is_not_found(&err) => Ok(false),
            Err(err) => Err(s3_error(err)),
        }
    }

    #[instrument(skip(self), fields(backend = "s3"))]
    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(self.full_key(key))
            .send()
            .await
            .map_err(|err| {
                if is_not_found(&err) {
                    StorageError::NotFound(key.to_string())
                } else {
                    s3_error(err)
                }
            })?;

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::S3(Box::new(e)))?
            .into_bytes();
        Ok(bytes)
    }

    #[instrument(skip(self, data), fields(backend = "s3", size = data.len()))]
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(self.full_key(key))
            .body(data.into())
            .send()
            .await
            .map_err(s3_error)?;
        Ok(())
    }

    #[instrument(skip(self), fields(backend = "s3"))]
    async fn delete(&self, key: &str) -> StorageResult<()> {
        // DeleteObject succeeds on missing keys, so probe first to report NotFound.
        if !self.exists(key).await? {
            return Err(StorageError::NotFound(key.to_string()));
        }

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(self.full_key(key))
            .send()
            .await
            .map_err(s3_error)?;
        Ok(())
    }

    #[instrument(skip(self), fields(backend = "s3"))]
    async fn presign_put(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<PresignedUpload> {
        if expires_in.is_zero() || expires_in > MAX_PRESIGN_EXPIRY {
            return Err(StorageError::Config(format!(
                "presign expiry must be between 1s and {}s",
                MAX_PRESIGN_EXPIRY.as_secs()
            )));
        }

        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::Config(format!("invalid presign expiry: {e}")))?;
        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(self.full_key(key))
            .presigned(presigning)
            .await
            .map_err(s3_error)?;

        Ok(PresignedUpload {
            url: request.uri().to_string(),
            expires_at: OffsetDateTime::now_utc() + expires_in,
        })
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }

    /// Verify the bucket is reachable with the configured credentials.
    async fn health_check(&self) -> StorageResult<()> {
        const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

        let probe = self.client.head_bucket().bucket(&self.bucket).send();
        match tokio::time::timeout(HEALTH_CHECK_TIMEOUT, probe).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(err)) => Err(s3_error(err)),
            Err(_) => Err(StorageError::Config(format!(
                "S3 health check timed out after {}s for bucket '{}'",
                HEALTH_CHECK_TIMEOUT.as_secs(),
                self.bucket
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn backend(prefix: Option<&str>) -> S3Backend {
        S3Backend::new(
            "images",
            Some("localhost:9000".to_string()),
            Some("auto".to_string()),
            prefix.map(str::to_string),
            Some("access".to_string()),
            Some("secret".to_string()),
            true,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_full_key_applies_prefix() {
        assert_eq!(backend(None).await.full_key("a.png"), "a.png");
        assert_eq!(
            backend(Some("/media/")).await.full_key("a.png"),
            "media/a.png"
        );
        assert_eq!(backend(Some("/")).await.full_key("a.png"), "a.png");
    }

    #[tokio::test]
    async fn test_rejects_partial_credentials() {
        let result = S3Backend::new(
            "images",
            None,
            None,
            None,
            Some("access".to_string()),
            None,
            false,
        )
        .await;
        assert!(matches!(result, Err(StorageError::Config(_))));
    }

    #[tokio::test]
    async fn test_presign_put_is_local_signing() {
        let backend = backend(Some("media")).await;
        let upload = backend
            .presign_put("abc.png", Duration::from_secs(300))
            .await
            .unwrap();

        assert!(upload.url.starts_with("http://localhost:9000/images/media/abc.png?"));
        assert!(upload.url.contains("X-Amz-Expires=300"));
        assert!(upload.url.contains("X-Amz-Signature="));
        assert!(upload.expires_at > OffsetDateTime::now_utc());
    }

    #[tokio::test]
    async fn test_presign_rejects_out_of_range_expiry() {
        let backend = backend(None).await;
        assert!(backend.presign_put("a", Duration::ZERO).await.is_err());
        assert!(
            backend
                .presign_put("a", MAX_PRESIGN_EXPIRY + Duration::from_secs(1))
                .await
                .is_err()
        );
    }
}
