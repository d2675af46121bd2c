use crate::traits::{object_name, Storage, StorageError, StorageResult};
use bytes::Bytes;
use framevault_core::StorageBackend;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::{ObjectStoreExt, PutPayload, Result as ObjectResult};
use std::pin::Pin;
use tokio::io::AsyncRead;

/// S3 storage implementation
///
/// Uploads land under the `uploads/` key prefix and the returned location is
/// an `s3://{bucket}/{key}` URI.
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        // Build AmazonS3 object store from environment and explicit settings.
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket.clone());

        if let Some(endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder.with_endpoint(endpoint).with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage { store, bucket })
    }

    fn key_for(name: &str) -> String {
        format!("uploads/{}", name)
    }

    fn location_uri(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, key)
    }

    async fn put(&self, key: &str, bytes: Bytes) -> StorageResult<String> {
        let size = bytes.len() as u64;
        let location = Path::from(key.to_string());
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self.store.put(&location, PutPayload::from(bytes)).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(self.location_uri(key))
    }
}

#[async_trait::async_trait]
impl Storage for S3Storage {
    async fn store(
        &self,
        filename: &str,
        correlation_id: &str,
        data: Vec<u8>,
    ) -> StorageResult<String> {
        let key = Self::key_for(&object_name(filename, correlation_id)?);
        self.put(&key, Bytes::from(data)).await
    }

    async fn store_stream(
        &self,
        filename: &str,
        correlation_id: &str,
        mut reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<String> {
        let key = Self::key_for(&object_name(filename, correlation_id)?);

        // Buffer the stream and upload in a single put; uploads are bounded by
        // the configured size ceiling so this stays within a modest allocation.
        let mut buffer = Vec::new();
        let mut chunk = vec![0u8; 8192];

        loop {
            let bytes_read = tokio::io::AsyncReadExt::read(&mut reader, &mut chunk)
                .await
                .map_err(|e| {
                    StorageError::UploadFailed(format!("Failed to read from stream: {}", e))
                })?;

            if bytes_read == 0 {
                break;
            }

            buffer.extend_from_slice(&chunk[..bytes_read]);
        }

        self.put(&key, Bytes::from(buffer)).await
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
