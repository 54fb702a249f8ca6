use crate::traits::{validate_key, ObjectHead, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use aws_config::retry::{RetryConfig, RetryMode};
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use aws_sdk_s3::Client;
use bytes::Bytes;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, Attributes, GetOptions, ObjectStore, ObjectStoreExt, PutOptions, PutPayload,
    Result as ObjectResult,
};
use std::time::Duration;

/// `DeleteObjects` accepts at most this many keys per request
const MAX_DELETE_BATCH: usize = 1000;

/// S3 storage implementation
///
/// Object bodies go through `object_store`. Its paths cannot end with `/`, so directory marker
/// keys, prefix listings and prefix deletion use the S3 SDK client, which keeps keys verbatim.
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    client: Client,
    bucket: String,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO, "http://localhost:4566" for LocalStack)
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        // Credentials come from the standard AWS environment variables.
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(endpoint) = &endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder.with_endpoint(endpoint.clone()).with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        let retry_config = RetryConfig::standard()
            .with_max_attempts(5)
            .with_retry_mode(RetryMode::Adaptive);

        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(region))
            .retry_config(retry_config)
            .load()
            .await;

        let mut s3_config = aws_sdk_s3::config::Builder::from(&config);
        if let Some(endpoint) = endpoint_url {
            // Path-style addressing for S3-compatible providers (MinIO, LocalStack)
            s3_config = s3_config.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(Self::with_clients(
            store,
            Client::from_conf(s3_config.build()),
            bucket,
        ))
    }

    fn with_clients(store: AmazonS3, client: Client, bucket: String) -> Self {
        S3Storage {
            store,
            client,
            bucket,
        }
    }

    /// Every key under `prefix`, verbatim, following continuation tokens
    async fn list_keys(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .into_paginator()
            .send();

        let mut keys = Vec::new();
        while let Some(page) = pages.next().await {
            let page =
                page.map_err(|e| StorageError::ListFailed(DisplayErrorContext(&e).to_string()))?;
            keys.extend(
                page.contents()
                    .iter()
                    .filter_map(|object| object.key())
                    .map(str::to_string),
            );
        }
        Ok(keys)
    }

    async fn put_marker(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }

    async fn delete_marker(&self, key: &str) -> StorageResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::DeleteFailed(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }

    fn location(key: &str) -> StorageResult<Path> {
        validate_key(key)?;
        Ok(Path::from(key))
    }
}

fn is_directory_marker(key: &str) -> bool {
    key.ends_with('/')
}

/// Split keys into `DeleteObjects` payloads of at most [`MAX_DELETE_BATCH`] keys each.
fn delete_batches(keys: &[String]) -> StorageResult<Vec<Delete>> {
    keys.chunks(MAX_DELETE_BATCH)
        .map(|chunk| {
            let objects = chunk
                .iter()
                .map(|key| ObjectIdentifier::builder().key(key).build())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| StorageError::DeleteFailed(e.to_string()))?;
            Delete::builder()
                .set_objects(Some(objects))
                .quiet(true)
                .build()
                .map_err(|e| StorageError::DeleteFailed(e.to_string()))
        })
        .collect()
}

#[async_trait]
impl Storage for S3Storage {
    async fn head(&self, key: &str) -> StorageResult<ObjectHead> {
        let start = std::time::Instant::now();
        let location = Self::location(key)?;

        let options = GetOptions {
            head: true,
            ..Default::default()
        };
        let result: ObjectResult<_> = self.store.get_opts(&location, options).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 head failed"
                );
                StorageError::BackendError(other.to_string())
            }
        })?;

        let content_type = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|value| value.to_string());

        Ok(ObjectHead {
            key: key.to_string(),
            size: result.meta.size,
            content_type,
        })
    }

    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        let start = std::time::Instant::now();
        let location = Self::location(key)?;

        let result: ObjectResult<_> = self.store.get(&location).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 download failed"
                );
                StorageError::DownloadFailed(other.to_string())
            }
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = bytes.len() as u64,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 download successful"
        );

        Ok(bytes.to_vec())
    }

    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()> {
        validate_key(key)?;
        let size = data.len() as u64;
        let start = std::time::Instant::now();

        if is_directory_marker(key) {
            self.put_marker(key, data, content_type).await.map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 directory marker upload failed"
                );
                e
            })?;
            tracing::info!(
                bucket = %self.bucket,
                key = %key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 directory marker created"
            );
            return Ok(());
        }

        let location = Path::from(key);

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        let result: ObjectResult<_> = self
            .store
            .put_opts(&location, PutPayload::from(Bytes::from(data)), options)
            .await;

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
            content_type = %content_type,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    async fn copy(&self, from_key: &str, to_key: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let from = Self::location(from_key)?;
        let to = Self::location(to_key)?;

        let copy_result: ObjectResult<_> = self.store.copy(&from, &to).await;

        copy_result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(from_key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    from_key = %from_key,
                    to_key = %to_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 copy failed"
                );
                StorageError::CopyFailed(other.to_string())
            }
        })?;

        tracing::info!(
            from_key = %from_key,
            to_key = %to_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 copy successful"
        );

        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        let start = std::time::Instant::now();

        if is_directory_marker(key) {
            self.delete_marker(key).await.map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 directory marker delete failed"
                );
                e
            })?;
            tracing::info!(bucket = %self.bucket, key = %key, "S3 directory marker deleted");
            return Ok(());
        }

        let location = Path::from(key);

        let result: ObjectResult<_> = self.store.delete(&location).await;

        match result {
            Ok(()) | Err(ObjectStoreError::NotFound { .. }) => {}
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 delete failed"
                );
                return Err(StorageError::DeleteFailed(e.to_string()));
            }
        }

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    async fn list_prefix(&self, prefix: &str) -> StorageResult<Vec<String>> {
        validate_key(prefix)?;
        let start = std::time::Instant::now();

        let keys = self.list_keys(prefix).await.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                prefix = %prefix,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 list failed"
            );
            e
        })?;

        tracing::debug!(
            bucket = %self.bucket,
            prefix = %prefix,
            count = keys.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 list successful"
        );

        Ok(keys)
    }

    async fn delete_prefix(&self, prefix: &str) -> StorageResult<usize> {
        validate_key(prefix)?;
        let start = std::time::Instant::now();

        let keys = self.list_keys(prefix).await?;
        for batch in delete_batches(&keys)? {
            let output = self
                .client
                .delete_objects()
                .bucket(&self.bucket)
                .delete(batch)
                .send()
                .await
                .map_err(|e| {
                    tracing::error!(
                        error = %DisplayErrorContext(&e),
                        bucket = %self.bucket,
                        prefix = %prefix,
                        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                        "S3 batch delete failed"
                    );
                    StorageError::DeleteFailed(DisplayErrorContext(&e).to_string())
                })?;

            // Quiet mode reports only the keys that could not be deleted.
            if let Some(failed) = output.errors().first() {
                return Err(StorageError::DeleteFailed(format!(
                    "{}: {}",
                    failed.key().unwrap_or("<unknown>"),
                    failed.message().unwrap_or("no message")
                )));
            }
        }

        tracing::info!(
            bucket = %self.bucket,
            prefix = %prefix,
            count = keys.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 prefix delete successful"
        );

        Ok(keys.len())
    }

    async fn presigned_url(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        let location = Self::location(key)?;
        let url_result: ObjectResult<_> = self
            .store
            .signed_url(Method::GET, &location, expires_in)
            .await;

        let url = url_result
            .map_err(|e| StorageError::BackendError(e.to_string()))?
            .to_string();

        Ok(url)
    }

    fn media_uri(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, key)
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::config::{Credentials, Region};

    /// Storage pointed at a port nobody listens on, with retries off so calls fail fast
    fn unreachable_storage() -> S3Storage {
        let endpoint = "http://127.0.0.1:1";
        let store = AmazonS3Builder::new()
            .with_region("eu-west-1")
            .with_bucket_name("medibox-test")
            .with_endpoint(endpoint)
            .with_allow_http(true)
            .with_access_key_id("test")
            .with_secret_access_key("test")
            .build()
            .unwrap();
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("eu-west-1"))
            .endpoint_url(endpoint)
            .credentials_provider(Credentials::new("test", "test", None, None, "static"))
            .retry_config(RetryConfig::disabled())
            .force_path_style(true)
            .build();
        S3Storage::with_clients(store, Client::from_conf(config), "medibox-test".to_string())
    }

    #[test]
    fn test_media_uri() {
        let storage = unreachable_storage();
        assert_eq!(
            storage.media_uri("id_1/220206-143000.mp4"),
            "s3://medibox-test/id_1/220206-143000.mp4"
        );
        assert_eq!(storage.bucket(), "medibox-test");
        assert_eq!(storage.backend_type(), StorageBackend::S3);
    }

    #[test]
    fn test_directory_marker_detection() {
        assert!(is_directory_marker("id_1/output/"));
        assert!(!is_directory_marker("id_1/output/a.json"));
    }

    #[test]
    fn test_delete_batches_keep_raw_keys() {
        let mut keys: Vec<String> = (0..2500).map(|i| format!("id_42/{}.pdf", i)).collect();
        keys[0] = "id_42/".to_string();
        keys[1] = "id_42/output/Summary/".to_string();

        let batches = delete_batches(&keys).unwrap();
        let sizes: Vec<usize> = batches.iter().map(|b| b.objects().len()).collect();
        assert_eq!(sizes, vec![1000, 1000, 500]);
        assert_eq!(batches[0].objects()[0].key(), "id_42/");
        assert_eq!(batches[0].objects()[1].key(), "id_42/output/Summary/");
        assert_eq!(batches[0].quiet(), Some(true));
        assert!(delete_batches(&[]).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_marker_writes_reach_the_service() {
        let storage = unreachable_storage();

        assert!(matches!(
            storage
                .put("id_42/output/", Vec::new(), "application/octet-stream")
                .await,
            Err(StorageError::UploadFailed(_))
        ));
        assert!(matches!(
            storage.delete("id_42/output/").await,
            Err(StorageError::DeleteFailed(_))
        ));
        assert!(matches!(
            storage.delete_prefix("id_42/").await,
            Err(StorageError::ListFailed(_))
        ));
    }
}
