//! Storage abstraction trait
//!
//! This module defines the Storage trait that all object store backends implement.

use crate::StorageBackend;
use async_trait::async_trait;
use medibox_core::AppError;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Copy failed: {0}")]
    CopyFailed(String),

    #[error("List failed: {0}")]
    ListFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::NotFound(format!("Object not found: {}", key)),
            StorageError::InvalidKey(msg) => AppError::InvalidRequest(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Metadata returned by a head lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectHead {
    pub key: String,
    pub size: u64,
    /// Declared media type, if the object was stored with one
    pub content_type: Option<String>,
}

/// Object store abstraction
///
/// All operations are independent calls with no transactional guarantee between them;
/// callers must tolerate a `put`/`copy` not yet being visible to a following `head`/`get`.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Fetch object metadata without the body
    async fn head(&self, key: &str) -> StorageResult<ObjectHead>;

    /// Download an object's bytes
    async fn get(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Store an object, replacing any existing object at the key
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()>;

    /// Server-side copy, keeping the source's content type
    async fn copy(&self, from_key: &str, to_key: &str) -> StorageResult<()>;

    /// Delete one object. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// All keys starting with `prefix`, across every result page. Keys are returned verbatim,
    /// directory markers (keys ending in `/`) included.
    async fn list_prefix(&self, prefix: &str) -> StorageResult<Vec<String>>;

    /// Delete every object whose key starts with `prefix`, returning how many were removed
    async fn delete_prefix(&self, prefix: &str) -> StorageResult<usize>;

    /// Generate a time-limited GET link for direct download
    async fn presigned_url(&self, key: &str, expires_in: Duration) -> StorageResult<String>;

    /// URI under which external services (the transcription job service) read the object
    fn media_uri(&self, key: &str) -> String;

    /// Bucket (or bucket-like root) that holds every key
    fn bucket(&self) -> &str;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

/// Reject keys no backend can address.
pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.starts_with('/') || key.split('/').any(|part| part == "..") {
        return Err(StorageError::InvalidKey(format!(
            "Storage key '{}' is empty, absolute or contains '..'",
            key
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("id_1/video.mp4").is_ok());
        assert!(validate_key("id_1/").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("/id_1/video.mp4").is_err());
        assert!(validate_key("id_1/../id_2/video.mp4").is_err());
    }

    #[test]
    fn test_not_found_maps_to_not_found() {
        let err: AppError = StorageError::NotFound("id_1/x".to_string()).into();
        assert!(matches!(err, AppError::NotFound(_)));

        let err: AppError = StorageError::CopyFailed("boom".to_string()).into();
        assert!(matches!(err, AppError::Storage(_)));
    }
}
