//! In-process object store
//!
//! Backs local runs (`STORAGE_BACKEND=memory`) and tests. Objects live in a sorted map so
//! prefix listings come back in key order, the way S3 returns them.

use crate::traits::{validate_key, ObjectHead, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    content_type: String,
}

/// Memory-backed storage
pub struct MemoryStorage {
    bucket: String,
    objects: Mutex<BTreeMap<String, StoredObject>>,
}

impl MemoryStorage {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: Mutex::new(BTreeMap::new()),
        }
    }

    fn objects(&self) -> MutexGuard<'_, BTreeMap<String, StoredObject>> {
        // A panic while holding the lock cannot leave a map entry half-written.
        self.objects.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Whether an object exists at `key`
    pub fn contains(&self, key: &str) -> bool {
        self.objects().contains_key(key)
    }

    /// Every stored key, in order
    pub fn keys(&self) -> Vec<String> {
        self.objects().keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.objects().is_empty()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new("medibox-local")
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn head(&self, key: &str) -> StorageResult<ObjectHead> {
        validate_key(key)?;
        let objects = self.objects();
        let object = objects
            .get(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;

        Ok(ObjectHead {
            key: key.to_string(),
            size: object.data.len() as u64,
            content_type: Some(object.content_type.clone()),
        })
    }

    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        validate_key(key)?;
        self.objects()
            .get(key)
            .map(|object| object.data.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()> {
        validate_key(key)?;
        let size = data.len();
        self.objects().insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        tracing::debug!(bucket = %self.bucket, key = %key, size_bytes = size, "Memory put");
        Ok(())
    }

    async fn copy(&self, from_key: &str, to_key: &str) -> StorageResult<()> {
        validate_key(from_key)?;
        validate_key(to_key)?;
        let mut objects = self.objects();
        let object = objects
            .get(from_key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(from_key.to_string()))?;
        objects.insert(to_key.to_string(), object);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.objects().remove(key);
        Ok(())
    }

    async fn list_prefix(&self, prefix: &str) -> StorageResult<Vec<String>> {
        validate_key(prefix)?;
        let objects = self.objects();
        Ok(objects
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }

    async fn delete_prefix(&self, prefix: &str) -> StorageResult<usize> {
        validate_key(prefix)?;
        let mut objects = self.objects();
        let before = objects.len();
        objects.retain(|key, _| !key.starts_with(prefix));
        let removed = before - objects.len();
        tracing::debug!(
            bucket = %self.bucket,
            prefix = %prefix,
            count = removed,
            "Memory prefix delete"
        );
        Ok(removed)
    }

    async fn presigned_url(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        validate_key(key)?;
        Ok(format!(
            "memory://{}/{}?expires_in={}",
            self.bucket,
            key,
            expires_in.as_secs()
        ))
    }

    fn media_uri(&self, key: &str) -> String {
        format!("memory://{}/{}", self.bucket, key)
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_head_get() {
        let storage = MemoryStorage::default();
        storage
            .put("id_1/clip.mp4", b"video".to_vec(), "video/mp4")
            .await
            .unwrap();

        let head = storage.head("id_1/clip.mp4").await.unwrap();
        assert_eq!(head.size, 5);
        assert_eq!(head.content_type.as_deref(), Some("video/mp4"));
        assert_eq!(storage.get("id_1/clip.mp4").await.unwrap(), b"video");
    }

    #[tokio::test]
    async fn test_missing_object_is_not_found() {
        let storage = MemoryStorage::default();
        assert!(matches!(
            storage.head("id_1/missing.mp4").await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            storage.copy("id_1/missing.mp4", "id_1/other.mp4").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_copy_keeps_content_type() {
        let storage = MemoryStorage::default();
        storage
            .put("job.json", b"{}".to_vec(), "application/json")
            .await
            .unwrap();
        storage.copy("job.json", "id_1/clip.json").await.unwrap();

        let head = storage.head("id_1/clip.json").await.unwrap();
        assert_eq!(head.content_type.as_deref(), Some("application/json"));
        assert!(storage.contains("job.json"));
    }

    #[tokio::test]
    async fn test_list_prefix_is_bounded_by_prefix() {
        let storage = MemoryStorage::default();
        for key in ["id_1/", "id_1/a.mp4", "id_1/output/", "id_10/a.mp4", "id_2/b.mp4"] {
            storage.put(key, Vec::new(), "application/octet-stream").await.unwrap();
        }

        let keys = storage.list_prefix("id_1/").await.unwrap();
        assert_eq!(keys, vec!["id_1/", "id_1/a.mp4", "id_1/output/"]);
    }

    #[tokio::test]
    async fn test_delete_prefix_removes_markers() {
        let storage = MemoryStorage::default();
        for key in ["id_1/", "id_1/output/", "id_1/output/Summary/", "id_1/a.mp4", "id_10/a.mp4"] {
            storage.put(key, Vec::new(), "application/octet-stream").await.unwrap();
        }

        assert_eq!(storage.delete_prefix("id_1/").await.unwrap(), 4);
        assert_eq!(storage.keys(), vec!["id_10/a.mp4"]);
        assert_eq!(storage.delete_prefix("id_1/").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let storage = MemoryStorage::default();
        storage.delete("id_1/none.pdf").await.unwrap();
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_key_rejected() {
        let storage = MemoryStorage::default();
        assert!(matches!(
            storage.put("", Vec::new(), "text/plain").await,
            Err(StorageError::InvalidKey(_))
        ));
    }
}
