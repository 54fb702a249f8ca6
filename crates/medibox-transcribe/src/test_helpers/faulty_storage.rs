use async_trait::async_trait;
use medibox_storage::{ObjectHead, Storage, StorageBackend, StorageError, StorageResult};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageOp {
    Head,
    Get,
    Put,
    Copy,
    Delete,
    DeletePrefix,
    List,
    Presign,
}

/// Wraps another storage, recording each call and failing the operations it is told to fail.
pub struct FaultyStorage {
    inner: Arc<dyn Storage>,
    failing: Mutex<HashSet<StorageOp>>,
    calls: Mutex<Vec<(StorageOp, String)>>,
}

impl FaultyStorage {
    pub fn new(inner: Arc<dyn Storage>) -> Self {
        Self {
            inner,
            failing: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Make every later call of `op` fail with a backend error.
    pub fn fail(&self, op: StorageOp) -> &Self {
        self.failing.lock().unwrap().insert(op);
        self
    }

    pub fn calls(&self) -> Vec<(StorageOp, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_of(&self, op: StorageOp) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|(recorded, _)| *recorded == op)
            .map(|(_, key)| key)
            .collect()
    }

    fn record(&self, op: StorageOp, key: &str) -> StorageResult<()> {
        self.calls.lock().unwrap().push((op, key.to_string()));
        if self.failing.lock().unwrap().contains(&op) {
            let message = format!("injected {:?} failure for {}", op, key);
            return Err(match op {
                StorageOp::Put => StorageError::UploadFailed(message),
                StorageOp::Get => StorageError::DownloadFailed(message),
                StorageOp::Copy => StorageError::CopyFailed(message),
                StorageOp::Delete | StorageOp::DeletePrefix => {
                    StorageError::DeleteFailed(message)
                }
                StorageOp::List => StorageError::ListFailed(message),
                StorageOp::Head | StorageOp::Presign => StorageError::BackendError(message),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for FaultyStorage {
    async fn head(&self, key: &str) -> StorageResult<ObjectHead> {
        self.record(StorageOp::Head, key)?;
        self.inner.head(key).await
    }

    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.record(StorageOp::Get, key)?;
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()> {
        self.record(StorageOp::Put, key)?;
        self.inner.put(key, data, content_type).await
    }

    async fn copy(&self, from_key: &str, to_key: &str) -> StorageResult<()> {
        self.record(StorageOp::Copy, from_key)?;
        self.inner.copy(from_key, to_key).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.record(StorageOp::Delete, key)?;
        self.inner.delete(key).await
    }

    async fn list_prefix(&self, prefix: &str) -> StorageResult<Vec<String>> {
        self.record(StorageOp::List, prefix)?;
        self.inner.list_prefix(prefix).await
    }

    async fn delete_prefix(&self, prefix: &str) -> StorageResult<usize> {
        self.record(StorageOp::DeletePrefix, prefix)?;
        self.inner.delete_prefix(prefix).await
    }

    async fn presigned_url(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        self.record(StorageOp::Presign, key)?;
        self.inner.presigned_url(key, expires_in).await
    }

    fn media_uri(&self, key: &str) -> String {
        self.inner.media_uri(key)
    }

    fn bucket(&self) -> &str {
        self.inner.bucket()
    }

    fn backend_type(&self) -> StorageBackend {
        self.inner.backend_type()
    }
}
