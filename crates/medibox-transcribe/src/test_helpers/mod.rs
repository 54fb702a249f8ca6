//! Test helpers for orchestrator and handler tests
//!
//! In-process stand-ins for the two collaborators: a storage wrapper that records calls and
//! injects failures, and a job client that replays a scripted sequence of statuses.

pub mod faulty_storage;
pub mod scripted_client;

pub use faulty_storage::{FaultyStorage, StorageOp};
pub use scripted_client::ScriptedJobClient;

use medibox_storage::{MemoryStorage, Storage};
use std::sync::Arc;

/// Job service result document carrying a single transcript segment
pub fn transcript_document(text: &str) -> Vec<u8> {
    serde_json::json!({
        "jobName": "scripted",
        "status": "COMPLETED",
        "results": {
            "transcripts": [{ "transcript": text }],
            "items": []
        }
    })
    .to_string()
    .into_bytes()
}

/// Memory storage holding one `video/mp4` artifact at `id_{subject}/{file_name}`
pub async fn storage_with_video(subject: &str, file_name: &str) -> Arc<MemoryStorage> {
    let storage = Arc::new(MemoryStorage::default());
    storage
        .put(
            &format!("id_{}/{}", subject, file_name),
            b"\x00\x00\x00\x18ftypmp42".to_vec(),
            "video/mp4",
        )
        .await
        .expect("put test video");
    storage
}
