//! Shared setup for the HTTP integration tests.
//!
//! Every test app runs against in-process collaborators: a `MemoryStorage` wrapped in a
//! `FaultyStorage` (so tests can inspect calls and inject failures) and a scripted job client.

#![allow(dead_code)]

use axum_test::TestServer;
use medibox_api::setup::routes::setup_routes;
use medibox_api::AppState;
use medibox_core::{BaseConfig, Config, ServiceConfig, StorageBackend, TranscribeSettings};
use medibox_storage::MemoryStorage;
use medibox_transcribe::test_helpers::{FaultyStorage, ScriptedJobClient};
use medibox_transcribe::JobStatus;
use std::sync::Arc;
use std::time::Duration;

pub const BUCKET: &str = "medibox-test";

pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    /// Backing store, bypassing the call recorder
    pub memory: Arc<MemoryStorage>,
    pub storage: Arc<FaultyStorage>,
    pub jobs: Arc<ScriptedJobClient>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub fn test_config() -> Config {
    Config(Box::new(ServiceConfig {
        base: BaseConfig {
            server_port: 0,
            cors_origins: vec!["*".to_string()],
            environment: "test".to_string(),
            log_format: "compact".to_string(),
        },
        storage_backend: StorageBackend::Memory,
        s3_bucket: Some(BUCKET.to_string()),
        s3_region: None,
        s3_endpoint: None,
        aws_region: None,
        transcribe: TranscribeSettings {
            language_code: "he-IL".to_string(),
            max_speaker_labels: 2,
            poll_interval: Duration::from_millis(5),
            timeout: Duration::from_millis(50),
        },
        presigned_url_ttl: Duration::from_secs(900),
        upload_utc_offset_hours: 2,
        max_upload_size_bytes: 5 * 1024 * 1024,
    }))
}

/// App over an empty store whose job client never finishes
pub fn setup_test_app() -> TestApp {
    setup_test_app_with(
        Arc::new(MemoryStorage::new(BUCKET)),
        ScriptedJobClient::new([JobStatus::InProgress]),
    )
}

pub fn setup_test_app_with(memory: Arc<MemoryStorage>, jobs: ScriptedJobClient) -> TestApp {
    setup_test_app_with_config(test_config(), memory, jobs)
}

pub fn setup_test_app_with_config(
    config: Config,
    memory: Arc<MemoryStorage>,
    jobs: ScriptedJobClient,
) -> TestApp {
    let storage = Arc::new(FaultyStorage::new(memory.clone()));
    let jobs = Arc::new(jobs);
    let state = Arc::new(AppState::new(config.clone(), storage.clone(), jobs.clone()));
    let router = setup_routes(&config, state.clone()).expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        state,
        memory,
        storage,
        jobs,
    }
}

/// Put an object straight into the backing store
pub async fn seed(memory: &MemoryStorage, key: &str, content_type: &str) {
    use medibox_storage::Storage;
    memory
        .put(key, b"seed".to_vec(), content_type)
        .await
        .expect("seed object");
}
