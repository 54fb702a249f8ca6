//! Application state shared by all handlers.

use medibox_core::Config;
use medibox_storage::Storage;
use medibox_transcribe::{OrchestratorConfig, TranscriptionJobClient, TranscriptionOrchestrator};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub orchestrator: TranscriptionOrchestrator,
    /// Cancelled when the server starts shutting down
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Wire the orchestrator to the given collaborators. The storage bucket doubles as the
    /// job service's output location.
    pub fn new(
        config: Config,
        storage: Arc<dyn Storage>,
        jobs: Arc<dyn TranscriptionJobClient>,
    ) -> Self {
        let orchestrator_config =
            OrchestratorConfig::from_settings(config.transcribe(), storage.bucket());
        let orchestrator = TranscriptionOrchestrator::new(storage.clone(), jobs, orchestrator_config);

        Self {
            config,
            storage,
            orchestrator,
            shutdown: CancellationToken::new(),
        }
    }
}
