//! Application setup and initialization

pub mod routes;
pub mod server;
pub mod storage;
pub mod transcribe;

use crate::state::AppState;
use anyhow::{Context, Result};
use medibox_core::Config;
use medibox_infra::LogFormat;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    let log_format: LogFormat = config
        .log_format()
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    medibox_infra::init_telemetry(log_format)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        storage_backend = %config.storage_backend(),
        "Configuration loaded and validated successfully"
    );

    let storage = storage::setup_storage(&config).await?;
    let jobs = transcribe::setup_job_client(&config).await?;

    let state = Arc::new(AppState::new(config.clone(), storage, jobs));
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
