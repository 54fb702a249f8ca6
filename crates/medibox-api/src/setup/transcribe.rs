//! Transcription job client setup

use anyhow::Result;
use medibox_core::Config;
use medibox_transcribe::TranscriptionJobClient;
use std::sync::Arc;

#[cfg(feature = "aws-transcribe")]
pub async fn setup_job_client(config: &Config) -> Result<Arc<dyn TranscriptionJobClient>> {
    let region = config.aws_region().or_else(|| config.storage_region());
    let client = medibox_transcribe::AwsTranscribeClient::from_env(region).await;
    tracing::info!(
        region = ?region,
        language_code = %config.transcribe().language_code,
        poll_interval_secs = config.transcribe().poll_interval.as_secs(),
        timeout_secs = config.transcribe().timeout.as_secs(),
        "AWS Transcribe client initialized"
    );
    Ok(Arc::new(client))
}

#[cfg(not(feature = "aws-transcribe"))]
pub async fn setup_job_client(_config: &Config) -> Result<Arc<dyn TranscriptionJobClient>> {
    Err(anyhow::anyhow!(
        "No transcription job client available (aws-transcribe feature not enabled)"
    ))
}
