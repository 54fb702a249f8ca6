//! AWS Transcribe job client

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_transcribe::error::DisplayErrorContext;
use aws_sdk_transcribe::types::{LanguageCode, Media, Settings, TranscriptionJobStatus};
use aws_sdk_transcribe::Client as TranscribeClient;
use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::job::{
    JobName, JobRequest, JobState, JobStatus, StartOutcome, TranscribeError,
    TranscriptionJobClient,
};

/// Job client backed by AWS Transcribe batch jobs
#[derive(Clone)]
pub struct AwsTranscribeClient {
    client: TranscribeClient,
}

impl Debug for AwsTranscribeClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AwsTranscribeClient").finish()
    }
}

impl AwsTranscribeClient {
    /// Create a client from the default AWS credential chain.
    ///
    /// `region` overrides the region from the environment when given.
    pub async fn from_env(region: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region.to_string()));
        }
        let config = loader.load().await;

        Self {
            client: TranscribeClient::new(&config),
        }
    }

    pub fn new(client: TranscribeClient) -> Self {
        Self { client }
    }
}

fn map_status(status: Option<&TranscriptionJobStatus>) -> JobStatus {
    match status {
        Some(TranscriptionJobStatus::Completed) => JobStatus::Completed,
        Some(TranscriptionJobStatus::Failed) => JobStatus::Failed,
        Some(TranscriptionJobStatus::Queued) => JobStatus::Queued,
        // Unknown values keep the poll loop going until the deadline.
        _ => JobStatus::InProgress,
    }
}

#[async_trait]
impl TranscriptionJobClient for AwsTranscribeClient {
    async fn start_job(&self, request: &JobRequest) -> Result<StartOutcome, TranscribeError> {
        let media = Media::builder().media_file_uri(&request.media_uri).build();
        let settings = Settings::builder()
            .show_speaker_labels(true)
            .max_speaker_labels(request.max_speaker_labels as i32)
            .build();

        let result = self
            .client
            .start_transcription_job()
            .transcription_job_name(request.name.as_str())
            .media(media)
            .output_bucket_name(&request.output_bucket)
            .language_code(LanguageCode::from(request.language_code.as_str()))
            .settings(settings)
            .send()
            .await;

        match result {
            Ok(_) => Ok(StartOutcome::Started),
            Err(err) => {
                let service_error = err.into_service_error();
                if service_error.is_conflict_exception() {
                    Ok(StartOutcome::AlreadyExists)
                } else {
                    Err(TranscribeError::Start(
                        DisplayErrorContext(&service_error).to_string(),
                    ))
                }
            }
        }
    }

    async fn job_status(&self, name: &JobName) -> Result<JobState, TranscribeError> {
        let response = self
            .client
            .get_transcription_job()
            .transcription_job_name(name.as_str())
            .send()
            .await
            .map_err(|e| TranscribeError::Status(DisplayErrorContext(&e).to_string()))?;

        let job = response.transcription_job().ok_or_else(|| {
            TranscribeError::Status(format!("Transcription job {} not found in response", name))
        })?;

        Ok(JobState {
            status: map_status(job.transcription_job_status()),
            failure_reason: job.failure_reason().map(str::to_string),
        })
    }
}
