//! Transcription orchestrator
//!
//! One call to [`TranscriptionOrchestrator::transcribe`] is one attempt:
//! `Validating -> Submitting -> Polling -> Relocating -> Extracting -> Done`, failing out of any
//! stage with a [`TranscriptionError`]. Nothing about the attempt outlives the call.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;
use std::time::Duration;

use medibox_core::keys::SubjectId;
use medibox_core::{AppError, TranscribeSettings};
use medibox_storage::{Storage, StorageError};
use thiserror::Error;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

use crate::document::TranscriptDocument;
use crate::job::{JobName, JobRequest, JobStatus, StartOutcome, TranscriptionJobClient};

const SUPPORTED_MEDIA_TYPE: &str = "video/mp4";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Submitting,
    Polling,
    Relocating,
    Extracting,
    Done,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Validating => "validating",
            Stage::Submitting => "submitting",
            Stage::Polling => "polling",
            Stage::Relocating => "relocating",
            Stage::Extracting => "extracting",
            Stage::Done => "done",
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Job submission failed: {0}")]
    JobSubmission(String),

    #[error("Job status check failed: {0}")]
    JobStatus(String),

    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Job timed out: {0}")]
    JobTimeout(String),

    #[error("Relocation failed: {0}")]
    Relocation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),
}

impl From<TranscriptionError> for AppError {
    fn from(err: TranscriptionError) -> Self {
        match err {
            TranscriptionError::InvalidRequest(msg) => AppError::InvalidRequest(msg),
            TranscriptionError::ArtifactNotFound(msg) => AppError::ArtifactNotFound(msg),
            TranscriptionError::UnsupportedMediaType(msg) => AppError::UnsupportedMediaType(msg),
            TranscriptionError::JobSubmission(msg) => AppError::JobSubmission(msg),
            TranscriptionError::JobStatus(msg) => AppError::JobStatus(msg),
            TranscriptionError::JobFailed(msg) => AppError::JobFailed(msg),
            TranscriptionError::JobTimeout(msg) => AppError::JobTimeout(msg),
            TranscriptionError::Relocation(msg) => AppError::Relocation(msg),
            TranscriptionError::Storage(msg) => AppError::Storage(msg),
            TranscriptionError::Cancelled(msg) => AppError::Cancelled(msg),
        }
    }
}

/// Fixed per deployment
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Bucket holding the artifacts; its root is the job service's scratch output location
    pub bucket: String,
    pub language_code: String,
    pub max_speaker_labels: u32,
    pub poll_interval: Duration,
    /// Measured from job submission
    pub timeout: Duration,
}

impl OrchestratorConfig {
    pub fn from_settings(settings: &TranscribeSettings, bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            language_code: settings.language_code.clone(),
            max_speaker_labels: settings.max_speaker_labels,
            poll_interval: settings.poll_interval,
            timeout: settings.timeout,
        }
    }
}

/// Outcome of a successful attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub text: String,
    pub job_name: JobName,
    /// Where the result document now lives
    pub transcript_key: String,
}

pub struct TranscriptionOrchestrator {
    storage: Arc<dyn Storage>,
    jobs: Arc<dyn TranscriptionJobClient>,
    config: OrchestratorConfig,
}

impl TranscriptionOrchestrator {
    pub fn new(
        storage: Arc<dyn Storage>,
        jobs: Arc<dyn TranscriptionJobClient>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            storage,
            jobs,
            config,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run one transcription attempt for `id_{subject_id}/{file_name}`.
    ///
    /// Holds the caller for up to the configured timeout. `cancel` ends a pending poll wait
    /// early with [`TranscriptionError::Cancelled`]; the remote job is left running.
    #[tracing::instrument(skip(self, cancel), fields(job_name = tracing::field::Empty))]
    pub async fn transcribe(
        &self,
        subject_id: &str,
        file_name: &str,
        cancel: &CancellationToken,
    ) -> Result<Transcript, TranscriptionError> {
        let subject = self.validate(subject_id, file_name).await?;

        let job_name = self.submit(&subject, file_name).await?;
        tracing::Span::current().record("job_name", job_name.as_str());

        self.poll(&job_name, cancel).await?;

        let transcript_key = self.relocate(&subject, file_name, &job_name).await?;
        let text = self.extract(&transcript_key).await?;

        tracing::info!(
            stage = %Stage::Done,
            transcript_key = %transcript_key,
            text_length = text.len(),
            "Transcription completed"
        );

        Ok(Transcript {
            text,
            job_name,
            transcript_key,
        })
    }

    async fn validate(
        &self,
        subject_id: &str,
        file_name: &str,
    ) -> Result<SubjectId, TranscriptionError> {
        if subject_id.is_empty() {
            return Err(TranscriptionError::InvalidRequest(
                "subjectId is required".to_string(),
            ));
        }
        if file_name.is_empty() {
            return Err(TranscriptionError::InvalidRequest(
                "fileName is required".to_string(),
            ));
        }
        let subject = SubjectId::parse(subject_id)
            .map_err(|e| TranscriptionError::InvalidRequest(e.to_string()))?;

        let key = subject.artifact_key(file_name);
        let head = self.storage.head(&key).await.map_err(|e| match e {
            StorageError::NotFound(_) => {
                TranscriptionError::ArtifactNotFound(format!("No artifact at {}", key))
            }
            StorageError::InvalidKey(message) => TranscriptionError::InvalidRequest(message),
            other => {
                tracing::error!(
                    stage = %Stage::Validating,
                    key = %key,
                    error = %other,
                    "Failed to read artifact metadata"
                );
                TranscriptionError::Storage(other.to_string())
            }
        })?;

        match head.content_type.as_deref() {
            Some(content_type) if content_type.eq_ignore_ascii_case(SUPPORTED_MEDIA_TYPE) => {
                Ok(subject)
            }
            other => {
                let found = other.unwrap_or("unknown");
                tracing::debug!(
                    stage = %Stage::Validating,
                    key = %key,
                    content_type = %found,
                    "Rejecting artifact with unsupported media type"
                );
                Err(TranscriptionError::UnsupportedMediaType(format!(
                    "{} has media type {}, expected {}",
                    key, found, SUPPORTED_MEDIA_TYPE
                )))
            }
        }
    }

    async fn submit(
        &self,
        subject: &SubjectId,
        file_name: &str,
    ) -> Result<JobName, TranscriptionError> {
        let name = JobName::generate(subject);
        let request = JobRequest {
            name: name.clone(),
            media_uri: self.storage.media_uri(&subject.artifact_key(file_name)),
            output_bucket: self.config.bucket.clone(),
            language_code: self.config.language_code.clone(),
            max_speaker_labels: self.config.max_speaker_labels,
        };

        tracing::info!(
            stage = %Stage::Submitting,
            job_name = %name,
            media_uri = %request.media_uri,
            "Starting transcription job"
        );

        match self.jobs.start_job(&request).await {
            Ok(StartOutcome::Started) => Ok(name),
            Ok(StartOutcome::AlreadyExists) => {
                tracing::info!(
                    stage = %Stage::Submitting,
                    job_name = %name,
                    "Transcription job already exists, polling it"
                );
                Ok(name)
            }
            Err(e) => {
                tracing::error!(
                    stage = %Stage::Submitting,
                    job_name = %name,
                    error = %e,
                    "Transcription job submission failed"
                );
                Err(TranscriptionError::JobSubmission(e.to_string()))
            }
        }
    }

    async fn poll(
        &self,
        name: &JobName,
        cancel: &CancellationToken,
    ) -> Result<(), TranscriptionError> {
        let start = Instant::now();
        let deadline = start + self.config.timeout;
        let mut attempts: u32 = 0;

        while Instant::now() < deadline {
            attempts += 1;
            let state = self.jobs.job_status(name).await.map_err(|e| {
                tracing::error!(
                    stage = %Stage::Polling,
                    job_name = %name,
                    attempts,
                    error = %e,
                    "Transcription job status check failed"
                );
                TranscriptionError::JobStatus(e.to_string())
            })?;

            tracing::debug!(
                stage = %Stage::Polling,
                job_name = %name,
                attempts,
                status = %state.status,
                "Polled transcription job"
            );

            match state.status {
                JobStatus::Completed => return Ok(()),
                JobStatus::Failed => {
                    let reason = state
                        .failure_reason
                        .unwrap_or_else(|| "no failure reason reported".to_string());
                    tracing::warn!(
                        stage = %Stage::Polling,
                        job_name = %name,
                        reason = %reason,
                        "Transcription job failed"
                    );
                    return Err(TranscriptionError::JobFailed(format!(
                        "Transcription job {} failed: {}",
                        name, reason
                    )));
                }
                JobStatus::Queued | JobStatus::InProgress => {}
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::warn!(
                        stage = %Stage::Polling,
                        job_name = %name,
                        attempts,
                        "Transcription polling cancelled"
                    );
                    return Err(TranscriptionError::Cancelled(format!(
                        "Polling of transcription job {} was cancelled",
                        name
                    )));
                }
                _ = sleep(self.config.poll_interval) => {}
            }
        }

        // The job keeps running at the service; its name only survives in this event.
        tracing::warn!(
            stage = %Stage::Polling,
            job_name = %name,
            attempts,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Transcription job did not finish before the deadline"
        );
        Err(TranscriptionError::JobTimeout(format!(
            "Transcription did not finish within {} seconds",
            self.config.timeout.as_secs()
        )))
    }

    async fn relocate(
        &self,
        subject: &SubjectId,
        file_name: &str,
        name: &JobName,
    ) -> Result<String, TranscriptionError> {
        let scratch_key = name.output_key();
        let transcript_key = subject.transcript_key(file_name);

        // Copy first: the scratch object is the only copy until this succeeds.
        self.storage
            .copy(&scratch_key, &transcript_key)
            .await
            .map_err(|e| {
                tracing::error!(
                    stage = %Stage::Relocating,
                    job_name = %name,
                    from_key = %scratch_key,
                    to_key = %transcript_key,
                    error = %e,
                    "Failed to copy transcript into subject namespace"
                );
                TranscriptionError::Relocation(e.to_string())
            })?;

        if let Err(e) = self.storage.delete(&scratch_key).await {
            tracing::warn!(
                stage = %Stage::Relocating,
                job_name = %name,
                key = %scratch_key,
                error = %e,
                "Failed to delete scratch transcript, leaving a duplicate"
            );
        }

        Ok(transcript_key)
    }

    async fn extract(&self, transcript_key: &str) -> Result<String, TranscriptionError> {
        let bytes = self.storage.get(transcript_key).await.map_err(|e| {
            tracing::error!(
                stage = %Stage::Extracting,
                key = %transcript_key,
                error = %e,
                "Failed to read relocated transcript"
            );
            TranscriptionError::Storage(e.to_string())
        })?;

        let document = TranscriptDocument::parse(&bytes).map_err(|e| {
            tracing::error!(
                stage = %Stage::Extracting,
                key = %transcript_key,
                error = %e,
                "Relocated transcript is not a valid result document"
            );
            TranscriptionError::Storage(format!(
                "Transcript at {} could not be parsed: {}",
                transcript_key, e
            ))
        })?;

        Ok(document.first_text().to_string())
    }
}
