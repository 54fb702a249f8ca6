//! Job service contract and job identity.

use std::fmt::{Display, Formatter, Result as FmtResult};

use async_trait::async_trait;
use medibox_core::SubjectId;
use thiserror::Error;
use uuid::Uuid;

const JOB_NAME_PREFIX: &str = "transcription";

/// Caller-chosen job identifier, which is the only identity the job service knows.
///
/// A fresh name is generated per attempt so two attempts never collide. Submitting a name the
/// service already knows is reported as [`StartOutcome::AlreadyExists`] and the caller resumes
/// polling under that name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobName(String);

impl JobName {
    /// `transcription_{subject_id}_{uuid as 32 hex chars}`
    pub fn generate(subject: &SubjectId) -> Self {
        JobName(format!(
            "{}_{}_{}",
            JOB_NAME_PREFIX,
            subject.as_str(),
            Uuid::new_v4().simple()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key of the result document the service writes at the bucket root.
    pub fn output_key(&self) -> String {
        format!("{}.json", self.0)
    }
}

impl Display for JobName {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// Everything the job service needs to start one transcription
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub name: JobName,
    /// Location the service reads the media from
    pub media_uri: String,
    /// Bucket whose root receives `<name>.json`
    pub output_bucket: String,
    pub language_code: String,
    pub max_speaker_labels: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// The service already has a job under this name
    AlreadyExists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "QUEUED",
            JobStatus::InProgress => "IN_PROGRESS",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
        }
    }
}

impl Display for JobStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// One status observation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobState {
    pub status: JobStatus,
    pub failure_reason: Option<String>,
}

impl JobState {
    pub fn new(status: JobStatus) -> Self {
        Self {
            status,
            failure_reason: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            failure_reason: Some(reason.into()),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum TranscribeError {
    #[error("Failed to start transcription job: {0}")]
    Start(String),

    #[error("Failed to get transcription job status: {0}")]
    Status(String),
}

/// Asynchronous speech-to-text job service
///
/// There is no push notification; completion is only observed through [`job_status`].
///
/// [`job_status`]: TranscriptionJobClient::job_status
#[async_trait]
pub trait TranscriptionJobClient: Send + Sync {
    async fn start_job(&self, request: &JobRequest) -> Result<StartOutcome, TranscribeError>;

    async fn job_status(&self, name: &JobName) -> Result<JobState, TranscribeError>;
}
