//! Transcription job orchestration
//!
//! Submits a speech-to-text job for a subject's video artifact, polls it to completion under a
//! deadline, moves the result into the subject namespace and extracts the transcript text.
//!
//! The orchestrator depends only on the [`Storage`](medibox_storage::Storage) and
//! [`TranscriptionJobClient`] traits; `AwsTranscribeClient` is the production job client.

#[cfg(feature = "aws-transcribe")]
pub mod aws;
pub mod document;
pub mod job;
pub mod orchestrator;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

#[cfg(feature = "aws-transcribe")]
pub use aws::AwsTranscribeClient;
pub use document::TranscriptDocument;
pub use job::{
    JobName, JobRequest, JobState, JobStatus, StartOutcome, TranscribeError,
    TranscriptionJobClient,
};
pub use orchestrator::{
    OrchestratorConfig, Stage, Transcript, TranscriptionError, TranscriptionOrchestrator,
};
