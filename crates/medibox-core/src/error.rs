//! Error types module
//!
//! `AppError` is the single error type surfaced at the HTTP boundary. Storage and
//! transcription crates convert their own errors into it, and `ErrorMetadata` describes how
//! each variant is presented (status code, machine-readable kind, log level).

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for failures reported by the job service or timeouts
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error kind (e.g., "ArtifactNotFound")
    fn error_kind(&self) -> &'static str;

    /// Whether the caller may retry the same request
    fn is_recoverable(&self) -> bool;

    /// Client-facing message
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Job submission failed: {0}")]
    JobSubmission(String),

    #[error("Transcription job failed: {0}")]
    JobFailed(String),

    #[error("Transcription job status unavailable: {0}")]
    JobStatus(String),

    #[error("Transcription job timed out: {0}")]
    JobTimeout(String),

    #[error("Transcript relocation failed: {0}")]
    Relocation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Request cancelled: {0}")]
    Cancelled(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidRequest(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_kind, recoverable, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::InvalidRequest(_) => (400, "InvalidRequest", false, LogLevel::Debug),
        AppError::ArtifactNotFound(_) => (400, "ArtifactNotFound", false, LogLevel::Debug),
        AppError::UnsupportedMediaType(_) => {
            (400, "UnsupportedMediaType", false, LogLevel::Debug)
        }
        AppError::NotFound(_) => (404, "NotFound", false, LogLevel::Debug),
        AppError::JobSubmission(_) => (500, "JobSubmissionError", true, LogLevel::Error),
        AppError::JobFailed(_) => (500, "JobFailed", false, LogLevel::Warn),
        AppError::JobStatus(_) => (500, "JobStatusError", true, LogLevel::Error),
        AppError::JobTimeout(_) => (504, "JobTimeout", true, LogLevel::Warn),
        AppError::Relocation(_) => (500, "RelocationError", true, LogLevel::Error),
        AppError::Storage(_) => (500, "StorageError", true, LogLevel::Error),
        AppError::Cancelled(_) => (499, "Cancelled", true, LogLevel::Warn),
        AppError::Internal(_) => (500, "Internal", true, LogLevel::Error),
        AppError::InternalWithSource { .. } => (500, "Internal", true, LogLevel::Error),
    }
}

impl AppError {
    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_kind(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidRequest(ref msg)
            | AppError::ArtifactNotFound(ref msg)
            | AppError::UnsupportedMediaType(ref msg)
            | AppError::NotFound(ref msg)
            | AppError::JobFailed(ref msg)
            | AppError::JobTimeout(ref msg) => msg.clone(),
            AppError::JobSubmission(ref msg) => {
                format!("Failed to start transcription job: {}", msg)
            }
            AppError::JobStatus(ref msg) => {
                format!("Failed to read transcription job status: {}", msg)
            }
            AppError::Relocation(ref msg) => format!("Failed to relocate transcript: {}", msg),
            AppError::Storage(ref msg) => format!("Storage error: {}", msg),
            AppError::Cancelled(ref msg) => msg.clone(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }
}
