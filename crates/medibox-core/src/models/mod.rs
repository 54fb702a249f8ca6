//! Request and response models shared by the HTTP handlers.

pub mod files;
pub mod transcription;
pub mod upload;

pub use files::{DeleteResponse, FileLink, FileLinksResponse, ObjectTargetQuery};
pub use transcription::{TranscriptionRequest, TranscriptionResponse};
pub use upload::{SubjectIdValue, UploadRequest, UploadResponse};
