//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::handlers;
use medibox_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Medibox API",
        version = "0.1.0",
        description = "Subject file storage and video transcription service. Files live under per-subject namespaces (`id_{subjectId}/`); transcription runs a managed speech-to-text job and returns its text."
    ),
    paths(
        // Files
        handlers::upload::upload,
        handlers::delete::delete_by_query,
        handlers::delete::delete_subject,
        handlers::delete::delete_subject_file,
        handlers::presigned_urls::links_by_query,
        handlers::presigned_urls::subject_file_links,
        // Transcription
        handlers::transcribe::transcribe,
        // Health
        handlers::health::health_check,
    ),
    components(
        schemas(
            models::SubjectIdValue,
            models::UploadRequest,
            models::UploadResponse,
            models::DeleteResponse,
            models::FileLink,
            models::FileLinksResponse,
            models::TranscriptionRequest,
            models::TranscriptionResponse,
            handlers::health::HealthResponse,
            medibox_infra::ErrorResponse,
        )
    ),
    tags(
        (name = "files", description = "Upload, delete and download links for subject files"),
        (name = "transcription", description = "Video transcription"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_all_paths() {
        let spec = ApiDoc::openapi();
        for path in [
            "/upload",
            "/files",
            "/subjects/{subject_id}",
            "/subjects/{subject_id}/files/{file_name}",
            "/presigned-urls",
            "/subjects/{subject_id}/files/{file_name}/url",
            "/transcribe",
            "/health",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
