use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, Json};
use medibox_core::models::{SubjectIdValue, TranscriptionRequest, TranscriptionResponse};
use medibox_infra::ErrorResponse;
use std::sync::Arc;

/// Run a transcription for a subject's video and return its text.
///
/// The request is held open until the job finishes, fails or runs out of budget.
#[utoipa::path(
    post,
    path = "/transcribe",
    tag = "transcription",
    request_body = TranscriptionRequest,
    responses(
        (status = 200, description = "Transcript text", body = TranscriptionResponse),
        (status = 400, description = "InvalidRequest, ArtifactNotFound or UnsupportedMediaType", body = ErrorResponse),
        (status = 499, description = "Cancelled by server shutdown", body = ErrorResponse),
        (status = 500, description = "JobSubmissionError, JobStatusError, JobFailed, RelocationError or StorageError", body = ErrorResponse),
        (status = 504, description = "JobTimeout", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "transcribe"))]
pub async fn transcribe(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<TranscriptionRequest>,
) -> Result<Json<TranscriptionResponse>, HttpAppError> {
    let subject_id = request
        .subject_id
        .map(SubjectIdValue::into_string)
        .unwrap_or_default();
    let file_name = request.file_name.unwrap_or_default();

    let transcript = state
        .orchestrator
        .transcribe(&subject_id, &file_name, &state.shutdown)
        .await?;

    Ok(Json(TranscriptionResponse {
        transcript_text: transcript.text,
    }))
}
