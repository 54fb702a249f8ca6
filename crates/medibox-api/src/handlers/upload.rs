//! Upload handler: store a base64 file in a subject namespace, or create the subject's
//! empty directory layout.

use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, Json};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use medibox_core::models::{SubjectIdValue, UploadRequest, UploadResponse};
use medibox_core::{AppError, SubjectId};
use medibox_infra::ErrorResponse;
use std::sync::Arc;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
const FALLBACK_EXTENSION: &str = "bin";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H:%M:%S";

fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    match content_type {
        "application/pdf" => Some("pdf"),
        "video/mp4" => Some("mp4"),
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "application/json" => Some("json"),
        _ => None,
    }
}

/// Extension for a timestamped key: the part of `file_name` after its last dot, else one
/// derived from the content type, else `bin`.
fn resolve_extension<'a>(file_name: Option<&'a str>, content_type: Option<&str>) -> &'a str {
    file_name
        .filter(|name| name.contains('.'))
        .and_then(|name| name.rsplit('.').next())
        .filter(|ext| !ext.is_empty())
        .or_else(|| content_type.and_then(extension_for_content_type))
        .unwrap_or(FALLBACK_EXTENSION)
}

/// Key for an uploaded file.
///
/// `overwrite` with a file name stores under that exact name; anything else gets a
/// timestamp rendered at the deployment's UTC offset, so repeated uploads never collide
/// within a second's resolution.
fn resolve_upload_key(
    subject: &SubjectId,
    file_name: Option<&str>,
    content_type: Option<&str>,
    overwrite: bool,
    now: DateTime<Utc>,
    utc_offset_hours: i32,
) -> String {
    if overwrite {
        if let Some(name) = file_name {
            return subject.artifact_key(name);
        }
        tracing::info!(
            subject_id = %subject,
            "Overwrite requested without fileName, using timestamped key"
        );
    }

    let offset = FixedOffset::east_opt(utc_offset_hours * 3600).unwrap_or(Utc.fix());
    let timestamp = now.with_timezone(&offset).format(TIMESTAMP_FORMAT);
    subject.artifact_key(&format!(
        "{}.{}",
        timestamp,
        resolve_extension(file_name, content_type)
    ))
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "files",
    request_body = UploadRequest,
    responses(
        (status = 200, description = "File stored or directory layout created", body = UploadResponse),
        (status = 400, description = "Missing id or invalid base64 content", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(subject_id = tracing::field::Empty, operation = "upload"))]
pub async fn upload(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<UploadRequest>,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let subject = request
        .id
        .map(SubjectIdValue::into_string)
        .ok_or_else(|| AppError::InvalidRequest("Missing 'id' in the request body".to_string()))
        .and_then(SubjectId::parse)?;
    tracing::Span::current().record("subject_id", subject.as_str());

    let file_name = request.file_name.as_deref().filter(|name| !name.is_empty());
    let content_type = request.content_type.as_deref();

    let response = match request.file.as_deref().filter(|file| !file.is_empty()) {
        Some(encoded) => {
            let data = STANDARD.decode(encoded.trim()).map_err(|e| {
                AppError::InvalidRequest(format!("Invalid Base64 file content: {}", e))
            })?;
            let key = resolve_upload_key(
                &subject,
                file_name,
                content_type,
                request.overwrite,
                Utc::now(),
                state.config.upload_utc_offset_hours(),
            );

            state
                .storage
                .put(&key, data, content_type.unwrap_or(DEFAULT_CONTENT_TYPE))
                .await?;

            tracing::info!(key = %key, "File uploaded");
            UploadResponse {
                message: format!("File uploaded successfully to {}", key),
                s3_key: key,
            }
        }
        None => {
            let layout = subject.directory_layout();
            for key in &layout {
                state
                    .storage
                    .put(key, Vec::new(), DEFAULT_CONTENT_TYPE)
                    .await?;
            }

            tracing::info!(root = %layout[0], "Directory structure created");
            UploadResponse {
                message: format!(
                    "Directory structure created successfully: {}",
                    layout.join(", ")
                ),
                s3_key: subject.root(),
            }
        }
    };

    Ok(Json(response))
}
