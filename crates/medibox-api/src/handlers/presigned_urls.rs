//! Time-limited download links for subject files.
//!
//! A `*` anywhere in the file name turns the request into a suffix match over the subject
//! namespace: `*.pdf` links every key ending in `.pdf`.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use medibox_core::keys::file_name_of;
use medibox_core::models::{FileLink, FileLinksResponse, ObjectTargetQuery};
use medibox_core::{AppError, SubjectId};
use medibox_infra::ErrorResponse;
use std::sync::Arc;

const WILDCARD: char = '*';

async fn links_for(
    state: &AppState,
    subject_id: Option<String>,
    file_name: Option<&str>,
) -> Result<Json<FileLinksResponse>, HttpAppError> {
    let (subject_id, file_name) = match (subject_id.filter(|id| !id.is_empty()), file_name) {
        (Some(subject_id), Some(file_name)) => (subject_id, file_name),
        _ => {
            return Err(AppError::InvalidRequest("Missing patientId or fileName".to_string()).into())
        }
    };
    let subject = SubjectId::parse(subject_id)?;
    let ttl = state.config.presigned_url_ttl();

    let files = if file_name.contains(WILDCARD) {
        let suffix = file_name.replace(WILDCARD, "");
        let keys: Vec<String> = state
            .storage
            .list_prefix(&subject.root())
            .await?
            .into_iter()
            .filter(|key| key.ends_with(&suffix))
            .collect();

        if keys.is_empty() {
            return Err(AppError::NotFound(format!(
                "No matching files found for {} under {}",
                file_name,
                subject.root()
            ))
            .into());
        }

        let mut files = Vec::with_capacity(keys.len());
        for key in &keys {
            files.push(FileLink {
                url: state.storage.presigned_url(key, ttl).await?,
                file_name: file_name_of(key).to_string(),
            });
        }
        tracing::debug!(suffix = %suffix, count = files.len(), "Generated links for wildcard match");
        files
    } else {
        let key = subject.artifact_key(file_name);
        vec![FileLink {
            url: state.storage.presigned_url(&key, ttl).await?,
            file_name: file_name.to_string(),
        }]
    };

    Ok(Json(FileLinksResponse { files }))
}

#[utoipa::path(
    get,
    path = "/presigned-urls",
    tag = "files",
    params(ObjectTargetQuery),
    responses(
        (status = 200, description = "Download links", body = FileLinksResponse),
        (status = 400, description = "Missing patientId or fileName", body = ErrorResponse),
        (status = 404, description = "Wildcard matched no files", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "presigned_urls"))]
pub async fn links_by_query(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ObjectTargetQuery>,
) -> Result<Json<FileLinksResponse>, HttpAppError> {
    let file_name = query.file_name().map(str::to_string);
    links_for(&state, query.patient_id, file_name.as_deref()).await
}

#[utoipa::path(
    get,
    path = "/subjects/{subject_id}/files/{file_name}/url",
    tag = "files",
    params(
        ("subject_id" = String, Path, description = "Subject id"),
        ("file_name" = String, Path, description = "File name, or a pattern such as `*.pdf`")
    ),
    responses(
        (status = 200, description = "Download links", body = FileLinksResponse),
        (status = 404, description = "Wildcard matched no files", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "presigned_urls"))]
pub async fn subject_file_links(
    State(state): State<Arc<AppState>>,
    Path((subject_id, file_name)): Path<(String, String)>,
) -> Result<Json<FileLinksResponse>, HttpAppError> {
    links_for(&state, Some(subject_id), Some(&file_name)).await
}
