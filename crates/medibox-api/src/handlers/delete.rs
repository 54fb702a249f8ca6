//! Delete one object, or a subject's whole namespace.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use medibox_core::models::{DeleteResponse, ObjectTargetQuery};
use medibox_core::{AppError, SubjectId};
use medibox_infra::ErrorResponse;
use medibox_storage::Storage;
use std::sync::Arc;

const DELETE_COMPLETED: &str = "Delete operation completed successfully";

async fn delete_object(
    storage: &dyn Storage,
    subject: &SubjectId,
    file_name: &str,
) -> Result<(), HttpAppError> {
    let key = subject.artifact_key(file_name);
    storage.delete(&key).await?;
    tracing::info!(key = %key, "Deleted object");
    Ok(())
}

/// Delete every key under `id_{subject}/`, markers included.
async fn delete_namespace(storage: Arc<dyn Storage>, subject: &SubjectId) -> Result<(), HttpAppError> {
    let prefix = subject.root();
    let count = storage.delete_prefix(&prefix).await?;

    if count == 0 {
        tracing::info!(prefix = %prefix, "No objects found under prefix");
    } else {
        tracing::info!(prefix = %prefix, count, "Deleted subject namespace");
    }
    Ok(())
}

async fn delete_target(
    state: &AppState,
    subject_id: Option<String>,
    file_name: Option<&str>,
) -> Result<Json<DeleteResponse>, HttpAppError> {
    let subject = subject_id
        .ok_or_else(|| AppError::InvalidRequest("Missing patientId".to_string()))
        .and_then(SubjectId::parse)?;

    match file_name.filter(|name| !name.is_empty()) {
        Some(name) => delete_object(state.storage.as_ref(), &subject, name).await?,
        None => delete_namespace(state.storage.clone(), &subject).await?,
    }

    Ok(Json(DeleteResponse {
        message: DELETE_COMPLETED.to_string(),
    }))
}

#[utoipa::path(
    delete,
    path = "/files",
    tag = "files",
    params(ObjectTargetQuery),
    responses(
        (status = 200, description = "Object or namespace deleted", body = DeleteResponse),
        (status = 400, description = "Missing patientId", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "delete"))]
pub async fn delete_by_query(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ObjectTargetQuery>,
) -> Result<Json<DeleteResponse>, HttpAppError> {
    let file_name = query.file_name().map(str::to_string);
    delete_target(&state, query.patient_id, file_name.as_deref()).await
}

#[utoipa::path(
    delete,
    path = "/subjects/{subject_id}",
    tag = "files",
    params(("subject_id" = String, Path, description = "Subject id")),
    responses(
        (status = 200, description = "Namespace deleted", body = DeleteResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "delete_subject"))]
pub async fn delete_subject(
    State(state): State<Arc<AppState>>,
    Path(subject_id): Path<String>,
) -> Result<Json<DeleteResponse>, HttpAppError> {
    delete_target(&state, Some(subject_id), None).await
}

#[utoipa::path(
    delete,
    path = "/subjects/{subject_id}/files/{file_name}",
    tag = "files",
    params(
        ("subject_id" = String, Path, description = "Subject id"),
        ("file_name" = String, Path, description = "File name inside the subject namespace")
    ),
    responses(
        (status = 200, description = "Object deleted", body = DeleteResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "delete_file"))]
pub async fn delete_subject_file(
    State(state): State<Arc<AppState>>,
    Path((subject_id, file_name)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>, HttpAppError> {
    delete_target(&state, Some(subject_id), Some(&file_name)).await
}
