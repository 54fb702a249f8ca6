//! HTTP error response body
//!
//! `IntoResponse` for `AppError` lives in the api crate: the orphan rule forbids implementing
//! axum's trait for a core type here.

use medibox_core::{AppError, ErrorMetadata};
use serde::Serialize;
use utoipa::ToSchema;

/// Body of every failed request
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Machine-readable kind, e.g. `ArtifactNotFound`
    pub error_kind: String,
    pub message: String,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        Self {
            error_kind: err.error_kind().to_string(),
            message: err.client_message(),
        }
    }
}
