use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Subject id as sent by clients, which use both JSON strings and numbers.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(untagged)]
pub enum SubjectIdValue {
    Text(String),
    Number(i64),
}

impl SubjectIdValue {
    pub fn into_string(self) -> String {
        match self {
            SubjectIdValue::Text(s) => s,
            SubjectIdValue::Number(n) => n.to_string(),
        }
    }
}

/// Upload a file into a subject namespace, or create the subject's directory layout when
/// no file is given.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub id: Option<SubjectIdValue>,
    /// Base64-encoded file content
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    /// Store under `fileName` instead of a timestamped name
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub message: String,
    /// Key of the stored object, or the subject root for directory creation
    pub s3_key: String,
}
