use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Subject and optional file name given as query parameters.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ObjectTargetQuery {
    pub patient_id: Option<String>,
    pub file_name: Option<String>,
    /// Lowercase alias of `fileName` accepted for older clients
    #[serde(rename = "filename")]
    pub filename: Option<String>,
}

impl ObjectTargetQuery {
    pub fn file_name(&self) -> Option<&str> {
        self.file_name
            .as_deref()
            .or(self.filename.as_deref())
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub message: String,
}

/// A temporary download link for one object.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileLink {
    pub url: String,
    pub file_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileLinksResponse {
    pub files: Vec<FileLink>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_alias() {
        let query: ObjectTargetQuery =
            serde_json::from_str(r#"{"patientId":"1","filename":"a.pdf"}"#).unwrap();
        assert_eq!(query.file_name(), Some("a.pdf"));

        let query: ObjectTargetQuery =
            serde_json::from_str(r#"{"patientId":"1","fileName":"","filename":""}"#).unwrap();
        assert_eq!(query.file_name(), None);
    }
}
