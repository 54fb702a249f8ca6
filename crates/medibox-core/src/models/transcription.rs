use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::upload::SubjectIdValue;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionRequest {
    #[serde(default, alias = "patientID")]
    pub subject_id: Option<SubjectIdValue>,
    #[serde(default)]
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionResponse {
    pub transcript_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accepts_patient_id_alias() {
        let request: TranscriptionRequest =
            serde_json::from_str(r#"{"patientID":"17","fileName":"a.mp4"}"#).unwrap();
        assert_eq!(
            request.subject_id.map(SubjectIdValue::into_string).as_deref(),
            Some("17")
        );
        assert_eq!(request.file_name.as_deref(), Some("a.mp4"));
    }

    #[test]
    fn test_request_accepts_numeric_subject() {
        let request: TranscriptionRequest =
            serde_json::from_str(r#"{"subjectId":17,"fileName":"a.mp4"}"#).unwrap();
        assert_eq!(
            request.subject_id.map(SubjectIdValue::into_string).as_deref(),
            Some("17")
        );
    }

    #[test]
    fn test_response_field_name() {
        let body = serde_json::to_value(TranscriptionResponse {
            transcript_text: "shalom".to_string(),
        })
        .unwrap();
        assert_eq!(body["transcriptText"], "shalom");
    }
}
