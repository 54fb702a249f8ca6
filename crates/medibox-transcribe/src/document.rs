//! Result document written by the job service.
//!
//! Only the transcript text is read; word items, speaker labels and the rest of the document
//! are ignored.

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct TranscriptDocument {
    #[serde(rename = "jobName", default)]
    pub job_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub results: TranscriptResults,
}

#[derive(Debug, Default, Deserialize)]
pub struct TranscriptResults {
    #[serde(default)]
    pub transcripts: Vec<TranscriptSegment>,
}

#[derive(Debug, Deserialize)]
pub struct TranscriptSegment {
    #[serde(default)]
    pub transcript: Option<String>,
}

impl TranscriptDocument {
    pub fn parse(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Text of the first segment. No speech yields an empty string.
    pub fn first_text(&self) -> &str {
        self.results
            .transcripts
            .first()
            .and_then(|segment| segment.transcript.as_deref())
            .unwrap_or("")
    }
}
