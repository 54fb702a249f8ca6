//! Subject namespace key conventions.
//!
//! Every object belonging to a subject lives under `id_{subject_id}/`. These layouts are
//! shared with data written by earlier deployments and must stay bit-exact:
//!
//! - subject root: `id_{subject_id}/`
//! - artifact: `id_{subject_id}/{file_name}`
//! - relocated transcript: `id_{subject_id}/{base_name}.json`

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::AppError;

/// Prefix shared by all subject namespaces.
pub const SUBJECT_PREFIX: &str = "id_";

/// Opaque subject identifier (e.g. a patient record id). Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn parse(raw: impl Into<String>) -> Result<Self, AppError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(AppError::InvalidRequest(
                "subject id must not be empty".to_string(),
            ));
        }
        Ok(SubjectId(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `id_{subject_id}/`
    pub fn root(&self) -> String {
        format!("{}{}/", SUBJECT_PREFIX, self.0)
    }

    /// `id_{subject_id}/{file_name}`
    pub fn artifact_key(&self, file_name: &str) -> String {
        format!("{}{}", self.root(), file_name)
    }

    /// `id_{subject_id}/{base_name(file_name)}.json`
    pub fn transcript_key(&self, file_name: &str) -> String {
        format!("{}{}.json", self.root(), base_name(file_name))
    }

    /// Marker objects making up an empty subject directory, parents first.
    pub fn directory_layout(&self) -> [String; 4] {
        let root = self.root();
        let output = format!("{}output/", root);
        let summary = format!("{}Summary/", output);
        let transcribe = format!("{}transcribe/", output);
        [root, output, summary, transcribe]
    }
}

impl Display for SubjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// File name with its trailing extension removed.
///
/// Only the last path component is considered, and leading dots do not start an
/// extension, so `.env` and `archive` are returned unchanged while `a.b.mp4` becomes `a.b`.
pub fn base_name(file_name: &str) -> &str {
    let start = file_name.rfind('/').map_or(0, |i| i + 1);
    let component = &file_name[start..];
    match component.rfind('.') {
        Some(dot) if component[..dot].chars().any(|c| c != '.') => &file_name[..start + dot],
        _ => file_name,
    }
}

/// Last `/`-separated segment of a key.
pub fn file_name_of(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name_strips_trailing_extension() {
        assert_eq!(base_name("220206-143000.mp4"), "220206-143000");
        assert_eq!(base_name("clip.final.mp4"), "clip.final");
        assert_eq!(base_name("no_extension"), "no_extension");
        assert_eq!(base_name(".hidden"), ".hidden");
        assert_eq!(base_name("nested.dir/video"), "nested.dir/video");
        assert_eq!(base_name("nested/video.mp4"), "nested/video");
    }

    #[test]
    fn test_subject_keys() {
        let subject = SubjectId::parse("42").unwrap();
        assert_eq!(subject.root(), "id_42/");
        assert_eq!(subject.artifact_key("220206-143000.mp4"), "id_42/220206-143000.mp4");
        assert_eq!(
            subject.transcript_key("220206-143000.mp4"),
            "id_42/220206-143000.json"
        );
    }

    #[test]
    fn test_directory_layout() {
        let subject = SubjectId::parse("7").unwrap();
        assert_eq!(
            subject.directory_layout(),
            [
                "id_7/".to_string(),
                "id_7/output/".to_string(),
                "id_7/output/Summary/".to_string(),
                "id_7/output/transcribe/".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_subject_rejected() {
        assert!(matches!(
            SubjectId::parse(""),
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_whitespace_subject_kept_verbatim() {
        let subject = SubjectId::parse(" 7 ").unwrap();
        assert_eq!(subject.root(), "id_ 7 /");
    }

    #[test]
    fn test_file_name_of() {
        assert_eq!(file_name_of("id_1/report.pdf"), "report.pdf");
        assert_eq!(file_name_of("plain"), "plain");
    }
}
