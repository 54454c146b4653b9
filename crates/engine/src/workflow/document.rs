//! Workflow file loading.
//!
//! The file is read as UTF-8, comments are blanked out, and the remaining
//! JSON is deserialized into a [`WorkflowDocument`]. Exactly one JSON value is
//! accepted; unknown fields and trailing data are parse errors.

use std::{fs, path::Path};

use asc_types::{WorkflowDocument, validate_document};
use asc_util::strip_json_comments;
use tracing::debug;

use crate::error::WorkflowError;

/// Read and parse a workflow file without validating it.
pub fn load_document(path: &Path) -> Result<WorkflowDocument, WorkflowError> {
    let content = fs::read_to_string(path).map_err(|source| WorkflowError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let document = parse_document(&content)?;
    debug!(path = %path.display(), workflows = document.workflows.len(), "loaded workflow file");
    Ok(document)
}

/// Parse workflow JSON text (comments allowed).
pub fn parse_document(content: &str) -> Result<WorkflowDocument, WorkflowError> {
    let stripped = strip_json_comments(content);
    Ok(serde_json::from_str(&stripped)?)
}

/// Read, parse, and validate a workflow file, rejecting any structural error.
pub fn load_validated_document(path: &Path) -> Result<WorkflowDocument, WorkflowError> {
    let document = load_document(path)?;
    let report = validate_document(&document);
    if !report.valid {
        return Err(WorkflowError::Invalid(report.errors));
    }
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use asc_types::{HookKind, WorkflowStep};

    #[test]
    fn loads_commented_document() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("workflow.json");
        fs::write(
            &path,
            r#"{
  // shared hooks
  "before_all": "echo start", // trailing comment
  "workflows": {
    "beta": {
      "steps": ["echo https://example.com"] // not a comment inside the string
    }
  }
}"#,
        )
        .expect("write workflow");

        let document = load_document(&path).expect("load document");
        assert_eq!(document.hook(HookKind::BeforeAll), Some("echo start"));
        match &document.workflows["beta"].steps[0] {
            WorkflowStep::Shell(step) => assert_eq!(step.run, "echo https://example.com"),
            other => panic!("expected shell step, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let error = load_document(&dir.path().join("absent.json")).expect_err("missing file");
        assert!(matches!(error, WorkflowError::Read { .. }));
        assert_eq!(error.kind(), ErrorKind::Load);
    }

    #[test]
    fn malformed_json_mentions_parse_workflow_json() {
        let error = parse_document(r#"{"workflows": {"beta": }"#).expect_err("malformed");
        assert!(error.to_string().contains("parse workflow JSON"), "got {error}");
    }

    #[test]
    fn trailing_data_is_rejected() {
        let error = parse_document(r#"{"workflows": {}} {"workflows": {}}"#).expect_err("trailing data");
        assert!(error.to_string().contains("parse workflow JSON"));
    }

    #[test]
    fn validated_load_rejects_structural_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("workflow.json");
        fs::write(&path, r#"{"workflows":{"beta":{"steps":[]}}}"#).expect("write workflow");

        let error = load_validated_document(&path).expect_err("invalid document");
        match error {
            WorkflowError::Invalid(issues) => assert_eq!(issues.len(), 1),
            other => panic!("expected invalid document, got {other:?}"),
        }
    }
}
