//! Error taxonomy for workflow commands.
//!
//! The CLI treats each class differently:
//! - usage errors print help-style output and never produce a result document,
//! - preflight errors (unknown or private workflow) print a plain message,
//! - load errors (read, parse, invalid document) print a plain message,
//! - reported errors already live inside a printed JSON document and must not
//!   be printed a second time.

use std::{io, path::PathBuf};

use asc_types::ValidationIssue;
use thiserror::Error;

/// Process exit code for usage errors.
pub const EXIT_USAGE: u8 = 2;
/// Process exit code for every other failure.
pub const EXIT_FAILURE: u8 = 1;
/// Process exit code when a run was canceled by a signal or deadline.
pub const EXIT_CANCELED: u8 = 130;

/// Broad classification used by the CLI's error-printing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Usage,
    Preflight,
    Load,
    Reported,
}

/// Failure surfaced by a `workflow` subcommand.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Bad flags, arguments, or params.
    #[error("{0}")]
    Usage(String),

    #[error("unknown workflow \"{0}\"")]
    UnknownWorkflow(String),

    #[error("workflow \"{0}\" is private and cannot be run directly")]
    PrivateWorkflow(String),

    #[error("read workflow {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parse workflow JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid workflow file: {}", summarize_issues(.0))]
    Invalid(Vec<ValidationIssue>),

    /// The failure is already described by a printed result document.
    #[error("{message}")]
    Reported { message: String, canceled: bool },

    #[error("write output: {0}")]
    Output(#[source] io::Error),
}

impl WorkflowError {
    pub fn usage(message: impl Into<String>) -> Self {
        WorkflowError::Usage(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::Usage(_) => ErrorKind::Usage,
            WorkflowError::UnknownWorkflow(_) | WorkflowError::PrivateWorkflow(_) => ErrorKind::Preflight,
            WorkflowError::Read { .. } | WorkflowError::Parse(_) | WorkflowError::Invalid(_) | WorkflowError::Output(_) => {
                ErrorKind::Load
            }
            WorkflowError::Reported { .. } => ErrorKind::Reported,
        }
    }

    /// True when the generic error printer must stay silent.
    pub fn is_reported(&self) -> bool {
        self.kind() == ErrorKind::Reported
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            WorkflowError::Usage(_) => EXIT_USAGE,
            WorkflowError::Reported { canceled: true, .. } => EXIT_CANCELED,
            _ => EXIT_FAILURE,
        }
    }
}

fn summarize_issues(issues: &[ValidationIssue]) -> String {
    issues.iter().map(|issue| issue.message.as_str()).collect::<Vec<_>>().join("; ")
}
