//! # asc engine
//!
//! Loads, validates, lists, and runs the named shell workflows defined in a
//! project's workflow file.
//!
//! ## Usage
//!
//! ```rust
//! use asc_engine::{DryRunRunner, RunRequest, parse_document, run_workflow};
//!
//! let document = parse_document(r#"{"workflows": {"beta": {"steps": ["echo hi"]}}}"#)?;
//! let request = RunRequest {
//!     workflow: "beta".into(),
//!     dry_run: true,
//!     ..RunRequest::default()
//! };
//! let mut diagnostics = Vec::new();
//! let outcome = run_workflow(&document, &request, &DryRunRunner, &mut diagnostics)?;
//! assert!(outcome.is_success());
//! assert_eq!(String::from_utf8(diagnostics)?, "[dry-run] echo hi\n");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - **`config`**: workflow file and timeout settings from flags and environment
//! - **`error`**: error taxonomy and exit codes
//! - **`executor`**: command runners (real shell, dry run)
//! - **`workflow`**: loader, param binder, catalog, and the run state machine
//! - **`report`**: JSON result documents on standard output

pub mod config;
pub mod error;
pub mod executor;
pub mod report;
pub mod workflow;

pub use config::{DEFAULT_WORKFLOW_PATH, WORKFLOW_FILE_ENV, WORKFLOW_TIMEOUT_ENV, WorkflowSettings};
pub use error::{EXIT_CANCELED, EXIT_FAILURE, EXIT_USAGE, ErrorKind, WorkflowError};
pub use executor::{CommandError, CommandOrigin, CommandRunner, DryRunRunner, ShellCommandRunner, ShellInvocation};
pub use report::{report_run, report_validation, write_json};
pub use workflow::{
    MAX_CALL_DEPTH, ParamBinding, ParamError, RunFailure, RunOutcome, RunPhase, RunRequest, list_workflows, load_document,
    load_validated_document, parse_document, run_workflow,
};
