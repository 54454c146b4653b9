//! Workflow loading, param binding, listing, and execution.
//!
//! - `document` reads and parses the workflow file
//! - `bindings` turns positional `KEY:VALUE` tokens into params
//! - `catalog` builds the `workflow list` output
//! - `state` names the lifecycle phases of a run
//! - `runner` executes a selected workflow

pub mod bindings;
pub mod catalog;
pub mod document;
pub mod runner;
pub mod state;

pub use bindings::{ParamBinding, ParamError};
pub use catalog::list_workflows;
pub use document::{load_document, load_validated_document, parse_document};
pub use runner::{MAX_CALL_DEPTH, RunOutcome, RunRequest, run_workflow};
pub use state::{RunFailure, RunPhase};
