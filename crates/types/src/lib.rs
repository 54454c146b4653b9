//! Shared type definitions for the `asc workflow` engine.
//!
//! The [`workflow`] module holds the parsed document model, the result
//! documents printed on standard output, and the structural validator.

pub mod workflow;

pub use workflow::{
    ExecutionResult, HookKind, HookResult, HookResults, InvalidStep, RunStatus, ShellStep, StepDefect, StepResult, StepStatus,
    ValidationCode, ValidationIssue, ValidationReport, WorkflowCall, WorkflowDefinition, WorkflowDocument, WorkflowStep,
    WorkflowSummary, validate_document,
};
