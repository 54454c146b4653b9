//! Strongly typed workflow document definitions shared by the engine and the CLI.
//!
//! A workflow document is a single JSON file (comments allowed, see
//! `asc_util::jsonc`) holding optional lifecycle hooks and a map of named
//! workflows. Map order is preserved via `IndexMap` so that diagnostics and
//! previews follow authoring order; anything user-facing that must be stable
//! (listing, validation) sorts explicitly.
//!
//! Steps are classified while deserializing: a bare string or an object with
//! `run` becomes [`WorkflowStep::Shell`], an object with `workflow` becomes
//! [`WorkflowStep::Call`], and anything else is kept as
//! [`WorkflowStep::Invalid`] so the validator can report it instead of the
//! parser rejecting the whole file.

use indexmap::IndexMap;
use serde::Deserialize;

pub mod run;
pub mod validation;

pub use run::{ExecutionResult, HookResult, HookResults, RunStatus, StepResult, StepStatus, WorkflowSummary};
pub use validation::{ValidationCode, ValidationIssue, ValidationReport, validate_document};

/// Parsed workflow file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkflowDocument {
    /// Environment shared by every workflow in the file.
    #[serde(default)]
    pub env: IndexMap<String, String>,
    /// Shell command executed once before the selected workflow's steps.
    #[serde(default)]
    pub before_all: Option<String>,
    /// Shell command executed once after all steps succeeded.
    #[serde(default)]
    pub after_all: Option<String>,
    /// Shell command executed (best effort) whenever a run fails.
    #[serde(default)]
    pub error: Option<String>,
    /// Named workflows keyed by identifier.
    #[serde(default)]
    pub workflows: IndexMap<String, WorkflowDefinition>,
}

impl WorkflowDocument {
    /// Returns the command configured for `hook`, ignoring blank entries.
    pub fn hook(&self, hook: HookKind) -> Option<&str> {
        let command = match hook {
            HookKind::BeforeAll => self.before_all.as_deref(),
            HookKind::AfterAll => self.after_all.as_deref(),
            HookKind::Error => self.error.as_deref(),
        };
        command.map(str::trim).filter(|command| !command.is_empty())
    }

    /// True when at least one lifecycle hook is configured.
    pub fn has_hooks(&self) -> bool {
        HookKind::ALL.iter().any(|hook| self.hook(*hook).is_some())
    }

    /// Looks up a workflow by name.
    pub fn workflow(&self, name: &str) -> Option<&WorkflowDefinition> {
        self.workflows.get(name)
    }
}

/// A named, ordered sequence of steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkflowDefinition {
    /// Optional descriptive copy surfaced by `workflow list`.
    #[serde(default)]
    pub description: Option<String>,
    /// Private workflows are hidden from default listings and cannot be run directly.
    #[serde(default)]
    pub private: bool,
    /// Environment applied to this workflow's steps.
    #[serde(default)]
    pub env: IndexMap<String, String>,
    /// Steps executed strictly in file order.
    #[serde(default)]
    pub steps: Vec<WorkflowStep>,
}

/// Lifecycle hooks configured at document level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    BeforeAll,
    AfterAll,
    Error,
}

impl HookKind {
    pub const ALL: [HookKind; 3] = [HookKind::BeforeAll, HookKind::AfterAll, HookKind::Error];

    /// Key used for this hook in the document and in results.
    pub fn as_str(self) -> &'static str {
        match self {
            HookKind::BeforeAll => "before_all",
            HookKind::AfterAll => "after_all",
            HookKind::Error => "error",
        }
    }
}

/// One unit of work inside a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawStep")]
pub enum WorkflowStep {
    /// Runs a shell command.
    Shell(ShellStep),
    /// Inlines the steps of another workflow.
    Call(WorkflowCall),
    /// A step object that is neither a well-formed shell step nor a workflow call.
    Invalid(InvalidStep),
}

impl WorkflowStep {
    /// Param name gating this step, if any.
    pub fn condition(&self) -> Option<&str> {
        let condition = match self {
            WorkflowStep::Shell(step) => step.condition.as_deref(),
            WorkflowStep::Call(step) => step.condition.as_deref(),
            WorkflowStep::Invalid(step) => step.condition.as_deref(),
        };
        condition.map(str::trim).filter(|condition| !condition.is_empty())
    }

    /// Human label for the step.
    pub fn name(&self) -> Option<&str> {
        match self {
            WorkflowStep::Shell(step) => step.name.as_deref(),
            WorkflowStep::Call(step) => step.name.as_deref(),
            WorkflowStep::Invalid(step) => step.name.as_deref(),
        }
    }

    /// Workflow named by the step, including one named by an invalid step.
    pub fn target(&self) -> Option<&str> {
        match self {
            WorkflowStep::Shell(_) => None,
            WorkflowStep::Call(step) => Some(step.workflow.as_str()),
            WorkflowStep::Invalid(step) => step.workflow.as_deref(),
        }
    }
}

/// Shell command step. A bare string in the document is sugar for this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellStep {
    pub run: String,
    pub name: Option<String>,
    pub condition: Option<String>,
}

impl ShellStep {
    /// Builds an unnamed, ungated shell step.
    pub fn new(run: impl Into<String>) -> Self {
        Self {
            run: run.into(),
            name: None,
            condition: None,
        }
    }
}

/// Reference to another workflow in the same document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowCall {
    pub workflow: String,
    pub name: Option<String>,
    pub condition: Option<String>,
    /// Call-site environment overrides for the referenced workflow.
    pub with: IndexMap<String, String>,
}

/// Why a step object could not be classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDefect {
    /// Neither `run` nor `workflow` was given.
    NoAction,
    /// `run` was given but is blank.
    EmptyRun,
    /// Both `run` and `workflow` were given.
    RunAndWorkflow,
    /// `with` was given on a shell step.
    WithOnRun,
}

/// Step kept verbatim so validation can explain what is wrong with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidStep {
    /// Every defect found on the step, in check order.
    pub defects: Vec<StepDefect>,
    pub name: Option<String>,
    pub condition: Option<String>,
    /// Referenced workflow, when one was named alongside the defect.
    pub workflow: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawStep {
    Command(String),
    Object(RawStepObject),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStepObject {
    #[serde(default)]
    run: Option<String>,
    #[serde(default)]
    workflow: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "if")]
    condition: Option<String>,
    #[serde(default)]
    with: IndexMap<String, String>,
}

impl From<RawStep> for WorkflowStep {
    fn from(raw: RawStep) -> Self {
        match raw {
            RawStep::Command(run) if run.trim().is_empty() => WorkflowStep::Invalid(InvalidStep {
                defects: vec![StepDefect::EmptyRun],
                name: None,
                condition: None,
                workflow: None,
            }),
            RawStep::Command(run) => WorkflowStep::Shell(ShellStep::new(run)),
            RawStep::Object(object) => classify_step_object(object),
        }
    }
}

fn classify_step_object(object: RawStepObject) -> WorkflowStep {
    let has_run = object.run.as_deref().is_some_and(|run| !run.trim().is_empty());
    let workflow = object
        .workflow
        .as_deref()
        .map(str::trim)
        .filter(|workflow| !workflow.is_empty())
        .map(str::to_string);

    let mut defects = Vec::new();
    match (has_run, workflow.is_some()) {
        (false, false) if object.run.is_some() => defects.push(StepDefect::EmptyRun),
        (false, false) => defects.push(StepDefect::NoAction),
        (true, true) => defects.push(StepDefect::RunAndWorkflow),
        _ => {}
    }
    if has_run && !object.with.is_empty() {
        defects.push(StepDefect::WithOnRun);
    }

    if !defects.is_empty() {
        return WorkflowStep::Invalid(InvalidStep {
            defects,
            name: object.name,
            condition: object.condition,
            workflow,
        });
    }

    match workflow {
        Some(workflow) => WorkflowStep::Call(WorkflowCall {
            workflow,
            name: object.name,
            condition: object.condition,
            with: object.with,
        }),
        None => WorkflowStep::Shell(ShellStep {
            run: object.run.unwrap_or_default(),
            name: object.name,
            condition: object.condition,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> WorkflowDocument {
        serde_json::from_str(json).expect("deserialize workflow document")
    }

    #[test]
    fn bare_string_step_is_a_shell_step() {
        let document = parse(r#"{"workflows":{"beta":{"steps":["echo hi"]}}}"#);
        let steps = &document.workflows["beta"].steps;
        assert_eq!(steps, &vec![WorkflowStep::Shell(ShellStep::new("echo hi"))]);
    }

    #[test]
    fn step_objects_are_classified_at_parse_time() {
        let document = parse(
            r#"{"workflows":{"release":{"steps":[
                {"run":"make build","name":"build","if":"BUILD"},
                {"workflow":"notify","name":"announce","if":"NOTIFY","with":{"CHANNEL":"ops"}},
                {"name":"orphan"}
            ]}}}"#,
        );
        let steps = &document.workflows["release"].steps;

        match &steps[0] {
            WorkflowStep::Shell(step) => {
                assert_eq!(step.run, "make build");
                assert_eq!(step.name.as_deref(), Some("build"));
                assert_eq!(step.condition.as_deref(), Some("BUILD"));
            }
            other => panic!("expected shell step, got {other:?}"),
        }
        match &steps[1] {
            WorkflowStep::Call(call) => {
                assert_eq!(call.workflow, "notify");
                assert_eq!(steps[1].name(), Some("announce"));
                assert_eq!(call.with.get("CHANNEL").map(String::as_str), Some("ops"));
            }
            other => panic!("expected workflow call, got {other:?}"),
        }
        match &steps[2] {
            WorkflowStep::Invalid(step) => {
                assert_eq!(step.defects, vec![StepDefect::NoAction]);
                assert_eq!(step.name.as_deref(), Some("orphan"));
            }
            other => panic!("expected invalid step, got {other:?}"),
        }
    }

    #[test]
    fn conflicting_and_blank_steps_are_kept_as_invalid() {
        let document = parse(
            r#"{"workflows":{"x":{"steps":[
                {"run":"echo a","workflow":"y"},
                {"run":"   "},
                "",
                {"run":"echo b","with":{"A":"1"}}
            ]}}}"#,
        );
        let defects: Vec<_> = document.workflows["x"]
            .steps
            .iter()
            .map(|step| match step {
                WorkflowStep::Invalid(invalid) => invalid.defects.clone(),
                _ => Vec::new(),
            })
            .collect();
        assert_eq!(
            defects,
            vec![
                vec![StepDefect::RunAndWorkflow],
                vec![StepDefect::EmptyRun],
                vec![StepDefect::EmptyRun],
                vec![StepDefect::WithOnRun]
            ]
        );
    }

    #[test]
    fn a_step_keeps_every_defect_and_its_target() {
        let document = parse(r#"{"workflows":{"x":{"steps":[{"run":"echo","workflow":"missing","with":{"A":"1"}}]}}}"#);
        let step = &document.workflows["x"].steps[0];
        match step {
            WorkflowStep::Invalid(invalid) => {
                assert_eq!(invalid.defects, vec![StepDefect::RunAndWorkflow, StepDefect::WithOnRun]);
            }
            other => panic!("expected invalid step, got {other:?}"),
        }
        assert_eq!(step.target(), Some("missing"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let error = serde_json::from_str::<WorkflowDocument>(r#"{"workflows":{},"befor_all":"x"}"#).expect_err("unknown field");
        assert!(error.to_string().contains("befor_all"));
    }

    #[test]
    fn blank_hooks_count_as_absent() {
        let document = parse(r#"{"before_all":"  ","error":"echo failed","workflows":{}}"#);
        assert_eq!(document.hook(HookKind::BeforeAll), None);
        assert_eq!(document.hook(HookKind::Error), Some("echo failed"));
        assert!(document.has_hooks());
        assert!(!WorkflowDocument::default().has_hooks());
    }

    #[test]
    fn private_defaults_to_false() {
        let document = parse(r#"{"workflows":{"a":{"steps":["true"]},"b":{"private":true,"steps":["true"]}}}"#);
        assert!(!document.workflows["a"].private);
        assert!(document.workflows["b"].private);
    }
}
