//! Structured results printed by `workflow run` and `workflow list`.
//!
//! Field order matters: the serialized form is the machine-readable contract
//! on standard output, so optional fields are omitted rather than emitted as
//! `null`.

use serde::{Deserialize, Serialize};

use super::HookKind;

/// Overall outcome of a run or of a single hook.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Ok,
    Error,
}

/// Outcome of a single step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Step executed and exited successfully.
    Ok,
    /// Step's `if` gate was not satisfied.
    Skipped,
    /// Step executed and failed; no later step ran.
    Error,
}

/// Result document for one `workflow run` invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutionResult {
    pub status: RunStatus,
    pub workflow: String,
    pub steps: Vec<StepResult>,
    /// Present only when the document configures at least one hook.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hooks: Option<HookResults>,
    /// Human-readable failure message, present only when `status` is `error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    /// Creates an in-progress result. `with_hooks` controls whether the `hooks` map is emitted.
    pub fn new(workflow: impl Into<String>, with_hooks: bool) -> Self {
        Self {
            status: RunStatus::Ok,
            workflow: workflow.into(),
            steps: Vec::new(),
            hooks: with_hooks.then(HookResults::default),
            error: None,
        }
    }

    /// Records the outcome of a hook invocation.
    pub fn record_hook(&mut self, hook: HookKind, result: HookResult) {
        let hooks = self.hooks.get_or_insert_with(HookResults::default);
        match hook {
            HookKind::BeforeAll => hooks.before_all = Some(result),
            HookKind::AfterAll => hooks.after_all = Some(result),
            HookKind::Error => hooks.error = Some(result),
        }
    }

    /// Marks the run as failed with `message`.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = RunStatus::Error;
        self.error = Some(message.into());
    }
}

/// Outcome of one step, in execution order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StepResult {
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Referenced workflow, set when a workflow call was skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepResult {
    pub fn ok(name: Option<String>) -> Self {
        Self {
            status: StepStatus::Ok,
            name,
            workflow: None,
            error: None,
        }
    }

    pub fn skipped(name: Option<String>, workflow: Option<String>) -> Self {
        Self {
            status: StepStatus::Skipped,
            name,
            workflow,
            error: None,
        }
    }

    pub fn failed(name: Option<String>, error: impl Into<String>) -> Self {
        Self {
            status: StepStatus::Error,
            name,
            workflow: None,
            error: Some(error.into()),
        }
    }
}

/// Hook outcomes keyed by hook name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HookResults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_all: Option<HookResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_all: Option<HookResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<HookResult>,
}

/// Outcome of one hook invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HookResult {
    pub status: RunStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HookResult {
    pub fn ok() -> Self {
        Self {
            status: RunStatus::Ok,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: RunStatus::Error,
            error: Some(error.into()),
        }
    }
}

/// One entry of the `workflow list` output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkflowSummary {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub private: bool,
    pub step_count: usize,
}
