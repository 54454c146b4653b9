//! Sequential execution of a selected workflow.
//!
//! [`run_workflow`] resolves the workflow, then walks the [`RunPhase`] machine:
//! `before_all`, the steps in file order, `after_all`, and on any failure the
//! `error` hook. Commands are handed to a [`CommandRunner`]; everything they
//! print goes to the diagnostic writer. The returned [`RunOutcome`] always
//! carries a result document once selection succeeded, including partial
//! results of failed runs.

use std::io::Write;

use asc_types::{ExecutionResult, HookKind, HookResult, StepResult, WorkflowCall, WorkflowDefinition, WorkflowDocument, WorkflowStep};
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::{
    error::WorkflowError,
    executor::{CommandError, CommandOrigin, CommandRunner, ShellInvocation},
    workflow::{
        bindings::ParamBinding,
        state::{RunFailure, RunPhase},
    },
};

/// Maximum nesting of workflow references below the selected workflow.
pub const MAX_CALL_DEPTH: usize = 16;

/// What to run and with which params.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub workflow: String,
    pub params: ParamBinding,
    /// Announce commands instead of executing them.
    pub dry_run: bool,
}

/// Result document plus the failure that ended the run, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub result: ExecutionResult,
    pub failure: Option<RunFailure>,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Run `request.workflow` from `document`.
///
/// Unknown and private workflows are rejected before anything executes and
/// produce no result document. Every later failure is reported through
/// [`RunOutcome::failure`] next to the partial result.
pub fn run_workflow(
    document: &WorkflowDocument,
    request: &RunRequest,
    runner: &dyn CommandRunner,
    diagnostics: &mut dyn Write,
) -> Result<RunOutcome, WorkflowError> {
    let Some(workflow) = document.workflow(&request.workflow) else {
        return Err(WorkflowError::UnknownWorkflow(request.workflow.clone()));
    };
    if workflow.private {
        return Err(WorkflowError::PrivateWorkflow(request.workflow.clone()));
    }

    info!(workflow = %request.workflow, dry_run = request.dry_run, "starting workflow run");

    let scope = Scope {
        env: merge_env([&document.env, &workflow.env, request.params.as_map()]),
        gates: request.params.clone(),
    };
    let mut run = WorkflowRun {
        document,
        request,
        runner,
        diagnostics,
        result: ExecutionResult::new(&request.workflow, document.has_hooks()),
    };

    let mut phase = RunPhase::NotStarted;
    loop {
        debug!(phase = phase.name(), "workflow run phase");
        phase = match phase {
            RunPhase::NotStarted => phase.advance(),
            RunPhase::BeforeAll => match run.run_hook(HookKind::BeforeAll, &scope.env) {
                Ok(()) => phase.advance(),
                Err(failure) => phase.fail(failure),
            },
            RunPhase::Steps => match run.run_steps(&request.workflow, &workflow.steps, &scope, 0) {
                Ok(()) => phase.advance(),
                Err(failure) => phase.fail(failure),
            },
            RunPhase::AfterAll => match run.run_hook(HookKind::AfterAll, &scope.env) {
                Ok(()) => phase.advance(),
                Err(failure) => phase.fail(failure),
            },
            RunPhase::ErrorHook(ref failure) => {
                run.result.fail(failure.message.clone());
                if !failure.canceled {
                    run.run_error_hook(&scope.env);
                }
                phase.advance()
            }
            RunPhase::Done(failure) => {
                match &failure {
                    Some(failure) => warn!(workflow = %request.workflow, error = %failure, "workflow run failed"),
                    None => info!(workflow = %request.workflow, steps = run.result.steps.len(), "workflow run finished"),
                }
                return Ok(RunOutcome {
                    result: run.result,
                    failure,
                });
            }
        };
    }
}

/// Bindings visible to the steps of one workflow.
struct Scope {
    env: IndexMap<String, String>,
    /// Params plus call-site `with` keys along the call chain; `if` gates test these.
    gates: ParamBinding,
}

struct WorkflowRun<'a> {
    document: &'a WorkflowDocument,
    request: &'a RunRequest,
    runner: &'a dyn CommandRunner,
    diagnostics: &'a mut dyn Write,
    result: ExecutionResult,
}

impl<'a> WorkflowRun<'a> {
    /// Runs `hook` when configured and records its outcome.
    fn run_hook(&mut self, hook: HookKind, env: &IndexMap<String, String>) -> Result<(), RunFailure> {
        let Some(command) = self.document.hook(hook) else {
            return Ok(());
        };
        match self.execute(command, env, CommandOrigin::Hook(hook)) {
            Ok(()) => {
                self.result.record_hook(hook, HookResult::ok());
                Ok(())
            }
            Err(error) => {
                let detail = error.to_string();
                self.result.record_hook(hook, HookResult::failed(&detail));
                Err(RunFailure::new(format!("{} hook failed: {detail}", hook.as_str()), error.is_canceled()))
            }
        }
    }

    /// Best-effort error hook; its failure is recorded and logged only.
    fn run_error_hook(&mut self, env: &IndexMap<String, String>) {
        if let Err(failure) = self.run_hook(HookKind::Error, env) {
            warn!(error = %failure, "error hook failed");
        }
    }

    fn run_steps(
        &mut self,
        workflow_name: &str,
        steps: &[WorkflowStep],
        scope: &Scope,
        depth: usize,
    ) -> Result<(), RunFailure> {
        for (offset, step) in steps.iter().enumerate() {
            let index = offset + 1;
            let name = step.name().map(str::to_string);

            if let Some(param) = step.condition()
                && !scope.gates.contains(param)
            {
                debug!(workflow = workflow_name, step = index, param, "skipping gated step");
                self.result.steps.push(StepResult::skipped(name, step.target().map(str::to_string)));
                continue;
            }

            let outcome = match step {
                WorkflowStep::Shell(shell) => self
                    .execute(&shell.run, &scope.env, CommandOrigin::Step { index })
                    .map_err(|error| (error.to_string(), error.is_canceled())),
                WorkflowStep::Call(call) => match self.enter_call(call, scope, depth) {
                    Ok((target, nested)) => {
                        self.run_steps(&call.workflow, &target.steps, &nested, depth + 1)?;
                        continue;
                    }
                    Err(detail) => Err((detail, false)),
                },
                WorkflowStep::Invalid(_) => Err(("step has no runnable action".to_string(), false)),
            };

            match outcome {
                Ok(()) => self.result.steps.push(StepResult::ok(name)),
                Err((detail, canceled)) => {
                    let message = format!("step {index} of workflow \"{workflow_name}\" failed: {detail}");
                    self.result.steps.push(StepResult::failed(name, detail));
                    return Err(RunFailure::new(message, canceled));
                }
            }
        }
        Ok(())
    }

    /// Checks that `call` may be inlined and returns its target with the scope for its steps.
    fn enter_call(&mut self, call: &WorkflowCall, scope: &Scope, depth: usize) -> Result<(&'a WorkflowDefinition, Scope), String> {
        if depth + 1 > MAX_CALL_DEPTH {
            return Err(format!("max call depth {MAX_CALL_DEPTH} exceeded"));
        }
        let document = self.document;
        let Some(target) = document.workflow(&call.workflow) else {
            return Err(format!("unknown workflow \"{}\"", call.workflow));
        };
        if self.request.dry_run {
            writeln!(self.diagnostics, "[dry-run] workflow {}", call.workflow).map_err(|error| error.to_string())?;
        }
        debug!(workflow = %call.workflow, depth = depth + 1, "entering nested workflow");
        let mut gates = scope.gates.clone();
        for (key, value) in &call.with {
            gates.insert(key.as_str(), value.as_str());
        }
        let nested = Scope {
            env: merge_env([&target.env, &scope.env, &call.with]),
            gates,
        };
        Ok((target, nested))
    }

    fn execute(&mut self, command: &str, env: &IndexMap<String, String>, origin: CommandOrigin) -> Result<(), CommandError> {
        let invocation = ShellInvocation { command, env, origin };
        self.runner.run(&invocation, &mut *self.diagnostics)
    }
}

/// Later layers override earlier ones; key order follows first appearance.
fn merge_env<'a>(layers: impl IntoIterator<Item = &'a IndexMap<String, String>>) -> IndexMap<String, String> {
    let mut merged = IndexMap::new();
    for layer in layers {
        for (key, value) in layer {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}
