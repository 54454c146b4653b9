use std::io::Write;

use asc_util::{block_on_future, redact_sensitive};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{
    CommandError, CommandOrigin, ShellInvocation,
    shell::{self, ShellProgram},
};

/// Execute a single shell command.
///
/// Implementations write everything the command prints to `diagnostics` and
/// return once the command has finished. Standard output of the process is
/// reserved for result documents and must never be written to here.
pub trait CommandRunner {
    fn run(&self, invocation: &ShellInvocation<'_>, diagnostics: &mut dyn Write) -> Result<(), CommandError>;
}

/// Runner that never spawns anything and reports each command as it would run.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunRunner;

impl CommandRunner for DryRunRunner {
    fn run(&self, invocation: &ShellInvocation<'_>, diagnostics: &mut dyn Write) -> Result<(), CommandError> {
        let line = match invocation.origin {
            CommandOrigin::Step { .. } => format!("[dry-run] {}", invocation.command),
            CommandOrigin::Hook(hook) => format!("[dry-run] hook {}: {}", hook.as_str(), invocation.command),
        };
        writeln!(diagnostics, "{line}").map_err(CommandError::Stream)
    }
}

/// Runner that executes commands through the system shell.
///
/// Each command blocks until the child exits. Cancelling the token kills the
/// in-flight child and fails the command with [`CommandError::Canceled`].
#[derive(Debug, Clone)]
pub struct ShellCommandRunner {
    shell: Option<ShellProgram>,
    cancel: CancellationToken,
}

impl ShellCommandRunner {
    /// Create a runner using the shell found on `PATH`.
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            shell: shell::system_shell().cloned(),
            cancel,
        }
    }
}

impl CommandRunner for ShellCommandRunner {
    fn run(&self, invocation: &ShellInvocation<'_>, diagnostics: &mut dyn Write) -> Result<(), CommandError> {
        let shell = self.shell.as_ref().ok_or(CommandError::ShellUnavailable)?;
        if self.cancel.is_cancelled() {
            return Err(CommandError::Canceled);
        }

        debug!(
            origin = ?invocation.origin,
            command = %redact_sensitive(invocation.command),
            shell = %shell.program.display(),
            "running workflow command"
        );

        let outcome = block_on_future(async { Ok(shell::drive_child(shell, invocation, &self.cancel, diagnostics).await) });
        match outcome {
            Ok(result) => result,
            Err(error) => Err(CommandError::Runtime(error.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asc_types::HookKind;
    use indexmap::IndexMap;

    fn invocation<'a>(command: &'a str, env: &'a IndexMap<String, String>, origin: CommandOrigin) -> ShellInvocation<'a> {
        ShellInvocation { command, env, origin }
    }

    #[test]
    fn dry_run_announces_steps_and_hooks() {
        let env = IndexMap::new();
        let mut diagnostics = Vec::new();
        DryRunRunner
            .run(&invocation("echo hi", &env, CommandOrigin::Step { index: 1 }), &mut diagnostics)
            .expect("dry run step");
        DryRunRunner
            .run(&invocation("make clean", &env, CommandOrigin::Hook(HookKind::AfterAll)), &mut diagnostics)
            .expect("dry run hook");

        let text = String::from_utf8(diagnostics).expect("utf8");
        assert_eq!(text, "[dry-run] echo hi\n[dry-run] hook after_all: make clean\n");
    }

    #[test]
    fn missing_shell_fails_without_spawning() {
        let runner = ShellCommandRunner {
            shell: None,
            cancel: CancellationToken::new(),
        };
        let env = IndexMap::new();
        let error = runner
            .run(&invocation("echo hi", &env, CommandOrigin::Step { index: 1 }), &mut Vec::new())
            .expect_err("no shell");
        assert!(matches!(error, CommandError::ShellUnavailable));
    }

    #[cfg(unix)]
    mod unix {
        use super::*;

        fn runner() -> Option<ShellCommandRunner> {
            Some(ShellCommandRunner::new(CancellationToken::new())).filter(|runner| runner.shell.is_some())
        }

        #[test]
        fn streams_stdout_and_stderr_to_diagnostics() {
            let Some(runner) = runner() else { return };
            let env = IndexMap::new();
            let mut diagnostics = Vec::new();
            runner
                .run(
                    &invocation("echo to-out; echo to-err 1>&2", &env, CommandOrigin::Step { index: 1 }),
                    &mut diagnostics,
                )
                .expect("command succeeds");
            let text = String::from_utf8(diagnostics).expect("utf8");
            assert!(text.contains("to-out"), "diagnostics: {text}");
            assert!(text.contains("to-err"), "diagnostics: {text}");
        }

        #[test]
        fn exposes_env_overrides() {
            let Some(runner) = runner() else { return };
            let mut env = IndexMap::new();
            env.insert("ASC_TEST_VERSION".to_string(), "2.1.0".to_string());
            let mut diagnostics = Vec::new();
            runner
                .run(
                    &invocation("echo version=$ASC_TEST_VERSION", &env, CommandOrigin::Step { index: 1 }),
                    &mut diagnostics,
                )
                .expect("command succeeds");
            assert!(String::from_utf8_lossy(&diagnostics).contains("version=2.1.0"));
        }

        #[test]
        fn non_zero_exit_is_an_error() {
            let Some(runner) = runner() else { return };
            let env = IndexMap::new();
            let error = runner
                .run(&invocation("exit 3", &env, CommandOrigin::Step { index: 1 }), &mut Vec::new())
                .expect_err("command fails");
            assert!(matches!(error, CommandError::Exit(3)), "got {error:?}");
            assert_eq!(error.to_string(), "exit status 3");
        }

        #[test]
        fn cancelled_token_stops_before_spawning() {
            let Some(runner) = runner() else { return };
            runner.cancel.cancel();
            let env = IndexMap::new();
            let mut diagnostics = Vec::new();
            let error = runner
                .run(&invocation("echo never", &env, CommandOrigin::Step { index: 1 }), &mut diagnostics)
                .expect_err("canceled");
            assert!(error.is_canceled());
            assert!(diagnostics.is_empty());
        }

        #[test]
        fn cancellation_kills_a_running_child() {
            let Some(runner) = runner() else { return };
            let token = runner.cancel.clone();
            let trigger = std::thread::spawn(move || {
                std::thread::sleep(std::time::Duration::from_millis(200));
                token.cancel();
            });
            let env = IndexMap::new();
            let started = std::time::Instant::now();
            let error = runner
                .run(&invocation("sleep 30", &env, CommandOrigin::Step { index: 1 }), &mut Vec::new())
                .expect_err("canceled");
            trigger.join().expect("trigger thread");
            assert!(error.is_canceled());
            assert!(started.elapsed() < std::time::Duration::from_secs(10));
        }
    }
}
