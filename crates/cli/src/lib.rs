//! `asc` command-line entry points.
//!
//! [`run_with_args`] parses a full argument vector, dispatches the `workflow`
//! subcommands, and applies the error-printing policy: one JSON document on
//! standard output, human text on the diagnostic stream, and no second report
//! for failures already described by the printed document.

use std::{ffi::OsString, io::Write, path::Path};

use asc_engine::{
    DryRunRunner, EXIT_USAGE, ErrorKind, ParamBinding, RunRequest, ShellCommandRunner, WorkflowError, WorkflowSettings,
    list_workflows, load_document, load_validated_document, report_run, report_validation, run_workflow, write_json,
};
use asc_types::validate_document;
use clap::{Arg, ArgAction, Command};
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub mod args;

pub use args::{ArgsError, WorkflowArgs, WorkflowCommand, scan_args};

const WORKFLOW_SUBCOMMANDS: [WorkflowCommand; 3] = [WorkflowCommand::Run, WorkflowCommand::Validate, WorkflowCommand::List];

/// Builds the clap command tree. Subcommand arguments are collected raw and
/// classified by [`scan_args`].
pub fn build_cli() -> Command {
    let mut workflow = Command::new("workflow")
        .about("Define, validate, and run named shell workflows")
        .subcommand_required(true)
        .arg_required_else_help(true);
    for command in WORKFLOW_SUBCOMMANDS {
        workflow = workflow.subcommand(
            Command::new(command.name())
                .about(command.about())
                .disable_help_flag(true)
                .arg(
                    Arg::new("args")
                        .action(ArgAction::Append)
                        .num_args(0..)
                        .allow_hyphen_values(true)
                        .trailing_var_arg(true),
                ),
        );
    }

    Command::new("asc")
        .about("App Store Connect CLI")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(workflow)
}

/// Run the CLI with `args` (including the program name) and return the process exit code.
pub fn run_with_args<I, T>(
    args: I,
    settings: &WorkflowSettings,
    cancel: CancellationToken,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = match build_cli().try_get_matches_from(args) {
        Ok(matches) => matches,
        Err(error) => {
            let rendered = error.render().to_string();
            if error.use_stderr() {
                let _ = write!(stderr, "{rendered}");
                return EXIT_USAGE;
            }
            let _ = write!(stdout, "{rendered}");
            return 0;
        }
    };

    let Some(("workflow", workflow)) = matches.subcommand() else {
        let _ = writeln!(stderr, "Error: unknown command");
        return EXIT_USAGE;
    };
    let Some((name, sub)) = workflow.subcommand() else {
        let _ = writeln!(stderr, "Error: a workflow subcommand is required");
        return EXIT_USAGE;
    };
    let Some(command) = WorkflowCommand::from_name(name) else {
        let _ = writeln!(stderr, "Error: unknown workflow subcommand \"{name}\"");
        return EXIT_USAGE;
    };
    let tokens: Vec<&String> = sub.get_many::<String>("args").map(Iterator::collect).unwrap_or_default();

    let args = match scan_args(command, &tokens) {
        Ok(args) => args,
        Err(error) => {
            print_usage_error(command, &error.to_string(), stderr);
            return EXIT_USAGE;
        }
    };
    if args.help {
        let _ = write!(stderr, "{}", command.usage());
        return 0;
    }

    match run_workflow_command(command, &args, settings, cancel, stdout, stderr) {
        Ok(()) => 0,
        Err(error) => {
            match error.kind() {
                ErrorKind::Reported => debug!(error = %error, "failure already reported on stdout"),
                ErrorKind::Usage => print_usage_error(command, &error.to_string(), stderr),
                ErrorKind::Preflight | ErrorKind::Load => {
                    let _ = writeln!(stderr, "Error: workflow {}: {error}", command.name());
                }
            }
            error.exit_code()
        }
    }
}

fn print_usage_error(command: WorkflowCommand, message: &str, stderr: &mut dyn Write) {
    let _ = writeln!(stderr, "Error: {message}\n");
    let _ = write!(stderr, "{}", command.usage());
}

fn run_workflow_command(
    command: WorkflowCommand,
    args: &WorkflowArgs,
    settings: &WorkflowSettings,
    cancel: CancellationToken,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> Result<(), WorkflowError> {
    // Params are usage errors and must fail before the file is touched.
    let params = ParamBinding::parse(&args.params).map_err(|error| WorkflowError::usage(error.to_string()))?;

    let working_dir = std::env::current_dir().map_err(|source| WorkflowError::Read {
        path: Path::new(".").to_path_buf(),
        source,
    })?;
    let path = settings.workflow_path(args.file.as_deref(), &working_dir);
    debug!(command = command.name(), path = %path.display(), "resolved workflow file");

    match command {
        WorkflowCommand::Validate => {
            let document = load_document(&path)?;
            report_validation(&validate_document(&document), stdout, args.pretty)
        }
        WorkflowCommand::List => {
            let document = load_validated_document(&path)?;
            write_json(stdout, &list_workflows(&document, args.all), args.pretty)
        }
        WorkflowCommand::Run => {
            let document = load_validated_document(&path)?;
            let request = RunRequest {
                workflow: args.name.clone().unwrap_or_default(),
                params,
                dry_run: args.dry_run,
            };
            let outcome = if request.dry_run {
                run_workflow(&document, &request, &DryRunRunner, stderr)?
            } else {
                let runner = ShellCommandRunner::new(cancel);
                run_workflow(&document, &request, &runner, stderr)?
            };
            report_run(outcome, stdout, args.pretty)
        }
    }
}
