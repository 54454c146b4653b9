//! Per-token scanning of `workflow` subcommand arguments.
//!
//! Flags may appear before, between, or after the positional workflow name and
//! params, so tokens are classified one at a time instead of handing them to a
//! conventional parser that stops at the first positional.
//!
//! - `--file PATH` / `--file=PATH` takes a value; the next token is consumed
//!   unless it starts with `--`. Single-dash tokens are valid values.
//! - boolean flags accept an optional inline value: `--dry-run=false`.
//! - `--` ends flag scanning; everything after it is positional.

use thiserror::Error;

/// The `workflow` subcommands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowCommand {
    Run,
    Validate,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagKind {
    Value,
    Bool,
}

#[derive(Debug, Clone, Copy)]
struct FlagSpec {
    name: &'static str,
    kind: FlagKind,
    help: &'static str,
}

const FILE: FlagSpec = FlagSpec {
    name: "file",
    kind: FlagKind::Value,
    help: "Path to the workflow file (default .asc/workflow.json)",
};
const DRY_RUN: FlagSpec = FlagSpec {
    name: "dry-run",
    kind: FlagKind::Bool,
    help: "Print commands instead of executing them",
};
const PRETTY: FlagSpec = FlagSpec {
    name: "pretty",
    kind: FlagKind::Bool,
    help: "Pretty-print JSON output",
};
const ALL: FlagSpec = FlagSpec {
    name: "all",
    kind: FlagKind::Bool,
    help: "Include private workflows",
};

impl WorkflowCommand {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "run" => Some(WorkflowCommand::Run),
            "validate" => Some(WorkflowCommand::Validate),
            "list" => Some(WorkflowCommand::List),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            WorkflowCommand::Run => "run",
            WorkflowCommand::Validate => "validate",
            WorkflowCommand::List => "list",
        }
    }

    pub fn about(self) -> &'static str {
        match self {
            WorkflowCommand::Run => "Run a named workflow",
            WorkflowCommand::Validate => "Validate the workflow file for errors and cycles",
            WorkflowCommand::List => "List available workflows",
        }
    }

    fn flags(self) -> &'static [FlagSpec] {
        match self {
            WorkflowCommand::Run => &[FILE, DRY_RUN, PRETTY],
            WorkflowCommand::Validate => &[FILE, PRETTY],
            WorkflowCommand::List => &[FILE, PRETTY, ALL],
        }
    }

    fn flag(self, name: &str) -> Option<&'static FlagSpec> {
        self.flags().iter().find(|spec| spec.name == name)
    }

    /// Help text for the subcommand.
    pub fn usage(self) -> String {
        let synopsis = match self {
            WorkflowCommand::Run => "asc workflow run [flags] <name> [KEY:VALUE|KEY=VALUE ...]",
            WorkflowCommand::Validate => "asc workflow validate [flags]",
            WorkflowCommand::List => "asc workflow list [flags]",
        };
        let mut usage = format!("{}\n\nUsage:\n  {synopsis}\n\nFlags:\n", self.about());
        for spec in self.flags() {
            let label = match spec.kind {
                FlagKind::Value => format!("--{} <PATH>", spec.name),
                FlagKind::Bool => format!("--{}", spec.name),
            };
            usage.push_str(&format!("  {label:<18} {}\n", spec.help));
        }
        usage.push_str(&format!("  {:<18} {}\n", "-h, --help", "Print help"));
        usage
    }
}

/// A token sequence that does not form a valid invocation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ArgsError {
    #[error("`--{0}` requires a value")]
    MissingValue(&'static str),

    #[error("invalid value \"{value}\" for `--{flag}`: expected true or false")]
    InvalidValue { flag: &'static str, value: String },

    #[error("unknown flag `{0}`")]
    UnknownFlag(String),

    #[error("unexpected argument \"{0}\"")]
    UnexpectedArgument(String),

    #[error("workflow name is required")]
    MissingName,
}

/// Scanned arguments of one `workflow` subcommand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowArgs {
    pub file: Option<String>,
    pub dry_run: bool,
    pub pretty: bool,
    pub all: bool,
    pub help: bool,
    /// Workflow name (`run` only).
    pub name: Option<String>,
    /// Raw param tokens following the name (`run` only).
    pub params: Vec<String>,
}

impl WorkflowArgs {
    fn set_bool(&mut self, flag: &str, value: bool) {
        match flag {
            "dry-run" => self.dry_run = value,
            "pretty" => self.pretty = value,
            "all" => self.all = value,
            _ => {}
        }
    }
}

/// Classify `tokens` for `command`.
pub fn scan_args<S: AsRef<str>>(command: WorkflowCommand, tokens: &[S]) -> Result<WorkflowArgs, ArgsError> {
    let mut args = WorkflowArgs::default();
    let mut positional: Vec<String> = Vec::new();
    let mut flags_done = false;
    let mut tokens = tokens.iter().map(AsRef::<str>::as_ref);

    while let Some(token) = tokens.next() {
        if flags_done || !looks_like_flag(token) {
            if !flags_done && token == "-h" {
                args.help = true;
            } else {
                positional.push(token.to_string());
            }
            continue;
        }
        if token == "--" {
            flags_done = true;
            continue;
        }
        if token == "--help" {
            args.help = true;
            continue;
        }

        let body = &token[2..];
        let (name, inline) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };
        let spec = command.flag(name).ok_or_else(|| ArgsError::UnknownFlag(token.to_string()))?;

        match spec.kind {
            FlagKind::Value => {
                let value = match inline {
                    Some(value) => value,
                    None => tokens.next().filter(|next| !looks_like_flag(next)).ok_or(ArgsError::MissingValue(spec.name))?,
                };
                if value.trim().is_empty() {
                    return Err(ArgsError::MissingValue(spec.name));
                }
                args.file = Some(value.to_string());
            }
            FlagKind::Bool => {
                let value = match inline {
                    Some(raw) => parse_bool(raw).ok_or_else(|| ArgsError::InvalidValue {
                        flag: spec.name,
                        value: raw.to_string(),
                    })?,
                    None => true,
                };
                args.set_bool(spec.name, value);
            }
        }
    }

    let mut positional = positional.into_iter();
    match command {
        WorkflowCommand::Run => {
            args.name = positional.next();
            args.params = positional.collect();
            if args.name.is_none() && !args.help {
                return Err(ArgsError::MissingName);
            }
        }
        WorkflowCommand::Validate | WorkflowCommand::List => {
            if let Some(extra) = positional.next() {
                return Err(ArgsError::UnexpectedArgument(extra));
            }
        }
    }
    Ok(args)
}

fn looks_like_flag(token: &str) -> bool {
    token.starts_with("--")
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}
