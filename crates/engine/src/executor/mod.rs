//! Command execution for workflow steps and hooks.
//!
//! - `runner::CommandRunner` abstracts how a shell command is executed
//! - `runner::ShellCommandRunner` spawns real child processes and streams their output
//! - `runner::DryRunRunner` only announces what would run
//! - `shell` resolves the system shell and drives a single child process

use std::io;

use asc_types::HookKind;
use indexmap::IndexMap;
use thiserror::Error;

pub mod runner;
pub mod shell;

pub use runner::{CommandRunner, DryRunRunner, ShellCommandRunner};

/// Where a command came from; used for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOrigin {
    /// A shell step, 1-based within its workflow.
    Step { index: usize },
    /// A lifecycle hook.
    Hook(HookKind),
}

/// A single shell command ready to execute.
#[derive(Debug, Clone, Copy)]
pub struct ShellInvocation<'a> {
    pub command: &'a str,
    /// Variables layered on top of the inherited process environment.
    pub env: &'a IndexMap<String, String>,
    pub origin: CommandOrigin,
}

/// Why a command did not complete successfully.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("no supported shell found (need bash or sh)")]
    ShellUnavailable,

    #[error("failed to start command: {0}")]
    Spawn(#[source] io::Error),

    #[error("exit status {0}")]
    Exit(i32),

    #[error("terminated by signal {0}")]
    Signal(i32),

    #[error("canceled")]
    Canceled,

    #[error("stream command output: {0}")]
    Stream(#[source] io::Error),

    #[error("{0}")]
    Runtime(String),
}

impl CommandError {
    pub fn is_canceled(&self) -> bool {
        matches!(self, CommandError::Canceled)
    }
}
