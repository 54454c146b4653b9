//! Lifecycle phases of a single `workflow run`.
//!
//! ```text
//! NotStarted -> BeforeAll -> Steps -> AfterAll -> Done(None)
//!                   \           \         \
//!                    +-----------+---------+--> ErrorHook(failure) -> Done(Some(failure))
//! ```
//!
//! Every running phase either advances or moves to [`RunPhase::ErrorHook`]
//! carrying the failure that ended the run. The error hook is skipped when the
//! failure came from cancellation.

use std::fmt;

/// Why a run stopped before completing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFailure {
    /// Top-level message placed in the result's `error` field.
    pub message: String,
    /// The run was interrupted by a signal or deadline rather than a failing command.
    pub canceled: bool,
}

impl RunFailure {
    pub fn new(message: impl Into<String>, canceled: bool) -> Self {
        Self {
            message: message.into(),
            canceled,
        }
    }
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunPhase {
    NotStarted,
    BeforeAll,
    Steps,
    AfterAll,
    ErrorHook(RunFailure),
    Done(Option<RunFailure>),
}

impl RunPhase {
    /// Phase reached when the current phase completes without failure.
    pub fn advance(self) -> RunPhase {
        match self {
            RunPhase::NotStarted => RunPhase::BeforeAll,
            RunPhase::BeforeAll => RunPhase::Steps,
            RunPhase::Steps => RunPhase::AfterAll,
            RunPhase::AfterAll => RunPhase::Done(None),
            RunPhase::ErrorHook(failure) => RunPhase::Done(Some(failure)),
            done @ RunPhase::Done(_) => done,
        }
    }

    /// Phase reached when the current phase fails with `failure`.
    ///
    /// A failure raised while the error hook itself runs never replaces the
    /// original one.
    pub fn fail(self, failure: RunFailure) -> RunPhase {
        match self {
            RunPhase::ErrorHook(original) => RunPhase::Done(Some(original)),
            done @ RunPhase::Done(_) => done,
            _ => RunPhase::ErrorHook(failure),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, RunPhase::Done(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            RunPhase::NotStarted => "not_started",
            RunPhase::BeforeAll => "before_all",
            RunPhase::Steps => "steps",
            RunPhase::AfterAll => "after_all",
            RunPhase::ErrorHook(_) => "error_hook",
            RunPhase::Done(_) => "done",
        }
    }
}
