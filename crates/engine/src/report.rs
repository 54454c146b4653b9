//! Result documents on standard output.
//!
//! Each `workflow` subcommand writes exactly one JSON document followed by a
//! newline. Failures whose details live inside that document are returned as
//! [`WorkflowError::Reported`] so the caller does not describe them twice.

use std::io::Write;

use asc_types::ValidationReport;
use serde::Serialize;

use crate::{error::WorkflowError, workflow::RunOutcome};

/// Serialize `value` as one JSON document, compact or indented.
pub fn write_json<T>(out: &mut dyn Write, value: &T, pretty: bool) -> Result<(), WorkflowError>
where
    T: Serialize + ?Sized,
{
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|error| WorkflowError::Output(error.into()))?;
    writeln!(out, "{rendered}").map_err(WorkflowError::Output)?;
    out.flush().map_err(WorkflowError::Output)
}

/// Print a run's result document, then surface its failure as already reported.
pub fn report_run(outcome: RunOutcome, out: &mut dyn Write, pretty: bool) -> Result<(), WorkflowError> {
    write_json(out, &outcome.result, pretty)?;
    match outcome.failure {
        None => Ok(()),
        Some(failure) => Err(WorkflowError::Reported {
            message: failure.message,
            canceled: failure.canceled,
        }),
    }
}

/// Print a validation report; an invalid document is a reported failure.
pub fn report_validation(report: &ValidationReport, out: &mut dyn Write, pretty: bool) -> Result<(), WorkflowError> {
    write_json(out, report, pretty)?;
    if report.valid {
        return Ok(());
    }
    Err(WorkflowError::Reported {
        message: format!("found {} error(s)", report.errors.len()),
        canceled: false,
    })
}
