//! Async runtime helpers for blocking callers.
//!
//! The workflow engine is a synchronous state machine, but child processes
//! are driven with Tokio so output can be streamed and cancellation observed.
//! This module provides the single bridge between the two.

use anyhow::anyhow;
use std::future::Future;
use tokio::{
    runtime::{Handle, RuntimeFlavor},
    task,
};

/// Execute an async future from synchronous code.
///
/// # Arguments
/// - `future`: The future to run to completion. It may borrow from the caller.
///
/// # Returns
/// Returns the future's output or an error if a Tokio runtime cannot be created.
///
/// # Notes
/// - Reuses the current multi-threaded runtime when available.
/// - Falls back to a fresh single-threaded runtime for call sites outside Tokio.
/// - Fails inside a current-thread runtime, where blocking in place is not permitted.
pub fn block_on_future<F, T>(future: F) -> anyhow::Result<T>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => task::block_in_place(|| handle.block_on(future)),
        Ok(_) => Err(anyhow!("blocking calls require a multi-threaded Tokio runtime")),
        Err(_) => run_on_fresh_runtime(future),
    }
}

fn run_on_fresh_runtime<F, T>(future: F) -> anyhow::Result<T>
where
    F: Future<Output = anyhow::Result<T>>,
{
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| anyhow!(error))?
        .block_on(future)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_outside_a_runtime() {
        let value = block_on_future(async { Ok::<_, anyhow::Error>(21 * 2) }).expect("future completes");
        assert_eq!(value, 42);
    }

    #[test]
    fn future_may_borrow_from_the_caller() {
        let mut sink = Vec::new();
        block_on_future(async {
            sink.extend_from_slice(b"streamed");
            Ok(())
        })
        .expect("future completes");
        assert_eq!(sink, b"streamed");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn reuses_a_multi_threaded_runtime() {
        let value = block_on_future(async { Ok::<_, anyhow::Error>("ok") }).expect("future completes");
        assert_eq!(value, "ok");
    }
}
