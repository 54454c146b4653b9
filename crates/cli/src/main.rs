use std::{io, process::ExitCode, time::Duration};

use anyhow::{Context, Result};
use asc_engine::WorkflowSettings;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();
    let settings = WorkflowSettings::from_env();
    let cancel = CancellationToken::new();
    watch_for_cancellation(cancel.clone(), settings.timeout);

    let args: Vec<String> = std::env::args().collect();
    // Unlocked handles lock per write, so the watcher can still log while a run streams output.
    let code = tokio::task::spawn_blocking(move || {
        asc_cli::run_with_args(args, &settings, cancel, &mut io::stdout(), &mut io::stderr())
    })
    .await
    .context("workflow command panicked")?;
    Ok(ExitCode::from(code))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Cancels `cancel` on Ctrl-C or once `timeout` elapses.
fn watch_for_cancellation(cancel: CancellationToken, timeout: Option<Duration>) {
    tokio::spawn(async move {
        let deadline = async {
            match timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending().await,
            }
        };
        let interrupt = async {
            if let Err(error) = tokio::signal::ctrl_c().await {
                warn!(error = %error, "cannot listen for interrupts");
                std::future::pending::<()>().await;
            }
        };
        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = interrupt => {
                cancel.cancel();
                warn!("interrupt received, canceling workflow");
            }
            _ = deadline => {
                cancel.cancel();
                warn!(?timeout, "workflow deadline elapsed, canceling workflow");
            }
        }
    });
}
