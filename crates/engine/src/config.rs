//! Environment-driven settings for workflow commands.
//!
//! Flags always win over the environment; the environment wins over built-in
//! defaults. The default workflow file is a single fixed path relative to the
//! working directory; parent directories are not searched.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use asc_util::resolve_against;
use tracing::warn;

/// Default location of the workflow definition file.
pub const DEFAULT_WORKFLOW_PATH: &str = ".asc/workflow.json";

/// Environment variable overriding the workflow file path when `--file` is absent.
pub const WORKFLOW_FILE_ENV: &str = "ASC_WORKFLOW_FILE";

/// Environment variable holding a run deadline, in whole seconds.
pub const WORKFLOW_TIMEOUT_ENV: &str = "ASC_WORKFLOW_TIMEOUT";

/// Settings resolved once per invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowSettings {
    /// Workflow file named by the environment, if any.
    pub file_override: Option<String>,
    /// Deadline after which an in-flight run is canceled.
    pub timeout: Option<Duration>,
}

impl WorkflowSettings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let file_override = lookup(WORKFLOW_FILE_ENV)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let timeout = lookup(WORKFLOW_TIMEOUT_ENV).and_then(|raw| match raw.trim().parse::<u64>() {
            Ok(0) => None,
            Ok(seconds) => Some(Duration::from_secs(seconds)),
            Err(error) => {
                warn!(
                    variable = WORKFLOW_TIMEOUT_ENV,
                    value = %raw,
                    error = %error,
                    "ignoring unparsable workflow timeout"
                );
                None
            }
        });

        Self { file_override, timeout }
    }

    /// Resolve the workflow file: `--file`, then the environment, then the default path.
    pub fn workflow_path(&self, file_flag: Option<&str>, working_dir: &Path) -> PathBuf {
        let chosen = file_flag
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .or(self.file_override.as_deref())
            .unwrap_or(DEFAULT_WORKFLOW_PATH);
        resolve_against(working_dir, chosen)
    }
}
