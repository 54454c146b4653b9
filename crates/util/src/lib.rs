//! Utility helpers shared by the workflow engine and the CLI.

use once_cell::sync::Lazy;
use regex::Regex;

pub mod async_runtime;
pub mod jsonc;
pub mod path_processing;

pub use async_runtime::block_on_future;
pub use jsonc::strip_json_comments;
pub use path_processing::{expand_tilde, resolve_against};

static SENSITIVE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(authorization: )([\w\-\.=:/+]+)",
        r"(?i)([A-Z0-9_]*?(KEY|TOKEN|SECRET|PASSWORD)=)([^\s]+)",
        r"(?i)(DATABASE_URL=)([^\s]+)",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Redacts values that look like secrets in a string.
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for re in SENSITIVE_PATTERNS.iter() {
        redacted = re
            .replace_all(&redacted, |caps: &regex::Captures| {
                let prefix = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                format!("{}<redacted>", prefix)
            })
            .to_string();
    }
    redacted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_token_assignments_in_commands() {
        let redacted = redact_sensitive("API_TOKEN=abc123 ./deploy.sh --verbose");
        assert_eq!(redacted, "API_TOKEN=<redacted> ./deploy.sh --verbose");
    }

    #[test]
    fn leaves_plain_commands_untouched() {
        assert_eq!(redact_sensitive("echo hello"), "echo hello");
    }
}
