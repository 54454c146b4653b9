//! Caller-supplied workflow params.
//!
//! Params arrive as positional `KEY:VALUE` or `KEY=VALUE` tokens after the
//! workflow name. They are exposed to shell steps as environment variables
//! and gate steps that declare `if: "KEY"`.

use indexmap::IndexMap;
use thiserror::Error;

/// A param token that could not be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParamError {
    #[error("invalid parameter \"{0}\" (expected KEY:VALUE or KEY=VALUE)")]
    MissingSeparator(String),
    #[error("invalid parameter \"{0}\" (key must not be empty or whitespace)")]
    EmptyKey(String),
}

/// Ordered param bindings; a key supplied twice keeps its first position and its last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamBinding {
    values: IndexMap<String, String>,
}

impl ParamBinding {
    /// Parse param tokens, splitting each on the first `:` or `=`.
    pub fn parse<I, S>(tokens: I) -> Result<Self, ParamError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut binding = Self::default();
        for token in tokens {
            let token = token.as_ref();
            let separator = token.find([':', '=']).ok_or_else(|| ParamError::MissingSeparator(token.to_string()))?;
            let key = token[..separator].trim();
            if key.is_empty() {
                return Err(ParamError::EmptyKey(token.to_string()));
            }
            binding.insert(key, &token[separator + 1..]);
        }
        Ok(binding)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// True when `key` was supplied, regardless of its value.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn as_map(&self) -> &IndexMap<String, String> {
        &self.values
    }
}
