//! Small helpers for environment-driven configuration structs.
//!
//! Each crate's `from_env` constructor reads its variables through these
//! helpers so that a malformed value is reported as a [`ConfigError`]
//! naming the variable instead of aborting the process.

use std::str::FromStr;

use crate::error::ConfigError;

/// Read a required, non-empty variable.
pub fn required(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

/// Read an optional variable, treating empty values as unset.
pub fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Read a variable with a string default.
pub fn string_or(name: &str, default: &str) -> String {
    optional(name).unwrap_or_else(|| default.to_string())
}

/// Parse a variable, falling back to `default` when it is unset.
///
/// A value that is present but does not parse is an error.
pub fn parse_or<T: FromStr>(
    name: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match optional(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value: raw,
        }),
    }
}
