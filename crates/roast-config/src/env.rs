// crates/roast-config/src/env.rs
// ============================================================================
// Module: Environment Overrides
// Description: Environment-backed overrides for the run configuration.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 or empty values fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use crate::config::Secret;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys read by the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoastEnv {
    /// Config file path override.
    Config,
    /// Auth token override.
    AuthToken,
    /// HTTP timeout override in seconds (positive integer).
    TimeoutSeconds,
    /// Report directory override.
    ReportDir,
    /// Log filter directive.
    Log,
}

impl RoastEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Config => "ROAST_CONFIG",
            Self::AuthToken => "ROAST_AUTH_TOKEN",
            Self::TimeoutSeconds => "ROAST_TIMEOUT_SEC",
            Self::ReportDir => "ROAST_REPORT_DIR",
            Self::Log => "ROAST_LOG",
        }
    }
}

// ============================================================================
// SECTION: Overrides
// ============================================================================

/// Typed overrides derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnvOverrides {
    /// Replaces `auth.token`.
    pub auth_token: Option<Secret>,
    /// Replaces `http.timeout_secs`.
    pub timeout: Option<Duration>,
    /// Replaces `report.dir`.
    pub report_dir: Option<PathBuf>,
}

impl EnvOverrides {
    /// Loads overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error when a value is not valid UTF-8, is empty, or fails
    /// validation.
    pub fn load() -> Result<Self, String> {
        let auth_token = read_env_nonempty(RoastEnv::AuthToken.as_str())?.map(Secret::new);
        let timeout = read_env_nonempty(RoastEnv::TimeoutSeconds.as_str())?
            .map(|value| parse_timeout_seconds(RoastEnv::TimeoutSeconds.as_str(), &value))
            .transpose()?;
        let report_dir = read_env_nonempty(RoastEnv::ReportDir.as_str())?.map(PathBuf::from);
        Ok(Self {
            auth_token,
            timeout,
            report_dir,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Reads an environment variable and rejects empty values.
///
/// # Errors
///
/// Returns an error when the variable is set but empty or whitespace.
pub fn read_env_nonempty(name: &str) -> Result<Option<String>, String> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a positive timeout value.
///
/// # Errors
///
/// Returns an error when the value is non-numeric or zero.
pub fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, String> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("{name} must be a positive integer number of seconds"))?;
    if secs == 0 {
        return Err(format!("{name} must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
