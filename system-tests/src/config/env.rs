// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Environment-backed configuration for system tests.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: roast-config
// ============================================================================

//! ## Overview
//! Values are read through the same strict helpers the main configuration
//! uses: invalid UTF-8 and empty values fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use roast_config::env::parse_timeout_seconds;
use roast_config::env::read_env_nonempty;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for system test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Optional directory that keeps run artifacts after the test exits.
    RunRoot,
    /// Optional server build timeout override in seconds (positive integer).
    TimeoutSeconds,
}

impl SystemTestEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RunRoot => "ROAST_SYSTEM_TEST_RUN_ROOT",
            Self::TimeoutSeconds => "ROAST_SYSTEM_TEST_TIMEOUT_SEC",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed system test configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemTestConfig {
    /// Optional artifact root override.
    pub run_root: Option<PathBuf>,
    /// Optional server build timeout override.
    pub timeout: Option<Duration>,
}

impl SystemTestConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when an environment value is not valid UTF-8, is empty,
    /// or is not a positive timeout.
    pub fn load() -> Result<Self, String> {
        let run_root = read_env_nonempty(SystemTestEnv::RunRoot.as_str())?.map(PathBuf::from);
        let timeout = read_env_nonempty(SystemTestEnv::TimeoutSeconds.as_str())?
            .map(|value| parse_timeout_seconds(SystemTestEnv::TimeoutSeconds.as_str(), &value))
            .transpose()?;
        Ok(Self {
            run_root,
            timeout,
        })
    }
}
