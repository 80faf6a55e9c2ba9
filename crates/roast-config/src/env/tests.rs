// crates/roast-config/src/env/tests.rs
// ============================================================================
// Module: Environment Override Tests
// Description: Unit tests for environment value parsing.
// Purpose: Validate timeout parsing and variable naming.
// Dependencies: roast-config
// ============================================================================

//! ## Overview
//! Exercises the pure parsing helpers; the process environment is never
//! mutated here.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

use std::time::Duration;

use super::RoastEnv;
use super::parse_timeout_seconds;
use super::read_env_strict;

#[test]
fn timeout_parses_positive_seconds() {
    assert_eq!(parse_timeout_seconds("T", " 30 ").unwrap(), Duration::from_secs(30));
}

#[test]
fn timeout_rejects_zero_and_garbage() {
    assert!(parse_timeout_seconds("T", "0").unwrap_err().contains("greater than zero"));
    assert!(parse_timeout_seconds("T", "soon").unwrap_err().contains("positive integer"));
    assert!(parse_timeout_seconds("T", "-5").is_err());
}

#[test]
fn variable_names_are_stable() {
    assert_eq!(RoastEnv::Config.as_str(), "ROAST_CONFIG");
    assert_eq!(RoastEnv::AuthToken.as_str(), "ROAST_AUTH_TOKEN");
    assert_eq!(RoastEnv::TimeoutSeconds.as_str(), "ROAST_TIMEOUT_SEC");
    assert_eq!(RoastEnv::ReportDir.as_str(), "ROAST_REPORT_DIR");
    assert_eq!(RoastEnv::Log.as_str(), "ROAST_LOG");
}

#[test]
fn unset_variable_reads_as_none() {
    assert_eq!(read_env_strict("ROAST_TEST_VARIABLE_THAT_IS_NEVER_SET").unwrap(), None);
}
