// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for Cloud Roast system-tests.
// Purpose: Provide the stub harness and artifact utilities.
// Dependencies: system-tests, roast-core, roast-suites
// ============================================================================

//! ## Overview
//! Shared helpers for Cloud Roast system-tests.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod artifacts;
pub mod harness;
