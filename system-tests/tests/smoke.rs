// system-tests/tests/smoke.rs
// ============================================================================
// Module: Smoke Suite
// Description: Aggregates end-to-end smoke system tests into one binary.
// Purpose: Reduce binaries while keeping catalog coverage centralized.
// Dependencies: suites/*, helpers
// ============================================================================

//! ## Overview
//! Runs the registered catalog against the in-process stub cloud.
//! Invariants:
//! - Every run leaves no stub resource behind, whatever the outcomes.
//! - Skipped cases never fail a run.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod helpers;

#[path = "suites/containers.rs"]
mod containers;
#[path = "suites/full_run.rs"]
mod full_run;
#[path = "suites/rescue.rs"]
mod rescue;
#[path = "suites/stacktach.rs"]
mod stacktach;
