// system-tests/src/lib.rs
// ============================================================================
// Module: Cloud Roast System Tests Library
// Description: Stub cloud and configuration for end-to-end smoke runs.
// Purpose: Run the registered suites against an in-process service double.
// Dependencies: roast-config, serde_json, tiny_http, url
// ============================================================================

//! ## Overview
//! This crate hosts the stub cloud and environment configuration used by the
//! system-test binaries in `system-tests/tests`. The stub answers the key
//! manager, compute, and StackTach routes the suites call, so whole runs
//! can execute without a live deployment.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod cloud;
pub mod config;
