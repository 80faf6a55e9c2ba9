// crates/roast-suites/src/lib.rs
// ============================================================================
// Module: Cloud Roast Suites
// Description: Catalog of test classes run by the `roast` CLI.
// Purpose: Register every class with its cases, tags, and skip records.
// Dependencies: roast-core, roast-clients, roast-config
// ============================================================================

//! ## Overview
//! Each module defines one fixture and the class built on it. [`catalog`]
//! returns every class in a stable order; the runner applies tag filters and
//! skip decisions on top of it.
//!
//! A class whose configuration section is absent reports its cases as
//! unsupported instead of failing setup.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod containers;
pub mod rescue;
pub mod stacktach;
mod support;

// ============================================================================
// SECTION: Catalog
// ============================================================================

use roast_config::RoastConfig;
use roast_core::Suite;

/// Returns every registered test class.
#[must_use]
pub fn catalog() -> Vec<Box<dyn Suite<RoastConfig>>> {
    vec![Box::new(containers::class()), Box::new(rescue::class()), Box::new(stacktach::class())]
}
