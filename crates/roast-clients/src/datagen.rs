// crates/roast-clients/src/datagen.rs
// ============================================================================
// Module: Data Generation
// Description: Random resource names for test-created resources.
// Dependencies: rand
// ============================================================================

//! ## Overview
//! Name generation for resources created during a run.

use rand::Rng;

/// Returns `prefix` followed by eight random digits.
#[must_use]
pub fn rand_name(prefix: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0 .. 100_000_000);
    format!("{prefix}{suffix:08}")
}
