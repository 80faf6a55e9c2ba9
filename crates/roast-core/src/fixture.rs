// crates/roast-core/src/fixture.rs
// ============================================================================
// Module: Fixtures
// Description: Class-scoped setup contract for groups of test cases.
// Purpose: Build shared prerequisite resources from explicit configuration.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! A [`Fixture`] is built once per test class from an explicit configuration
//! value. Every remote resource it creates must be registered in the supplied
//! [`ResourceRegistry`] before the next fallible step, so a setup that fails
//! halfway still has its partial state released by the lifecycle manager.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::case::CaseContext;
use crate::resources::ResourceRegistry;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fixture could not create a prerequisite resource.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("fixture setup failed: {message}")]
pub struct SetupFailure {
    /// Failure description.
    message: String,
}

impl SetupFailure {
    /// Creates a setup failure.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the failure description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

// ============================================================================
// SECTION: Fixture Trait
// ============================================================================

/// Shared setup/teardown context for a class of test cases.
pub trait Fixture: Sized {
    /// Configuration consumed by setup.
    type Config;

    /// Creates class-scoped resources, registering a cleanup for each one.
    ///
    /// # Errors
    ///
    /// Returns [`SetupFailure`] when a prerequisite cannot be created; cleanups
    /// already registered are still executed.
    fn set_up(
        config: &Self::Config,
        resources: &mut ResourceRegistry,
    ) -> Result<Self, SetupFailure>;

    /// Runs before each executed case.
    ///
    /// # Errors
    ///
    /// Returns [`SetupFailure`] when per-case preparation fails; the case is
    /// then reported as errored without running its body.
    fn set_up_case(&self, _case: &mut CaseContext) -> Result<(), SetupFailure> {
        Ok(())
    }

    /// Runs after each executed case, before its resources are released.
    fn tear_down_case(&self, _case: &mut CaseContext) {}
}
