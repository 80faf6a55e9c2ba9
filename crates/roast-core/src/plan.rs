// crates/roast-core/src/plan.rs
// ============================================================================
// Module: Class Plans
// Description: Per-class execution plan produced by the runner.
// Purpose: Record which selected cases run and which are skipped, and why.
// Dependencies: crate::skip
// ============================================================================

//! ## Overview
//! A [`ClassPlan`] lists the selected cases of one class in declaration
//! order with a [`Disposition`] for each.

use crate::skip::SkipReason;

/// What the lifecycle manager should do with a selected case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Execute the case body.
    Run,
    /// Record a skip without touching the fixture.
    Skip(SkipReason),
}

/// A selected case and its disposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCase {
    /// Index of the case within its class.
    pub index: usize,
    /// Planned disposition.
    pub disposition: Disposition,
}

/// Ordered plan for one class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassPlan {
    /// Selected cases in declaration order.
    pub entries: Vec<PlannedCase>,
}

impl ClassPlan {
    /// Returns true when at least one case will execute.
    #[must_use]
    pub fn has_runnable(&self) -> bool {
        self.entries.iter().any(|entry| entry.disposition == Disposition::Run)
    }

    /// Returns the number of selected cases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no case is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
