// crates/roast-core/src/lib.rs
// ============================================================================
// Module: Cloud Roast Core Library
// Description: Test-case runner with tagging, fixture lifecycle, and skips.
// Purpose: Orchestrate black-box API test cases against external services.
// Dependencies: serde, serde_jcs, thiserror, tracing
// ============================================================================

//! ## Overview
//! `roast-core` models test cases as explicit values: each case carries a
//! name, a tag set, an optional known-issue skip record, and a body closure
//! that runs against a class-scoped fixture. The [`Runner`] selects cases
//! with a [`TagFilter`], consults the [`SkipRegistry`], and hands each class
//! to the fixture lifecycle manager which guarantees setup/teardown pairing
//! and cleanup of every registered resource.
//!
//! Execution is strictly sequential. Nothing in this crate performs I/O
//! except report artifact writing.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod case;
pub mod expect;
pub mod fixture;
mod lifecycle;
pub mod observer;
pub mod plan;
pub mod report;
pub mod resources;
pub mod runner;
pub mod skip;
pub mod suite;
pub mod tags;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use case::CaseContext;
pub use case::CaseFailure;
pub use case::CaseInfo;
pub use case::CaseName;
pub use case::CaseResult;
pub use case::TestCase;
pub use expect::AssertionFailure;
pub use expect::Exchange;
pub use expect::Expect;
pub use fixture::Fixture;
pub use fixture::SetupFailure;
pub use observer::NoopObserver;
pub use observer::RunObserver;
pub use observer::TracingObserver;
pub use plan::ClassPlan;
pub use plan::Disposition;
pub use plan::PlannedCase;
pub use report::CaseOutcome;
pub use report::CaseReport;
pub use report::ClassReport;
pub use report::RunReport;
pub use report::RunSummary;
pub use resources::CleanupOutcome;
pub use resources::ResourceRegistry;
pub use resources::TeardownFailure;
pub use resources::TeardownReport;
pub use runner::RunOptions;
pub use runner::Runner;
pub use skip::SkipReason;
pub use skip::SkipRecord;
pub use skip::SkipRegistry;
pub use suite::Suite;
pub use suite::TestClass;
pub use tags::TagError;
pub use tags::TagExpr;
pub use tags::TagFilter;
pub use tags::TagSet;
pub use tags::TagTerm;
