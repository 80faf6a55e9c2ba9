// crates/roast-core/src/suite.rs
// ============================================================================
// Module: Suites
// Description: Test classes grouping cases that share one fixture.
// Purpose: Provide an object-safe view of heterogeneous classes to the runner.
// Dependencies: crate::lifecycle
// ============================================================================

//! ## Overview
//! [`TestClass`] is the typed form: a name, a fixture type, and an ordered
//! list of cases. [`Suite`] erases the fixture type so a catalog of classes
//! with different fixtures can be held in one `Vec<Box<dyn Suite<C>>>` as
//! long as they share the configuration type `C`.

use std::fmt;

use crate::case::CaseInfo;
use crate::case::TestCase;
use crate::fixture::Fixture;
use crate::lifecycle::run_class;
use crate::observer::RunObserver;
use crate::plan::ClassPlan;
use crate::report::ClassReport;

// ============================================================================
// SECTION: Suite Trait
// ============================================================================

/// Object-safe interface to a test class.
pub trait Suite<C> {
    /// Class name, unique within a catalog.
    fn name(&self) -> &str;

    /// Case metadata in declaration order.
    fn cases(&self) -> Vec<CaseInfo>;

    /// Returns a reason when the class cannot run against `config`.
    fn applicability(&self, config: &C) -> Option<String>;

    /// Executes the planned cases and reports the results.
    fn execute(&self, config: &C, plan: &ClassPlan, observer: &mut dyn RunObserver) -> ClassReport;
}

// ============================================================================
// SECTION: Test Class
// ============================================================================

/// Applicability predicate returning a skip message.
type Applicability<C> = Box<dyn Fn(&C) -> Option<String>>;

/// A named group of cases sharing fixture `F`.
pub struct TestClass<F: Fixture> {
    /// Class name.
    name: String,
    /// Cases in declaration order.
    cases: Vec<TestCase<F>>,
    /// Environment check run before setup.
    applicability: Option<Applicability<F::Config>>,
}

impl<F: Fixture> TestClass<F> {
    /// Creates an empty class.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cases: Vec::new(),
            applicability: None,
        }
    }

    /// Appends a case.
    #[must_use]
    pub fn case(mut self, case: TestCase<F>) -> Self {
        self.cases.push(case);
        self
    }

    /// Marks every case unsupported when `check` returns a message.
    #[must_use]
    pub fn unsupported_when<P>(mut self, check: P) -> Self
    where
        P: Fn(&F::Config) -> Option<String> + 'static,
    {
        self.applicability = Some(Box::new(check));
        self
    }
}

impl<F: Fixture> fmt::Debug for TestClass<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestClass")
            .field("name", &self.name)
            .field("cases", &self.cases)
            .finish_non_exhaustive()
    }
}

impl<F: Fixture> Suite<F::Config> for TestClass<F> {
    fn name(&self) -> &str {
        &self.name
    }

    fn cases(&self) -> Vec<CaseInfo> {
        self.cases.iter().map(|case| case.info(&self.name)).collect()
    }

    fn applicability(&self, config: &F::Config) -> Option<String> {
        self.applicability.as_ref().and_then(|check| check(config))
    }

    fn execute(
        &self,
        config: &F::Config,
        plan: &ClassPlan,
        observer: &mut dyn RunObserver,
    ) -> ClassReport {
        run_class(&self.name, &self.cases, config, plan, observer)
    }
}
