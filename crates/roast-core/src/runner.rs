// crates/roast-core/src/runner.rs
// ============================================================================
// Module: Runner
// Description: Selection, planning, and sequential execution of a catalog.
// Purpose: Apply tag filters and skip decisions, then run each class.
// Dependencies: crate::suite, crate::report
// ============================================================================

//! ## Overview
//! The runner walks a catalog of [`Suite`]s in declaration order. For each
//! class it selects the cases matching the [`TagFilter`], decides skips via
//! the [`SkipRegistry`] (or the class applicability check), and hands the
//! resulting [`ClassPlan`] to the class. Classes with no selected case are
//! left out of the report entirely. Execution is strictly sequential.

// ============================================================================
// SECTION: Imports
// ============================================================================

use tracing::debug;

use crate::case::CaseInfo;
use crate::observer::RunObserver;
use crate::plan::ClassPlan;
use crate::plan::Disposition;
use crate::plan::PlannedCase;
use crate::report::RunReport;
use crate::skip::SkipReason;
use crate::skip::SkipRegistry;
use crate::suite::Suite;
use crate::tags::TagFilter;

// ============================================================================
// SECTION: Options
// ============================================================================

/// Selection and skip policy for a run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Tag filter selecting cases.
    pub filter: TagFilter,
    /// Known-issue skip decisions.
    pub skips: SkipRegistry,
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Executes a catalog of suites against one configuration.
pub struct Runner<'a, C> {
    /// Catalog in declaration order.
    suites: &'a [Box<dyn Suite<C>>],
    /// Selection and skip policy.
    options: RunOptions,
}

impl<'a, C> Runner<'a, C> {
    /// Creates a runner over a catalog.
    #[must_use]
    pub const fn new(suites: &'a [Box<dyn Suite<C>>], options: RunOptions) -> Self {
        Self {
            suites,
            options,
        }
    }

    /// Returns metadata for every case the filter selects.
    #[must_use]
    pub fn select(&self) -> Vec<CaseInfo> {
        self.suites
            .iter()
            .flat_map(|suite| suite.cases())
            .filter(|case| self.options.filter.matches(&case.tags))
            .collect()
    }

    /// Builds the execution plan for one suite.
    #[must_use]
    pub fn plan(&self, suite: &dyn Suite<C>, config: &C) -> ClassPlan {
        let unsupported = suite.applicability(config);
        let entries = suite
            .cases()
            .into_iter()
            .enumerate()
            .filter(|(_, case)| self.options.filter.matches(&case.tags))
            .map(|(index, case)| {
                let disposition = unsupported
                    .as_ref()
                    .map(|message| SkipReason::Unsupported {
                        message: message.clone(),
                    })
                    .or_else(|| self.options.skips.decide(case.skip.as_ref()))
                    .map_or(Disposition::Run, Disposition::Skip);
                PlannedCase {
                    index,
                    disposition,
                }
            })
            .collect();
        ClassPlan {
            entries,
        }
    }

    /// Runs every selected case and returns the aggregated report.
    pub fn run(&self, config: &C, observer: &mut dyn RunObserver) -> RunReport {
        let filter = self.options.filter.exprs().iter().map(ToString::to_string).collect();
        let mut report = RunReport::start(filter);
        for suite in self.suites {
            let plan = self.plan(suite.as_ref(), config);
            if plan.is_empty() {
                debug!(class = suite.name(), "no cases selected");
                continue;
            }
            report.classes.push(suite.execute(config, &plan, observer));
        }
        report.finish();
        report
    }
}
