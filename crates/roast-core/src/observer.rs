// crates/roast-core/src/observer.rs
// ============================================================================
// Module: Run Observer
// Description: Progress hooks invoked by the lifecycle manager.
// Purpose: Stream progress to logs without coupling the runner to a sink.
// Dependencies: tracing
// ============================================================================

//! ## Overview
//! [`RunObserver`] receives class, case, and teardown events in run order.
//! [`TracingObserver`] turns them into structured log events.

use tracing::info;
use tracing::warn;

use crate::case::CaseName;
use crate::report::CaseReport;
use crate::report::ClassReport;
use crate::resources::TeardownReport;

/// Receives lifecycle events as a run progresses.
pub trait RunObserver {
    /// A class is about to be planned for execution.
    fn class_started(&mut self, _class: &str, _selected: usize) {}

    /// Class setup finished; `error` is set when it failed.
    fn setup_finished(&mut self, _class: &str, _error: Option<&str>) {}

    /// A case is about to run.
    fn case_started(&mut self, _class: &str, _case: &CaseName) {}

    /// A case reached its final outcome.
    fn case_finished(&mut self, _report: &CaseReport) {}

    /// A registry teardown completed.
    fn teardown_finished(&mut self, _report: &TeardownReport) {}

    /// A class finished, including teardown.
    fn class_finished(&mut self, _report: &ClassReport) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

/// Observer that emits `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RunObserver for TracingObserver {
    fn class_started(&mut self, class: &str, selected: usize) {
        info!(class, selected, "class started");
    }

    fn setup_finished(&mut self, class: &str, error: Option<&str>) {
        match error {
            Some(error) => warn!(class, error, "class setup failed"),
            None => info!(class, "class setup complete"),
        }
    }

    fn case_started(&mut self, class: &str, case: &CaseName) {
        info!(class, case = %case, "case started");
    }

    fn case_finished(&mut self, report: &CaseReport) {
        if report.outcome.is_failure() {
            warn!(
                class = %report.class,
                case = %report.case,
                outcome = report.outcome.label(),
                duration_ms = report.duration_ms,
                "case finished"
            );
        } else {
            info!(
                class = %report.class,
                case = %report.case,
                outcome = report.outcome.label(),
                duration_ms = report.duration_ms,
                "case finished"
            );
        }
    }

    fn teardown_finished(&mut self, report: &TeardownReport) {
        if report.is_clean() {
            info!(
                scope = %report.scope,
                released = report.released,
                already_gone = report.already_gone,
                "teardown complete"
            );
        } else {
            warn!(
                scope = %report.scope,
                failures = report.failures.len(),
                "teardown completed with failures"
            );
        }
    }

    fn class_finished(&mut self, report: &ClassReport) {
        info!(class = %report.class, cases = report.cases.len(), "class finished");
    }
}
