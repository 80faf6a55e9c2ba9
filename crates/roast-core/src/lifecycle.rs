// crates/roast-core/src/lifecycle.rs
// ============================================================================
// Module: Lifecycle Manager
// Description: Class setup, per-case execution, and guaranteed teardown.
// Purpose: Run a planned class and release everything it created.
// Dependencies: crate::resources, crate::fixture
// ============================================================================

//! ## Overview
//! [`run_class`] drives one class through its lifecycle:
//!
//! 1. A plan with no runnable case reports its skips and never sets up.
//! 2. Fixture setup runs against a class-scoped [`ResourceRegistry`]. When it
//!    fails, every runnable case is reported aborted and whatever setup
//!    registered is torn down.
//! 3. Each runnable case gets its own registry, torn down right after the
//!    case. Skipped cases never reach any hook.
//! 4. The class registry is torn down last, after the fixture is dropped.
//!
//! Panics in setup, bodies, hooks, and cleanups are caught and reported; they
//! never prevent teardown.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::panic::AssertUnwindSafe;
use std::panic::catch_unwind;
use std::time::Instant;

use crate::case::CaseContext;
use crate::case::CaseFailure;
use crate::case::TestCase;
use crate::fixture::Fixture;
use crate::observer::RunObserver;
use crate::plan::ClassPlan;
use crate::plan::Disposition;
use crate::report::CaseOutcome;
use crate::report::CaseReport;
use crate::report::ClassReport;
use crate::resources::ResourceRegistry;
use crate::resources::TeardownFailure;
use crate::resources::panic_message;
use crate::skip::SkipReason;

// ============================================================================
// SECTION: Class Execution
// ============================================================================

/// Runs one planned class and returns its report.
pub(crate) fn run_class<F: Fixture>(
    class: &str,
    cases: &[TestCase<F>],
    config: &F::Config,
    plan: &ClassPlan,
    observer: &mut dyn RunObserver,
) -> ClassReport {
    observer.class_started(class, plan.len());
    let mut report = ClassReport {
        class: class.to_string(),
        setup_failure: None,
        cases: Vec::with_capacity(plan.len()),
        teardown: None,
    };

    if !plan.has_runnable() {
        for entry in &plan.entries {
            let (Some(case), Disposition::Skip(reason)) =
                (cases.get(entry.index), &entry.disposition)
            else {
                continue;
            };
            record(observer, &mut report, skipped_report(class, case, reason.clone()));
        }
        observer.class_finished(&report);
        return report;
    }

    let mut registry = ResourceRegistry::new(class);
    let setup = catch_unwind(AssertUnwindSafe(|| F::set_up(config, &mut registry)));
    let fixture = match setup {
        Ok(Ok(fixture)) => Some(fixture),
        Ok(Err(failure)) => {
            report.setup_failure = Some(failure.to_string());
            None
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            report.setup_failure = Some(format!("fixture setup panicked: {message}"));
            None
        }
    };
    observer.setup_finished(class, report.setup_failure.as_deref());

    for entry in &plan.entries {
        let Some(case) = cases.get(entry.index) else {
            continue;
        };
        let case_report = match (&entry.disposition, &fixture, &report.setup_failure) {
            (Disposition::Skip(reason), _, _) => skipped_report(class, case, reason.clone()),
            (Disposition::Run, Some(fixture), _) => run_case(class, case, fixture, observer),
            (Disposition::Run, None, failure) => CaseReport {
                class: class.to_string(),
                case: case.name().clone(),
                tags: case.tags().clone(),
                outcome: CaseOutcome::Aborted {
                    message: failure.clone().unwrap_or_default(),
                },
                duration_ms: 0,
                cleanup_failures: Vec::new(),
                notes: Vec::new(),
            },
        };
        record(observer, &mut report, case_report);
    }

    drop(fixture);
    let teardown = registry.tear_down();
    observer.teardown_finished(&teardown);
    report.teardown = Some(teardown);
    observer.class_finished(&report);
    report
}

// ============================================================================
// SECTION: Case Execution
// ============================================================================

/// Runs one case with its hooks and case-scoped teardown.
fn run_case<F: Fixture>(
    class: &str,
    case: &TestCase<F>,
    fixture: &F,
    observer: &mut dyn RunObserver,
) -> CaseReport {
    observer.case_started(class, case.name());
    let started = Instant::now();
    let mut context = CaseContext::new(case.name().clone());
    let mut cleanup_failures = Vec::new();

    let prepared = catch_unwind(AssertUnwindSafe(|| fixture.set_up_case(&mut context)));
    let outcome = match prepared {
        Ok(Ok(())) => match catch_unwind(AssertUnwindSafe(|| case.invoke(fixture, &mut context))) {
            Ok(Ok(())) => CaseOutcome::Passed,
            Ok(Err(CaseFailure::Assertion(failure))) => CaseOutcome::Failed {
                message: failure.to_string(),
            },
            Ok(Err(CaseFailure::Error(message))) => CaseOutcome::Errored {
                message,
            },
            Err(payload) => CaseOutcome::Errored {
                message: format!("case panicked: {}", panic_message(payload.as_ref())),
            },
        },
        Ok(Err(failure)) => CaseOutcome::Errored {
            message: failure.to_string(),
        },
        Err(payload) => CaseOutcome::Errored {
            message: format!("case setup panicked: {}", panic_message(payload.as_ref())),
        },
    };

    if let Err(payload) = catch_unwind(AssertUnwindSafe(|| fixture.tear_down_case(&mut context))) {
        cleanup_failures.push(TeardownFailure {
            label: "case teardown hook".to_string(),
            message: panic_message(payload.as_ref()),
        });
    }

    let (mut registry, notes) = context.into_parts();
    let teardown = registry.tear_down();
    if teardown.registered > 0 {
        observer.teardown_finished(&teardown);
    }
    cleanup_failures.extend(teardown.failures);

    CaseReport {
        class: class.to_string(),
        case: case.name().clone(),
        tags: case.tags().clone(),
        outcome,
        duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        cleanup_failures,
        notes,
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds the report for a case that never ran.
fn skipped_report<F>(class: &str, case: &TestCase<F>, reason: SkipReason) -> CaseReport {
    CaseReport {
        class: class.to_string(),
        case: case.name().clone(),
        tags: case.tags().clone(),
        outcome: CaseOutcome::Skipped {
            reason,
        },
        duration_ms: 0,
        cleanup_failures: Vec::new(),
        notes: Vec::new(),
    }
}

/// Notifies the observer and appends the case report.
fn record(observer: &mut dyn RunObserver, report: &mut ClassReport, case: CaseReport) {
    observer.case_finished(&case);
    report.cases.push(case);
}
