// crates/roast-core/src/report.rs
// ============================================================================
// Module: Run Reports
// Description: Case outcomes, class reports, and run summaries.
// Purpose: Aggregate results for rendering, artifacts, and exit status.
// Dependencies: serde, serde_jcs
// ============================================================================

//! ## Overview
//! Reports are plain data. [`RunReport::render_text`] produces the console
//! summary and [`RunReport::write_artifacts`] persists `summary.json`
//! (canonical JSON) and `summary.md` into a report directory. A run succeeds
//! when no case failed, errored, or was aborted by a setup failure; skips
//! and teardown failures never fail a run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::case::CaseName;
use crate::resources::TeardownFailure;
use crate::resources::TeardownReport;
use crate::skip::SkipReason;
use crate::tags::TagSet;

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Final outcome of one test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CaseOutcome {
    /// Every expectation held.
    Passed,
    /// An expectation did not hold.
    Failed {
        /// Assertion message with request context.
        message: String,
    },
    /// The case could not complete.
    Errored {
        /// Error description.
        message: String,
    },
    /// The case was deliberately not executed.
    Skipped {
        /// Why the case was skipped.
        reason: SkipReason,
    },
    /// Class setup failed before the case could run.
    Aborted {
        /// Setup failure description.
        message: String,
    },
}

impl CaseOutcome {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed {
                ..
            } => "failed",
            Self::Errored {
                ..
            } => "errored",
            Self::Skipped {
                ..
            } => "skipped",
            Self::Aborted {
                ..
            } => "aborted",
        }
    }

    /// Returns true when the outcome fails the run.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::Failed {
                ..
            } | Self::Errored {
                ..
            } | Self::Aborted {
                ..
            }
        )
    }
}

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Result of one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseReport {
    /// Owning class.
    pub class: String,
    /// Case name.
    pub case: CaseName,
    /// Case tags.
    pub tags: TagSet,
    /// Final outcome.
    pub outcome: CaseOutcome,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
    /// Case-scoped cleanups that failed.
    pub cleanup_failures: Vec<TeardownFailure>,
    /// Notes recorded by the body.
    pub notes: Vec<String>,
}

/// Result of one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassReport {
    /// Class name.
    pub class: String,
    /// Setup failure message, when setup failed.
    pub setup_failure: Option<String>,
    /// Case results in execution order.
    pub cases: Vec<CaseReport>,
    /// Class teardown result; `None` when setup never ran.
    pub teardown: Option<TeardownReport>,
}

/// Outcome counts for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Selected cases.
    pub total: usize,
    /// Passed cases.
    pub passed: usize,
    /// Failed cases.
    pub failed: usize,
    /// Errored cases.
    pub errored: usize,
    /// Skipped cases.
    pub skipped: usize,
    /// Cases aborted by setup failures.
    pub aborted: usize,
    /// Cleanup callbacks that failed (class and case scope).
    pub teardown_failures: usize,
}

/// Aggregated report for a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Tag expressions used for selection.
    pub filter: Vec<String>,
    /// Run start (unix milliseconds).
    pub started_at_ms: u64,
    /// Run end (unix milliseconds).
    pub ended_at_ms: u64,
    /// Per-class results.
    pub classes: Vec<ClassReport>,
}

impl RunReport {
    /// Starts an empty report for the given filter.
    #[must_use]
    pub fn start(filter: Vec<String>) -> Self {
        let now = now_millis();
        Self {
            filter,
            started_at_ms: now,
            ended_at_ms: now,
            classes: Vec::new(),
        }
    }

    /// Stamps the end time.
    pub fn finish(&mut self) {
        self.ended_at_ms = now_millis();
    }

    /// Iterates every case report.
    pub fn cases(&self) -> impl Iterator<Item = &CaseReport> {
        self.classes.iter().flat_map(|class| class.cases.iter())
    }

    /// Computes outcome counts.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        for case in self.cases() {
            summary.total += 1;
            match case.outcome {
                CaseOutcome::Passed => summary.passed += 1,
                CaseOutcome::Failed {
                    ..
                } => summary.failed += 1,
                CaseOutcome::Errored {
                    ..
                } => summary.errored += 1,
                CaseOutcome::Skipped {
                    ..
                } => summary.skipped += 1,
                CaseOutcome::Aborted {
                    ..
                } => summary.aborted += 1,
            }
            summary.teardown_failures += case.cleanup_failures.len();
        }
        summary.teardown_failures += self
            .classes
            .iter()
            .filter_map(|class| class.teardown.as_ref())
            .map(|teardown| teardown.failures.len())
            .sum::<usize>();
        summary
    }

    /// Returns true when no case failed, errored, or was aborted.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.cases().all(|case| !case.outcome.is_failure())
    }

    /// Renders a human-readable summary.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for class in &self.classes {
            let _ = writeln!(out, "{}", class.class);
            if let Some(failure) = &class.setup_failure {
                let _ = writeln!(out, "  setup failed: {failure}");
            }
            for case in &class.cases {
                let _ = writeln!(
                    out,
                    "  {:<8} {} ({} ms)",
                    case.outcome.label(),
                    case.case,
                    case.duration_ms
                );
                match &case.outcome {
                    CaseOutcome::Failed {
                        message,
                    }
                    | CaseOutcome::Errored {
                        message,
                    } => {
                        let _ = writeln!(out, "           {message}");
                    }
                    CaseOutcome::Skipped {
                        reason,
                    } => {
                        let _ = writeln!(out, "           {reason}");
                    }
                    CaseOutcome::Passed
                    | CaseOutcome::Aborted {
                        ..
                    } => {}
                }
                for failure in &case.cleanup_failures {
                    let _ = writeln!(out, "           teardown: {failure}");
                }
            }
            if let Some(teardown) = &class.teardown {
                for failure in &teardown.failures {
                    let _ = writeln!(out, "  teardown: {failure}");
                }
            }
        }
        let summary = self.summary();
        let _ = writeln!(
            out,
            "\n{} cases: {} passed, {} failed, {} errored, {} skipped, {} aborted \
             ({} teardown failures)",
            summary.total,
            summary.passed,
            summary.failed,
            summary.errored,
            summary.skipped,
            summary.aborted,
            summary.teardown_failures
        );
        out
    }

    /// Writes `summary.json` and `summary.md` under `dir`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the directory or files cannot be written.
    pub fn write_artifacts(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;
        let json_path = dir.join("summary.json");
        let bytes = serde_jcs::to_vec(self).map_err(|err| io::Error::other(err.to_string()))?;
        fs::write(&json_path, bytes)?;
        let md_path = dir.join("summary.md");
        fs::write(&md_path, self.render_markdown())?;
        Ok(vec![json_path, md_path])
    }

    /// Renders the Markdown summary artifact.
    #[must_use]
    pub fn render_markdown(&self) -> String {
        let summary = self.summary();
        let mut out = String::new();
        out.push_str("# Smoke Run Summary\n\n");
        out.push_str("## Status\n\n");
        let status = if self.is_success() { "pass" } else { "fail" };
        let _ = writeln!(out, "- Status: {status}");
        let filter =
            if self.filter.is_empty() { "(all)".to_string() } else { self.filter.join(" | ") };
        let _ = writeln!(out, "- Filter: {filter}");
        let _ = writeln!(
            out,
            "- Duration (ms): {}",
            self.ended_at_ms.saturating_sub(self.started_at_ms)
        );
        let _ = writeln!(
            out,
            "- Cases: {} total, {} passed, {} failed, {} errored, {} skipped, {} aborted",
            summary.total,
            summary.passed,
            summary.failed,
            summary.errored,
            summary.skipped,
            summary.aborted
        );
        out.push_str("\n## Cases\n\n");
        if summary.total == 0 {
            out.push_str("- None\n");
        }
        for case in self.cases() {
            let _ = writeln!(out, "- `{}::{}`: {}", case.class, case.case, case.outcome.label());
        }
        out
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the current unix time in milliseconds.
pub(crate) fn now_millis() -> u64 {
    let millis = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
    u64::try_from(millis).unwrap_or(u64::MAX)
}
