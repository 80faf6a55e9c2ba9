// system-tests/tests/helpers/harness.rs
// ============================================================================
// Module: Stub Harness
// Description: Runs the registered catalog against a stub cloud.
// Purpose: Keep scenario tests to setup knobs and outcome assertions.
// Dependencies: system-tests, roast-config, roast-core, roast-suites
// ============================================================================

use roast_config::RoastConfig;
use roast_core::CaseOutcome;
use roast_core::ClassReport;
use roast_core::NoopObserver;
use roast_core::RunOptions;
use roast_core::RunReport;
use roast_core::Runner;
use roast_core::SkipRegistry;
use roast_core::TagFilter;
use roast_suites::catalog;
use system_tests::cloud::StubCloud;
use system_tests::cloud::StubOptions;
use system_tests::config::SystemTestConfig;

/// Stub cloud plus a config pointing at it.
pub struct Stubbed {
    pub cloud: StubCloud,
    pub config: RoastConfig,
}

impl Stubbed {
    /// Starts a stub with default behavior.
    pub fn start() -> Self {
        Self::with_options(StubOptions::default())
    }

    /// Starts a stub with the given knobs.
    pub fn with_options(options: StubOptions) -> Self {
        let cloud = StubCloud::with_options(options).expect("stub cloud starts");
        let mut config = cloud.config().expect("stub config is valid");
        let overrides = SystemTestConfig::load().expect("system test env is valid");
        if let (Some(timeout), Some(compute)) = (overrides.timeout, config.compute.as_mut()) {
            compute.build_timeout_secs = timeout.as_secs();
        }
        Self {
            cloud,
            config,
        }
    }

    /// Runs the catalog with tag expressions and a skip registry.
    pub fn run(&self, tags: &[&str], skips: SkipRegistry) -> RunReport {
        let filter = if tags.is_empty() {
            TagFilter::all()
        } else {
            TagFilter::parse(tags).expect("valid tags")
        };
        let suites = catalog();
        let runner = Runner::new(&suites, RunOptions {
            filter,
            skips,
        });
        runner.run(&self.config, &mut NoopObserver)
    }

    /// Asserts the stub holds no resource after a run.
    pub fn assert_no_leaks(&self) {
        let live = self.cloud.live_resources();
        assert!(live.is_empty(), "resources left behind: {live:?}");
    }
}

/// Returns the report for one class.
pub fn class<'a>(report: &'a RunReport, name: &str) -> &'a ClassReport {
    report
        .classes
        .iter()
        .find(|class| class.class == name)
        .unwrap_or_else(|| panic!("class {name} missing"))
}

/// Returns `(case, outcome label)` pairs for one class.
pub fn labels(report: &RunReport, name: &str) -> Vec<(String, &'static str)> {
    class(report, name)
        .cases
        .iter()
        .map(|case| (case.case.to_string(), case.outcome.label()))
        .collect()
}

/// Returns the outcome of one case.
pub fn outcome<'a>(report: &'a RunReport, class_name: &str, case: &str) -> &'a CaseOutcome {
    &class(report, class_name)
        .cases
        .iter()
        .find(|report| report.case.as_str() == case)
        .unwrap_or_else(|| panic!("case {class_name}::{case} missing"))
        .outcome
}

/// Counts cases in one class with the given outcome label.
pub fn count(report: &RunReport, name: &str, label: &str) -> usize {
    labels(report, name).iter().filter(|(_, found)| *found == label).count()
}
