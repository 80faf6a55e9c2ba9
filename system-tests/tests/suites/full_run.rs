// system-tests/tests/suites/full_run.rs
// ============================================================================
// Module: Full Run Scenarios
// Description: Unfiltered catalog runs against the stub cloud.
// Purpose: Verify totals, success, and report artifacts of a complete run.
// Dependencies: system-tests helpers, roast-core, serde_json
// ============================================================================

use std::fs;

use roast_core::SkipRegistry;

use crate::helpers::artifacts::TestArtifacts;
use crate::helpers::harness::Stubbed;

#[test]
fn full_run_passes_with_open_issues_skipped() {
    let stub = Stubbed::start();
    let report = stub.run(&[], SkipRegistry::new());

    let summary = report.summary();
    assert_eq!(summary.total, 16);
    assert_eq!(summary.passed, 13);
    assert_eq!(summary.skipped, 3);
    assert_eq!(summary.teardown_failures, 0);
    assert!(report.is_success(), "{}", report.render_text());
    stub.assert_no_leaks();
}

#[test]
fn including_known_issues_runs_all_sixteen_cases() {
    let stub = Stubbed::start();
    let report = stub.run(&[], SkipRegistry::new().including_known_issues());

    let summary = report.summary();
    assert_eq!(summary.passed, 16, "{}", report.render_text());
    assert_eq!(summary.skipped, 0);
    stub.assert_no_leaks();
}

#[test]
fn full_run_writes_summary_artifacts() {
    let stub = Stubbed::start();
    let report = stub.run(&[], SkipRegistry::new());
    let artifacts = TestArtifacts::new("full_run_writes_summary_artifacts").unwrap();

    let written = report.write_artifacts(artifacts.root()).unwrap();
    assert_eq!(written.len(), 2);

    let summary = fs::read_to_string(artifacts.root().join("summary.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&summary).unwrap();
    assert_eq!(json["classes"].as_array().map(Vec::len), Some(3));
    let markdown = fs::read_to_string(artifacts.root().join("summary.md")).unwrap();
    assert!(markdown.contains("rescue_and_unrescue_server_as_admin"), "{markdown}");
}
