// system-tests/tests/suites/stacktach.rs
// ============================================================================
// Module: StackTach Scenarios
// Description: End-to-end runs of the stacky API class against the stub.
// Purpose: Verify table decoding and the non-empty listing checks.
// Dependencies: system-tests helpers, roast-core, roast-suites
// ============================================================================

use roast_core::CaseOutcome;
use roast_core::SkipRegistry;
use roast_suites::stacktach::CLASS_NAME;
use system_tests::cloud::StubOptions;

use crate::helpers::harness::Stubbed;
use crate::helpers::harness::count;
use crate::helpers::harness::labels;
use crate::helpers::harness::outcome;

#[test]
fn every_stacky_listing_passes() {
    let stub = Stubbed::start();
    let report = stub.run(&["type=smoke"], SkipRegistry::new());

    assert_eq!(count(&report, CLASS_NAME, "passed"), 8, "{:?}", labels(&report, CLASS_NAME));
    let paths = stub.cloud.requests().into_iter().map(|line| line.path).collect::<Vec<_>>();
    assert!(paths.iter().any(|path| path == "/stacky/show/4242"), "{paths:?}");
    assert!(paths.iter().any(|path| path == "/stacky/timings"), "{paths:?}");
}

#[test]
fn header_only_tables_fail_every_case() {
    let stub = Stubbed::with_options(StubOptions {
        stacktach_empty: true,
        ..StubOptions::default()
    });
    let report = stub.run(&["type=smoke"], SkipRegistry::new());

    assert_eq!(count(&report, CLASS_NAME, "failed"), 8, "{:?}", labels(&report, CLASS_NAME));
    match outcome(&report, CLASS_NAME, "get_event_names") {
        CaseOutcome::Failed {
            message,
        } => assert!(message.contains("response entity length"), "{message}"),
        other => panic!("expected a failed listing, got {other:?}"),
    }
    match outcome(&report, CLASS_NAME, "get_event_id_details") {
        CaseOutcome::Failed {
            message,
        } => assert!(message.contains("category"), "{message}"),
        other => panic!("expected missing detail fields, got {other:?}"),
    }
}

#[test]
fn unknown_event_id_fails_the_detail_lookup() {
    let mut stub = Stubbed::start();
    stub.config.stacktach.as_mut().unwrap().event_id = "9999".to_string();
    let report = stub.run(&["type=smoke"], SkipRegistry::new());

    match outcome(&report, CLASS_NAME, "get_event_id_details") {
        CaseOutcome::Failed {
            message,
        } => assert!(message.contains("404"), "{message}"),
        other => panic!("expected a status failure, got {other:?}"),
    }
    assert_eq!(count(&report, CLASS_NAME, "passed"), 7);
}
