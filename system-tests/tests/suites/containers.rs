// system-tests/tests/suites/containers.rs
// ============================================================================
// Module: Containers Scenarios
// Description: End-to-end runs of the containers class against the stub.
// Purpose: Verify outcomes, issue skips, and cleanup of key manager resources.
// Dependencies: system-tests helpers, roast-core, roast-suites
// ============================================================================

use roast_core::CaseOutcome;
use roast_core::SkipReason;
use roast_core::SkipRegistry;
use roast_suites::containers::CLASS_NAME;
use system_tests::cloud::StubOptions;

use crate::helpers::harness::Stubbed;
use crate::helpers::harness::class;
use crate::helpers::harness::count;
use crate::helpers::harness::labels;
use crate::helpers::harness::outcome;

const BLOCKED_CASES: [&str; 3] =
    ["create_empty_generic_container", "create_generic_container", "create_rsa_container"];

#[test]
fn containers_pass_and_open_issue_cases_skip() {
    let stub = Stubbed::start();
    let report = stub.run(&["type=positive"], SkipRegistry::new());

    assert_eq!(count(&report, CLASS_NAME, "passed"), 4, "{:?}", labels(&report, CLASS_NAME));
    assert_eq!(count(&report, CLASS_NAME, "skipped"), 3);
    for name in BLOCKED_CASES {
        match outcome(&report, CLASS_NAME, name) {
            CaseOutcome::Skipped {
                reason: SkipReason::KnownIssue {
                    record,
                },
            } => assert_eq!(record.to_string(), "launchpad:1344365"),
            other => panic!("{name} should skip on the open issue, got {other:?}"),
        }
    }
    assert!(report.is_success());
    stub.assert_no_leaks();
}

#[test]
fn resolved_issue_runs_every_container_case() {
    let stub = Stubbed::start();
    let report = stub.run(&[], SkipRegistry::new().resolve("launchpad:1344365"));

    assert_eq!(count(&report, CLASS_NAME, "passed"), 7, "{:?}", labels(&report, CLASS_NAME));
    stub.assert_no_leaks();
}

#[test]
fn case_teardown_deletes_container_before_its_secret() {
    let stub = Stubbed::start();
    stub.run(&["type=positive"], SkipRegistry::new());

    let deletes = stub
        .cloud
        .requests()
        .into_iter()
        .filter(|line| line.method == "DELETE")
        .map(|line| line.path)
        .collect::<Vec<_>>();
    // get_generic_container is the first case to run.
    assert!(deletes[0].starts_with("/v1/containers/"), "{deletes:?}");
    assert!(deletes[1].starts_with("/v1/secrets/"), "{deletes:?}");
}

#[test]
fn deleted_container_is_already_gone_at_teardown() {
    let stub = Stubbed::start();
    let report = stub.run(&["type=positive"], SkipRegistry::new());

    assert_eq!(*outcome(&report, CLASS_NAME, "delete_container"), CaseOutcome::Passed);
    let repeated = stub
        .cloud
        .requests()
        .into_iter()
        .filter(|line| line.method == "DELETE" && line.status == 404)
        .count();
    assert_eq!(repeated, 1);
    stub.assert_no_leaks();
}

#[test]
fn refused_container_creation_errors_cases_and_cleans_secrets() {
    let stub = Stubbed::with_options(StubOptions {
        container_create_status: 500,
        ..StubOptions::default()
    });
    let report = stub.run(&[], SkipRegistry::new());

    for name in ["get_generic_container", "get_rsa_container", "delete_container"] {
        match outcome(&report, CLASS_NAME, name) {
            CaseOutcome::Errored {
                message,
            } => assert!(message.contains("create container"), "{message}"),
            other => panic!("{name} should error on the refused create, got {other:?}"),
        }
    }
    match outcome(&report, CLASS_NAME, "list_containers") {
        CaseOutcome::Failed {
            message,
        } => assert!(message.contains("containers length"), "{message}"),
        other => panic!("expected failed listing, got {other:?}"),
    }
    assert_eq!(count(&report, CLASS_NAME, "passed"), 0);
    assert!(!report.is_success());
    let teardown = class(&report, CLASS_NAME).teardown.as_ref();
    assert!(teardown.is_some_and(|teardown| teardown.is_clean()));
    stub.assert_no_leaks();
}
