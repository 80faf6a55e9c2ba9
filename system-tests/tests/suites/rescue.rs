// system-tests/tests/suites/rescue.rs
// ============================================================================
// Module: Rescue Scenarios
// Description: End-to-end runs of the admin rescue class against the stub.
// Purpose: Verify the rescue round trip, setup aborts, and class cleanup.
// Dependencies: system-tests helpers, roast-config, roast-core, roast-suites
// ============================================================================

use roast_config::Hypervisor;
use roast_core::CaseOutcome;
use roast_core::SkipReason;
use roast_core::SkipRegistry;
use roast_suites::rescue::CLASS_NAME;
use system_tests::cloud::StubOptions;

use crate::helpers::harness::Stubbed;
use crate::helpers::harness::class;
use crate::helpers::harness::outcome;

const CASE: &str = "rescue_and_unrescue_server_as_admin";

#[test]
fn rescue_round_trip_passes_and_releases_server_then_keypair() {
    let stub = Stubbed::start();
    let report = stub.run(&["type=smoke,net=yes"], SkipRegistry::new());

    assert_eq!(*outcome(&report, CLASS_NAME, CASE), CaseOutcome::Passed);
    let notes = &class(&report, CLASS_NAME).cases[0].notes;
    assert_eq!(notes.len(), 1);
    assert!(notes[0].contains("flavor 2"), "{notes:?}");
    assert!(notes[0].contains("key key"), "{notes:?}");
    let teardown = class(&report, CLASS_NAME).teardown.clone().unwrap();
    assert_eq!(teardown.registered, 2);
    assert_eq!(teardown.released, 2);
    assert!(teardown.is_clean());

    let deletes = stub
        .cloud
        .requests()
        .into_iter()
        .filter(|line| line.method == "DELETE")
        .map(|line| line.path)
        .collect::<Vec<_>>();
    assert_eq!(deletes.len(), 2);
    assert!(deletes[0].starts_with("/compute/servers/"), "{deletes:?}");
    assert!(deletes[1].starts_with("/compute/os-keypairs/"), "{deletes:?}");
    stub.assert_no_leaks();
}

#[test]
fn rescue_actions_use_the_admin_token() {
    let stub = Stubbed::start();
    stub.run(&["net=yes"], SkipRegistry::new());

    let actions = stub
        .cloud
        .requests()
        .into_iter()
        .filter(|line| line.path.ends_with("/action"))
        .map(|line| line.status)
        .collect::<Vec<_>>();
    assert_eq!(actions, vec![200, 202]);
}

#[test]
fn unchanged_rescue_password_fails_the_case() {
    let stub = Stubbed::with_options(StubOptions {
        rescue_keeps_password: true,
        ..StubOptions::default()
    });
    let report = stub.run(&["net=yes"], SkipRegistry::new());

    match outcome(&report, CLASS_NAME, CASE) {
        CaseOutcome::Failed {
            message,
        } => assert!(message.contains("password did not change"), "{message}"),
        other => panic!("expected a failed case, got {other:?}"),
    }
    stub.assert_no_leaks();
}

#[test]
fn server_build_error_aborts_class_and_still_cleans_up() {
    let stub = Stubbed::with_options(StubOptions {
        server_build_fails: true,
        ..StubOptions::default()
    });
    let report = stub.run(&["net=yes"], SkipRegistry::new());

    let rescue = class(&report, CLASS_NAME);
    assert!(rescue.setup_failure.as_deref().is_some_and(|failure| failure.contains("ERROR")));
    assert!(matches!(outcome(&report, CLASS_NAME, CASE), CaseOutcome::Aborted { .. }));
    let teardown = rescue.teardown.clone().unwrap();
    assert_eq!(teardown.released, 2);
    assert!(!report.is_success());
    stub.assert_no_leaks();
}

#[test]
fn unsupported_hypervisor_skips_without_touching_compute() {
    let mut stub = Stubbed::start();
    stub.config.compute.as_mut().unwrap().hypervisor = Hypervisor::Ironic;
    let report = stub.run(&["net=yes"], SkipRegistry::new());

    match outcome(&report, CLASS_NAME, CASE) {
        CaseOutcome::Skipped {
            reason: SkipReason::Unsupported {
                message,
            },
        } => assert!(message.contains("ironic"), "{message}"),
        other => panic!("expected an unsupported skip, got {other:?}"),
    }
    assert!(class(&report, CLASS_NAME).teardown.is_none());
    assert!(stub.cloud.requests().is_empty());
    assert!(report.is_success());
}
