// crates/roast-config/tests/config.rs
// ============================================================================
// Module: Configuration Tests
// Description: Loading, defaults, overrides, and validation of `roast.toml`.
// ============================================================================
//! ## Overview
//! Validates that configuration parsing fails closed on malformed input and
//! that defaults and environment overrides land where suites expect them.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use roast_config::ConfigError;
use roast_config::EnvOverrides;
use roast_config::Hypervisor;
use roast_config::RoastConfig;
use roast_config::Secret;

const FULL: &str = r#"
[http]
timeout_secs = 30

[auth]
token = "tenant-token"
project_id = "12345"

[key_manager]
endpoint = "http://barbican.local:9311"

[compute]
endpoint = "http://nova.local:8774/v2/12345"
admin_endpoint = "http://nova-admin.local:8774/v2/12345"
admin_token = "admin-token"
image_ref = "img-1"
flavor_ref = "2"
hypervisor = "ironic"
poll_interval_ms = 50

[stacktach]
endpoint = "http://stacktach.local"
event_id = "evt-1"

[issues]
resolved = ["launchpad:1344365"]

[report]
dir = "reports"
"#;

#[test]
fn full_config_parses() {
    let config = RoastConfig::from_toml_str(FULL).expect("config");
    assert_eq!(config.http.timeout(), Duration::from_secs(30));
    assert_eq!(config.auth.token.as_ref().map(Secret::expose), Some("tenant-token"));
    let compute = config.compute.as_ref().expect("compute");
    assert_eq!(compute.hypervisor, Hypervisor::Ironic);
    assert!(!compute.hypervisor.supports_rescue());
    assert_eq!(compute.admin_endpoint(), "http://nova-admin.local:8774/v2/12345");
    assert_eq!(compute.build_timeout(), Duration::from_secs(600));
    assert_eq!(compute.poll_interval(), Duration::from_millis(50));
    let stacktach = config.stacktach.as_ref().expect("stacktach");
    assert_eq!(stacktach.service, "nova");
    assert_eq!(stacktach.timing_event, "compute.instance.reboot");
    assert_eq!(config.issues.resolved, vec!["launchpad:1344365".to_string()]);
    assert_eq!(config.report.dir, Some(PathBuf::from("reports")));
}

#[test]
fn empty_config_uses_defaults() {
    let config = RoastConfig::from_toml_str("").expect("config");
    assert_eq!(config.http.timeout_secs, 60);
    assert_eq!(config.http.max_response_bytes, 4 * 1024 * 1024);
    assert!(config.key_manager.is_none());
    assert!(config.compute.is_none());
    assert!(config.stacktach.is_none());
}

#[test]
fn admin_endpoint_defaults_to_tenant_endpoint() {
    let config = RoastConfig::from_toml_str(
        r#"
[compute]
endpoint = "http://nova.local"
image_ref = "img"
flavor_ref = "1"
"#,
    )
    .expect("config");
    let compute = config.compute.expect("compute");
    assert_eq!(compute.admin_endpoint(), "http://nova.local");
    assert_eq!(compute.hypervisor, Hypervisor::Kvm);
    assert!(compute.hypervisor.supports_rescue());
}

#[test]
fn secrets_are_redacted_in_debug() {
    let config = RoastConfig::from_toml_str(FULL).expect("config");
    let rendered = format!("{config:?}");
    assert!(!rendered.contains("tenant-token"));
    assert!(!rendered.contains("admin-token"));
    assert!(rendered.contains("<redacted>"));
}

#[test]
fn invalid_values_fail_closed() {
    let cases = [
        ("[http]\ntimeout_secs = 0\n", "timeout_secs"),
        ("[http]\nmax_response_bytes = 10\n", "max_response_bytes"),
        ("[key_manager]\nendpoint = \"ftp://barbican\"\n", "http or https"),
        ("[key_manager]\nendpoint = \"not a url\"\n", "not a valid url"),
        ("[issues]\nresolved = [\"1344365\"]\n", "tracker:id"),
        ("[auth]\ntoken = \"\"\n", "auth.token"),
        (
            "[stacktach]\nendpoint = \"http://st\"\nevent_id = \"has space\"\n",
            "whitespace",
        ),
    ];
    for (input, needle) in cases {
        match RoastConfig::from_toml_str(input) {
            Err(ConfigError::Invalid(message)) => {
                assert!(message.contains(needle), "{message} should mention {needle}");
            }
            other => panic!("expected invalid config for {input:?}, got {other:?}"),
        }
    }
}

#[test]
fn unknown_fields_and_hypervisors_are_parse_errors() {
    assert!(matches!(
        RoastConfig::from_toml_str("[http]\ntimeout = 5\n"),
        Err(ConfigError::Parse(_))
    ));
    assert!(matches!(
        RoastConfig::from_toml_str(
            "[compute]\nendpoint = \"http://n\"\nimage_ref = \"i\"\nflavor_ref = \"f\"\n\
             hypervisor = \"abacus\"\n"
        ),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn overrides_replace_file_values() {
    let mut config = RoastConfig::from_toml_str(FULL).expect("config");
    config.apply_overrides(EnvOverrides {
        auth_token: Some(Secret::new("from-env")),
        timeout: Some(Duration::from_secs(5)),
        report_dir: Some(PathBuf::from("/tmp/roast")),
    });
    assert_eq!(config.auth.token.as_ref().map(Secret::expose), Some("from-env"));
    assert_eq!(config.http.timeout_secs, 5);
    assert_eq!(config.report.dir, Some(PathBuf::from("/tmp/roast")));
    config.validate().expect("still valid");
}

#[test]
fn load_reads_explicit_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("roast.toml");
    fs::write(&path, FULL).expect("write");
    let config = RoastConfig::load(Some(&path)).expect("load");
    assert!(config.key_manager.is_some());
}

#[test]
fn load_rejects_missing_oversized_and_non_utf8_files() {
    let dir = tempfile::tempdir().expect("tempdir");

    let missing = dir.path().join("missing.toml");
    assert!(matches!(RoastConfig::load(Some(&missing)), Err(ConfigError::Io(_))));

    let large = dir.path().join("large.toml");
    fs::write(&large, format!("# {}\n", "x".repeat(300 * 1024))).expect("write");
    assert!(matches!(RoastConfig::load(Some(&large)), Err(ConfigError::Invalid(_))));

    let binary = dir.path().join("binary.toml");
    fs::write(&binary, [0xff_u8, 0xfe, 0x00]).expect("write");
    match RoastConfig::load(Some(&binary)) {
        Err(ConfigError::Invalid(message)) => assert!(message.contains("utf-8")),
        other => panic!("expected utf-8 rejection, got {other:?}"),
    }
}
