// crates/roast-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for filter parsing, skips, and output helpers.
// Purpose: Pin the decisions `roast run` makes before and after a run.
// Dependencies: roast-cli main helpers
// ============================================================================

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

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use clap::Parser;
use roast_config::RoastConfig;
use roast_core::CaseInfo;
use roast_core::CaseName;
use roast_core::SkipRecord;
use roast_core::TagSet;

use super::Cli;
use super::Commands;
use super::OutputFormat;
use super::parse_filter;
use super::render_case_line;
use super::report_dir;
use super::skip_registry;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn repeated_tags_are_collected() {
    let cli = Cli::try_parse_from([
        "roast",
        "run",
        "--tag",
        "type=smoke",
        "--tag",
        "type=positive",
        "--format",
        "json",
        "--include-known-issues",
    ])
    .unwrap();
    let Commands::Run(command) = cli.command else {
        panic!("expected run command");
    };
    assert_eq!(command.tags, vec!["type=smoke", "type=positive"]);
    assert_eq!(command.format, OutputFormat::Json);
    assert!(command.include_known_issues);
    assert_eq!(parse_filter(&command.tags).unwrap().exprs().len(), 2);
}

#[test]
fn malformed_tag_is_reported_before_running() {
    let err = parse_filter(&["type=".to_string()]).unwrap_err();
    assert!(err.to_string().starts_with("invalid tag expression:"));
}

#[test]
fn resolved_issues_and_override_feed_the_skip_registry() {
    let config = RoastConfig::from_toml_str("[issues]\nresolved = [\"launchpad:1\"]\n").unwrap();
    let fixed = SkipRecord::new("launchpad", "1");
    let open = SkipRecord::new("launchpad", "2");
    let registry = skip_registry(&config, false);
    assert!(registry.is_resolved(&fixed));
    assert!(!registry.is_resolved(&open));
    assert!(skip_registry(&config, true).is_resolved(&open));
}

#[test]
fn report_dir_flag_wins_over_config() {
    let config = RoastConfig::from_toml_str("[report]\ndir = \"from-config\"\n").unwrap();
    assert_eq!(report_dir(Some(Path::new("flag")), &config), Some(Path::new("flag")));
    assert_eq!(report_dir(None, &config), Some(Path::new("from-config")));
    assert_eq!(report_dir(None, &RoastConfig::default()), None);
}

#[test]
fn list_lines_show_tags_and_skips() {
    let case = CaseInfo {
        class: "containers".to_string(),
        name: CaseName::new("create_generic_container"),
        tags: TagSet::new().with("type", "positive"),
        skip: Some(SkipRecord::new("launchpad", "1344365")),
        summary: None,
    };
    assert_eq!(
        render_case_line(&case),
        "containers::create_generic_container [type=positive] skip: launchpad:1344365"
    );
}
