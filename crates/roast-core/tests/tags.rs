// crates/roast-core/tests/tags.rs
// ============================================================================
// Module: Tag Filter Tests
// Description: Parsing and matching coverage for tag expressions.
// ============================================================================
//! ## Overview
//! Verifies the tag expression grammar, its positioned diagnostics, and the
//! OR-of-ANDs selection semantics of [`TagFilter`].

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

use proptest::prelude::*;
use roast_core::TagError;
use roast_core::TagExpr;
use roast_core::TagFilter;
use roast_core::TagSet;
use roast_core::TagTerm;

fn smoke_tags() -> TagSet {
    TagSet::new().with("type", "smoke").with("net", "yes")
}

#[test]
fn expression_parses_pairs_and_bare_keys() {
    let expr = TagExpr::parse("type=smoke, net").expect("parse");
    assert_eq!(
        expr.terms(),
        &[
            TagTerm::Equals {
                key: "type".to_string(),
                value: "smoke".to_string(),
            },
            TagTerm::Present {
                key: "net".to_string(),
            },
        ]
    );
    assert_eq!(expr.to_string(), "type=smoke,net");
}

#[test]
fn expression_requires_every_term() {
    let expr: TagExpr = "type=smoke,net=yes".parse().expect("parse");
    assert!(expr.matches(&smoke_tags()));
    assert!(!expr.matches(&TagSet::new().with("type", "smoke")));
    assert!(!expr.matches(&TagSet::new().with("type", "positive").with("net", "yes")));
}

#[test]
fn bare_key_matches_any_value() {
    let expr = TagExpr::parse("net").expect("parse");
    assert!(expr.matches(&TagSet::new().with("net", "no")));
    assert!(!expr.matches(&TagSet::new().with("type", "smoke")));
}

#[test]
fn empty_filter_selects_everything() {
    let filter = TagFilter::parse(Vec::<String>::new()).expect("parse");
    assert!(filter.is_unrestricted());
    assert!(filter.matches(&TagSet::new()));
    assert!(filter.matches(&smoke_tags()));
}

#[test]
fn filter_expressions_are_or_combined() {
    let filter = TagFilter::parse(["type=positive", "type=smoke,net=yes"]).expect("parse");
    assert!(filter.matches(&TagSet::new().with("type", "positive")));
    assert!(filter.matches(&smoke_tags()));
    assert!(!filter.matches(&TagSet::new().with("type", "smoke")));
}

#[test]
fn parse_errors_carry_positions() {
    assert_eq!(TagExpr::parse("   "), Err(TagError::EmptyExpression));
    assert_eq!(
        TagExpr::parse("type=smoke,,net"),
        Err(TagError::EmptyTerm {
            position: 11
        })
    );
    assert_eq!(
        TagExpr::parse("=smoke"),
        Err(TagError::MissingKey {
            position: 0
        })
    );
    assert_eq!(
        TagExpr::parse("net=yes,type="),
        Err(TagError::MissingValue {
            key: "type".to_string(),
            position: 8,
        })
    );
    assert_eq!(
        TagExpr::parse("type=sm!oke"),
        Err(TagError::InvalidCharacter {
            found: '!',
            position: 7,
        })
    );
    assert_eq!(
        TagExpr::parse("type=smoke,type=positive"),
        Err(TagError::DuplicateKey {
            key: "type".to_string(),
        })
    );
}

#[test]
fn oversized_expression_is_rejected() {
    let input = "a".repeat(2000);
    assert!(matches!(
        TagExpr::parse(&input),
        Err(TagError::InputTooLarge {
            actual_bytes: 2000,
            ..
        })
    ));
}

#[test]
fn filter_reports_first_invalid_expression() {
    let err = TagFilter::parse(["type=smoke", "bad term"]).unwrap_err();
    assert!(matches!(err, TagError::InvalidCharacter { found: ' ', .. }));
}

fn atom() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_.-]{1,12}"
}

proptest! {
    #[test]
    fn expression_display_reparses(pairs in prop::collection::btree_map(atom(), atom(), 1 .. 6)) {
        let source = pairs
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(",");
        let expr = TagExpr::parse(&source).expect("parse");
        let reparsed = TagExpr::parse(&expr.to_string()).expect("reparse");
        prop_assert_eq!(expr, reparsed);
    }

    #[test]
    fn tag_set_matches_its_own_pairs(pairs in prop::collection::btree_map(atom(), atom(), 1 .. 6)) {
        let mut tags = TagSet::new();
        for (key, value) in &pairs {
            tags.insert(key.clone(), value.clone());
        }
        for (key, value) in &pairs {
            let expr = TagExpr::parse(&format!("{key}={value}")).expect("parse");
            prop_assert!(expr.matches(&tags));
        }
    }

    #[test]
    fn parser_never_panics(input in ".{0,64}") {
        let _ = TagExpr::parse(&input);
    }
}
