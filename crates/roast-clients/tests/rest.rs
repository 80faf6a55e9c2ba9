// crates/roast-clients/tests/rest.rs
// ============================================================================
// Module: REST Transport Tests
// Description: Transport behavior against a scripted local server.
// Purpose: Validate headers, URL resolution, limits, and cleanup outcomes.
// Dependencies: roast-clients, roast-core, tiny_http
// ============================================================================

//! ## Overview
//! Drives [`RestClient`] against a local `tiny_http` server that answers from
//! a fixed script and records every request it receives.

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

mod common;

use roast_clients::ClientError;
use roast_clients::RestClient;
use roast_core::CleanupOutcome;
use roast_core::ResourceRegistry;
use serde_json::Value;

use crate::common::Scripted;
use crate::common::limited_client;
use crate::common::rest_client;

// ============================================================================
// SECTION: Requests
// ============================================================================

#[test]
fn credentials_are_sent_on_every_request() {
    let server = Scripted::start(vec![(200, "{}".to_string()), (204, String::new())]);
    let client = rest_client(&server.url);
    client.get::<Value>("v1/things").unwrap();
    client.delete("v1/things/1").unwrap();
    let requests = server.finish();
    assert_eq!(requests.len(), 2);
    for request in &requests {
        assert_eq!(request.token.as_deref(), Some("token-1"));
        assert_eq!(request.project.as_deref(), Some("project-1"));
    }
    assert_eq!(requests[1].method, "DELETE");
}

#[test]
fn relative_targets_extend_the_endpoint_path() {
    let client = rest_client("http://127.0.0.1:9/api");
    let url = client.url("/v1/containers", &[("limit", "10")]).unwrap();
    assert_eq!(url.as_str(), "http://127.0.0.1:9/api/v1/containers?limit=10");
}

#[test]
fn absolute_targets_are_used_verbatim() {
    let client = rest_client("http://127.0.0.1:9/api/");
    let url = client.url("http://other:9311/v1/secrets/abc", &[]).unwrap();
    assert_eq!(url.as_str(), "http://other:9311/v1/secrets/abc");
}

#[test]
fn invalid_endpoint_is_rejected() {
    let http = roast_config::HttpConfig::default();
    let err = RestClient::new("not a url", &http, &Default::default()).unwrap_err();
    assert!(matches!(err, ClientError::InvalidUrl(_)));
}

#[test]
fn post_sends_json_body() {
    let server = Scripted::start(vec![(201, r#"{"id":"x"}"#.to_string())]);
    let client = rest_client(&server.url);
    let response =
        client.post::<_, Value>("v1/things", &serde_json::json!({"name": "alpha"})).unwrap();
    assert_eq!(response.status, 201);
    assert_eq!(response.reason, "Created");
    assert_eq!(response.entity.unwrap()["id"], "x");
    let requests = server.finish();
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].url, "/v1/things");
    assert_eq!(requests[0].body, r#"{"name":"alpha"}"#);
}

// ============================================================================
// SECTION: Responses
// ============================================================================

#[test]
fn undecodable_body_leaves_entity_empty() {
    let server = Scripted::start(vec![(500, "internal error".to_string())]);
    let client = rest_client(&server.url);
    let response = client.get::<Value>("v1/things").unwrap();
    assert_eq!(response.status, 500);
    assert!(response.entity.is_none());
    assert_eq!(response.exchange.body, "internal error");
    assert!(response.exchange.to_string().contains("500"));
    server.finish();
}

#[test]
fn oversized_response_is_rejected() {
    let server = Scripted::start(vec![(200, format!("\"{}\"", "a".repeat(2048)))]);
    let client = limited_client(&server.url, 1024);
    let err = client.get::<Value>("big").unwrap_err();
    assert!(matches!(err, ClientError::ResponseTooLarge { max_bytes: 1024, .. }));
    server.finish();
}

#[test]
fn require_reports_unexpected_status_with_context() {
    let server = Scripted::start(vec![(400, r#"{"title":"bad"}"#.to_string())]);
    let client = rest_client(&server.url);
    let err = client.get::<Value>("v1/things").unwrap().require("list things", 200).unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("list things returned 400, expected 200"));
    assert!(message.contains("bad"));
    server.finish();
}

// ============================================================================
// SECTION: Cleanup
// ============================================================================

#[test]
fn delete_cleanup_maps_statuses_to_outcomes() {
    let server = Scripted::start(vec![
        (204, String::new()),
        (404, String::new()),
        (409, String::new()),
    ]);
    let client = rest_client(&server.url);
    assert_eq!(client.delete_cleanup("a")().unwrap(), CleanupOutcome::Released);
    assert_eq!(client.delete_cleanup("b")().unwrap(), CleanupOutcome::AlreadyGone);
    assert!(client.delete_cleanup("c")().unwrap_err().contains("409"));
    server.finish();
}

#[test]
fn registry_teardown_tolerates_already_deleted_resources() {
    let server = Scripted::start(vec![(404, String::new()), (204, String::new())]);
    let client = rest_client(&server.url);
    let mut registry = ResourceRegistry::new("class");
    registry.add("first", client.delete_cleanup("v1/first"));
    registry.add("second", client.delete_cleanup("v1/second"));
    let report = registry.tear_down();
    assert!(report.is_clean());
    assert_eq!(report.invoked, 2);
    assert_eq!(report.already_gone, 1);
    assert_eq!(report.released, 1);
    let requests = server.finish();
    assert_eq!(requests[0].url, "/v1/second");
    assert_eq!(requests[1].url, "/v1/first");
}
