// crates/roast-clients/tests/services.rs
// ============================================================================
// Module: Service Client Tests
// Description: Key manager, compute, and StackTach clients over HTTP.
// Purpose: Validate request shapes, behaviors, and status polling.
// Dependencies: roast-clients, roast-core, tiny_http
// ============================================================================

//! ## Overview
//! Each test scripts the exact sequence of responses a behavior should see
//! and then inspects the requests it actually sent.

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

use std::time::Duration;

use roast_clients::BuildSettings;
use roast_clients::ClientError;
use roast_clients::ComputeClient;
use roast_clients::ContainerBehaviors;
use roast_clients::KeyManagerClient;
use roast_clients::ServerBehaviors;
use roast_clients::StackTachClient;
use roast_clients::key_manager::GENERIC_CONTAINER;
use roast_core::ResourceRegistry;
use serde_json::Value;

use crate::common::Scripted;
use crate::common::rest_client;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Server behaviors against one scripted endpoint used as tenant and admin.
fn server_behaviors(url: &str, build_timeout: Duration) -> ServerBehaviors {
    let client = ComputeClient::new(rest_client(url), rest_client(url));
    ServerBehaviors::new(client, BuildSettings {
        image_ref: "image-1".to_string(),
        flavor_ref: "flavor-1".to_string(),
        build_timeout,
        poll_interval: Duration::from_millis(1),
    })
}

/// `{"server": ...}` body with the given status.
fn server_body(status: &str) -> String {
    format!(r#"{{"server":{{"id":"srv-1","name":"server1","status":"{status}"}}}}"#)
}

// ============================================================================
// SECTION: Key Manager
// ============================================================================

#[test]
fn container_with_secret_registers_both_cleanups() {
    let server = Scripted::start(vec![
        (201, r#"{"secret_ref":"http://km/v1/secrets/s1"}"#.to_string()),
        (201, r#"{"container_ref":"http://km/v1/containers/c1"}"#.to_string()),
    ]);
    let behaviors = ContainerBehaviors::new(KeyManagerClient::new(rest_client(&server.url)));
    let mut resources = ResourceRegistry::new("case");
    let (secret_ref, response) =
        behaviors.create_container_with_secret(&mut resources, "box", "secret").unwrap();
    assert_eq!(secret_ref, "http://km/v1/secrets/s1");
    assert_eq!(response.status, 201);
    assert_eq!(resources.labels(), vec![
        "secret http://km/v1/secrets/s1",
        "container http://km/v1/containers/c1"
    ]);
    let requests = server.finish();
    let secret: Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(secret["payload"], "dGhlIHBheWxvYWQ=");
    assert_eq!(secret["bit_length"], 256);
    let container: Value = serde_json::from_str(&requests[1].body).unwrap();
    assert_eq!(container["type"], GENERIC_CONTAINER);
    assert_eq!(container["secret_refs"][0]["secret_ref"], "http://km/v1/secrets/s1");
}

#[test]
fn refused_container_is_not_registered() {
    let server = Scripted::start(vec![(400, r#"{"title":"bad type"}"#.to_string())]);
    let behaviors = ContainerBehaviors::new(KeyManagerClient::new(rest_client(&server.url)));
    let mut resources = ResourceRegistry::new("case");
    let response =
        behaviors.create_container(&mut resources, "box", "bogus", Vec::new()).unwrap();
    assert_eq!(response.status, 400);
    assert!(resources.is_empty());
    server.finish();
}

#[test]
fn list_containers_sends_paging_query() {
    let page = r#"{"containers":[{"container_ref":"http://km/c/1","type":"generic"}],"total":11}"#;
    let server = Scripted::start(vec![(200, page.to_string())]);
    let client = KeyManagerClient::new(rest_client(&server.url));
    let response = client.list_containers(10, 0).unwrap();
    let page = response.entity.unwrap();
    assert_eq!(page.containers.len(), 1);
    assert_eq!(page.total, Some(11));
    assert!(page.containers[0].secret_refs.is_empty());
    let requests = server.finish();
    assert_eq!(requests[0].url, "/v1/containers?limit=10&offset=0");
}

// ============================================================================
// SECTION: Compute
// ============================================================================

#[test]
fn active_server_keeps_create_password_and_is_registered() {
    let server = Scripted::start(vec![
        (202, r#"{"server":{"id":"srv-1","adminPass":"pw-1"}}"#.to_string()),
        (200, server_body("BUILD")),
        (200, server_body("ACTIVE")),
        (404, String::new()),
    ]);
    let behaviors = server_behaviors(&server.url, Duration::from_secs(5));
    let mut resources = ResourceRegistry::new("class");
    let active = behaviors.create_active_server(&mut resources, Some("key-1")).unwrap();
    assert_eq!(active.status.as_deref(), Some("ACTIVE"));
    assert_eq!(active.admin_pass.as_deref(), Some("pw-1"));
    let report = resources.tear_down();
    assert_eq!(report.already_gone, 1);
    let requests = server.finish();
    let body: Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(body["server"]["imageRef"], "image-1");
    assert_eq!(body["server"]["flavorRef"], "flavor-1");
    assert_eq!(body["server"]["key_name"], "key-1");
    assert_eq!(requests[3].method, "DELETE");
    assert_eq!(requests[3].url, "/servers/srv-1");
}

#[test]
fn error_status_stops_polling() {
    let server = Scripted::start(vec![(200, server_body("BUILD")), (200, server_body("ERROR"))]);
    let behaviors = server_behaviors(&server.url, Duration::from_secs(5));
    let err = behaviors.wait_for_server_status("srv-1", "ACTIVE").unwrap_err();
    assert_eq!(err, ClientError::ServerFailed {
        id: "srv-1".to_string(),
        status: "ERROR".to_string(),
    });
    assert_eq!(server.finish().len(), 2);
}

#[test]
fn build_timeout_stops_polling() {
    let server = Scripted::start(vec![(200, server_body("BUILD"))]);
    let behaviors = server_behaviors(&server.url, Duration::ZERO);
    let err = behaviors.wait_for_server_status("srv-1", "ACTIVE").unwrap_err();
    assert!(matches!(err, ClientError::Timeout { .. }));
    assert_eq!(server.finish().len(), 1);
}

#[test]
fn server_left_in_error_is_still_cleaned_up() {
    let server = Scripted::start(vec![
        (202, r#"{"server":{"id":"srv-1"}}"#.to_string()),
        (200, server_body("ERROR")),
        (204, String::new()),
    ]);
    let behaviors = server_behaviors(&server.url, Duration::from_secs(5));
    let mut resources = ResourceRegistry::new("class");
    assert!(behaviors.create_active_server(&mut resources, None).is_err());
    assert_eq!(resources.len(), 1);
    assert_eq!(resources.tear_down().released, 1);
    let requests = server.finish();
    assert!(!requests[0].body.contains("key_name"));
}

#[test]
fn rescue_posts_admin_action() {
    let server = Scripted::start(vec![(200, r#"{"adminPass":"rescue-pw"}"#.to_string())]);
    let client = ComputeClient::new(rest_client(&server.url), rest_client(&server.url));
    let response = client.rescue("srv-1").unwrap();
    assert_eq!(response.entity.unwrap().admin_pass.as_deref(), Some("rescue-pw"));
    let requests = server.finish();
    assert_eq!(requests[0].url, "/servers/srv-1/action");
    assert_eq!(requests[0].body, r#"{"rescue":{}}"#);
}

// ============================================================================
// SECTION: StackTach
// ============================================================================

#[test]
fn stacky_tables_decode_rows() {
    let server = Scripted::start(vec![
        (200, r#"[["Event Name"],["compute.instance.create.end"]]"#.to_string()),
        (200, r##"[["Key","Value"],["#",7],["Host","h1"]]"##.to_string()),
    ]);
    let client = StackTachClient::new(rest_client(&server.url));
    let events = client.get_event_names().unwrap().entity.unwrap();
    assert_eq!(events[0].event_name.as_deref(), Some("compute.instance.create.end"));
    let details = client.get_event_id_details("7", "nova").unwrap().entity.unwrap();
    assert_eq!(details.len(), 1);
    assert_eq!(details[0].host_name.as_deref(), Some("h1"));
    let requests = server.finish();
    assert_eq!(requests[0].url, "/stacky/events");
    assert_eq!(requests[1].url, "/stacky/show/7?service=nova");
}
