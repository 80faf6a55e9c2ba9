// system-tests/src/cloud.rs
// ============================================================================
// Module: Stub Cloud
// Description: In-process HTTP double for the key manager, compute, and
//              StackTach APIs.
// Purpose: Let whole smoke runs execute and clean up without a deployment.
// Dependencies: roast-config, serde_json, tiny_http, url
// ============================================================================

//! ## Overview
//! [`StubCloud`] binds an ephemeral loopback port and answers requests on a
//! background thread until it is dropped. State lives behind one mutex so
//! tests can inspect which resources are still alive after a run.
//!
//! Servers move through `BUILD` and rescue transitions one poll at a time:
//! each `GET` of a pending server counts down [`StubOptions::transition_polls`]
//! before the target status becomes visible.
//!
//! Every request must carry [`TENANT_TOKEN`] or [`ADMIN_TOKEN`]; server
//! actions additionally require the admin token.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::thread;
use std::thread::JoinHandle;

use roast_config::ConfigError;
use roast_config::RoastConfig;
use serde_json::Value;
use serde_json::json;
use tiny_http::Header;
use tiny_http::Request;
use tiny_http::Response;
use tiny_http::Server;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Token accepted for tenant calls.
pub const TENANT_TOKEN: &str = "stub-tenant-token";
/// Token required for admin server actions.
pub const ADMIN_TOKEN: &str = "stub-admin-token";
/// Project id written into generated configs.
pub const PROJECT_ID: &str = "stub-project";
/// Event id the StackTach stub knows about.
pub const KNOWN_EVENT_ID: &str = "4242";
/// Flavor served by the compute stub.
pub const FLAVOR_ID: &str = "2";
/// Default container page size.
const DEFAULT_PAGE_LIMIT: usize = 10;

// ============================================================================
// SECTION: Options
// ============================================================================

/// Behavior knobs for one stub instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubOptions {
    /// Status returned by container creation; anything but 201 stores nothing.
    pub container_create_status: u16,
    /// Boot servers into `ERROR` instead of `ACTIVE`.
    pub server_build_fails: bool,
    /// Return the create password again from rescue.
    pub rescue_keeps_password: bool,
    /// Serve header-only StackTach tables.
    pub stacktach_empty: bool,
    /// Polls a pending server answers before its target status shows.
    pub transition_polls: u32,
}

impl Default for StubOptions {
    fn default() -> Self {
        Self {
            container_create_status: 201,
            server_build_fails: false,
            rescue_keeps_password: false,
            stacktach_empty: false,
            transition_polls: 1,
        }
    }
}

// ============================================================================
// SECTION: State
// ============================================================================

/// One request seen by the stub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    /// HTTP method.
    pub method: String,
    /// Path without query.
    pub path: String,
    /// Response status.
    pub status: u16,
}

/// Stored container.
#[derive(Debug, Clone)]
struct StoredContainer {
    /// Container name.
    name: Option<String>,
    /// Container type.
    container_type: String,
    /// Secret references as sent on create.
    secret_refs: Value,
}

/// Pending status change.
#[derive(Debug, Clone)]
struct Transition {
    /// Status shown once the countdown ends.
    target: &'static str,
    /// Remaining polls before the target shows.
    polls_left: u32,
}

/// Stored server.
#[derive(Debug, Clone)]
struct StoredServer {
    /// Server name.
    name: String,
    /// Current status.
    status: &'static str,
    /// Pending change, if any.
    pending: Option<Transition>,
    /// Password returned on create.
    admin_pass: String,
}

impl StoredServer {
    /// Counts down a pending transition by one poll.
    fn advance(&mut self) {
        let Some(transition) = self.pending.as_mut() else {
            return;
        };
        if transition.polls_left == 0 {
            self.status = transition.target;
            self.pending = None;
        } else {
            transition.polls_left -= 1;
        }
    }

    /// Starts a transition through `interim` towards `target`.
    fn begin(&mut self, interim: &'static str, target: &'static str, polls: u32) {
        self.status = interim;
        self.pending = Some(Transition {
            target,
            polls_left: polls,
        });
    }
}

/// Mutable stub state.
#[derive(Debug, Default)]
struct CloudState {
    /// Last allocated id.
    last_id: u64,
    /// Live secret ids.
    secrets: BTreeSet<String>,
    /// Live containers by id.
    containers: BTreeMap<String, StoredContainer>,
    /// Live keypair names.
    keypairs: BTreeSet<String>,
    /// Live servers by id.
    servers: BTreeMap<String, StoredServer>,
    /// Every request in arrival order.
    requests: Vec<RequestLine>,
}

impl CloudState {
    /// Allocates the next resource id.
    fn next_id(&mut self) -> String {
        self.last_id += 1;
        format!("{:08}", self.last_id)
    }
}

/// Counts of resources still alive in the stub.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiveResources {
    /// Secrets not yet deleted.
    pub secrets: usize,
    /// Containers not yet deleted.
    pub containers: usize,
    /// Keypairs not yet deleted.
    pub keypairs: usize,
    /// Servers not yet deleted.
    pub servers: usize,
}

impl LiveResources {
    /// Returns true when nothing is left behind.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.secrets == 0 && self.containers == 0 && self.keypairs == 0 && self.servers == 0
    }
}

// ============================================================================
// SECTION: Stub Cloud
// ============================================================================

/// Running stub service.
pub struct StubCloud {
    /// Listening server, shared with the worker for unblocking.
    server: Arc<Server>,
    /// Base URL without a trailing slash.
    base_url: String,
    /// Shared state.
    state: Arc<Mutex<CloudState>>,
    /// Worker answering requests.
    worker: Option<JoinHandle<()>>,
}

impl StubCloud {
    /// Starts a stub with default options.
    ///
    /// # Errors
    ///
    /// Returns an error when the listener cannot be bound.
    pub fn start() -> Result<Self, String> {
        Self::with_options(StubOptions::default())
    }

    /// Starts a stub with the given options.
    ///
    /// # Errors
    ///
    /// Returns an error when the listener cannot be bound.
    pub fn with_options(options: StubOptions) -> Result<Self, String> {
        let server = Server::http("127.0.0.1:0").map_err(|err| format!("stub bind failed: {err}"))?;
        let addr: SocketAddr = server
            .server_addr()
            .to_ip()
            .ok_or_else(|| "stub bound to a non-ip address".to_string())?;
        let base_url = format!("http://{addr}");
        let server = Arc::new(server);
        let state = Arc::new(Mutex::new(CloudState::default()));

        let worker = {
            let server = Arc::clone(&server);
            let state = Arc::clone(&state);
            let base_url = base_url.clone();
            thread::spawn(move || {
                while let Ok(request) = server.recv() {
                    serve(request, &state, &options, &base_url);
                }
            })
        };
        Ok(Self {
            server,
            base_url,
            state,
            worker: Some(worker),
        })
    }

    /// Returns the base URL, for example `http://127.0.0.1:41234`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Renders a config pointing every service at this stub.
    ///
    /// Polling is tightened so server transitions finish in milliseconds.
    #[must_use]
    pub fn config_toml(&self) -> String {
        let base = &self.base_url;
        format!(
            r#"
[http]
timeout_secs = 5

[auth]
token = "{TENANT_TOKEN}"
project_id = "{PROJECT_ID}"

[key_manager]
endpoint = "{base}"

[compute]
endpoint = "{base}/compute"
admin_token = "{ADMIN_TOKEN}"
image_ref = "cirros"
flavor_ref = "{FLAVOR_ID}"
hypervisor = "kvm"
build_timeout_secs = 5
poll_interval_ms = 5

[stacktach]
endpoint = "{base}"
event_id = "{KNOWN_EVENT_ID}"
"#
        )
    }

    /// Parses [`StubCloud::config_toml`] into a validated config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the rendered config fails validation.
    pub fn config(&self) -> Result<RoastConfig, ConfigError> {
        RoastConfig::from_toml_str(&self.config_toml())
    }

    /// Returns resources created through the stub and not yet deleted.
    #[must_use]
    pub fn live_resources(&self) -> LiveResources {
        let state = lock(&self.state);
        LiveResources {
            secrets: state.secrets.len(),
            containers: state.containers.len(),
            keypairs: state.keypairs.len(),
            servers: state.servers.len(),
        }
    }

    /// Returns every request seen so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RequestLine> {
        lock(&self.state).requests.clone()
    }
}

impl Drop for StubCloud {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

// ============================================================================
// SECTION: Request Handling
// ============================================================================

/// Parsed request handed to the router.
struct Call {
    /// HTTP method, upper case.
    method: String,
    /// Non-empty path segments.
    segments: Vec<String>,
    /// Query parameters.
    query: BTreeMap<String, String>,
    /// `X-Auth-Token` header value.
    token: Option<String>,
    /// Parsed JSON body; `Null` when absent or malformed.
    body: Value,
}

/// Reads, routes, records, and answers one request.
fn serve(mut request: Request, state: &Mutex<CloudState>, options: &StubOptions, base_url: &str) {
    let method = request.method().to_string().to_ascii_uppercase();
    let token = request
        .headers()
        .iter()
        .find(|header| header.field.equiv("X-Auth-Token"))
        .map(|header| header.value.as_str().to_string());
    let mut raw = String::new();
    let _ = request.as_reader().read_to_string(&mut raw);
    let parsed = Url::parse(&format!("{base_url}{}", request.url()));

    let (path, status, body) = match parsed {
        Ok(url) => {
            let call = Call {
                method: method.clone(),
                segments: url
                    .path_segments()
                    .map(|segments| {
                        segments.filter(|s| !s.is_empty()).map(str::to_string).collect()
                    })
                    .unwrap_or_default(),
                query: url.query_pairs().into_owned().collect(),
                token,
                body: serde_json::from_str(&raw).unwrap_or(Value::Null),
            };
            let mut guard = lock(state);
            let (status, body) = route(&mut guard, options, base_url, &call);
            (url.path().to_string(), status, body)
        }
        Err(_) => (request.url().to_string(), 400, json!({ "title": "bad url" })),
    };

    lock(state).requests.push(RequestLine {
        method,
        path,
        status,
    });
    let text = if body.is_null() { String::new() } else { body.to_string() };
    let mut response = Response::from_string(text).with_status_code(status);
    if let Ok(header) = "Content-Type: application/json".parse::<Header>() {
        response = response.with_header(header);
    }
    let _ = request.respond(response);
}

/// Locks state, recovering from a poisoned mutex.
fn lock(state: &Mutex<CloudState>) -> MutexGuard<'_, CloudState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Dispatches a call to its handler.
fn route(state: &mut CloudState, options: &StubOptions, base: &str, call: &Call) -> (u16, Value) {
    match call.token.as_deref() {
        Some(TENANT_TOKEN | ADMIN_TOKEN) => {}
        _ => return (401, json!({ "title": "unauthorized" })),
    }
    let segments = call.segments.iter().map(String::as_str).collect::<Vec<_>>();
    match (call.method.as_str(), segments.as_slice()) {
        ("POST", ["v1", "secrets"]) => {
            let id = state.next_id();
            state.secrets.insert(id.clone());
            (201, json!({ "secret_ref": format!("{base}/v1/secrets/{id}") }))
        }
        ("DELETE", ["v1", "secrets", id]) => removed(state.secrets.remove(*id)),
        ("POST", ["v1", "containers"]) => create_container(state, options, base, &call.body),
        ("GET", ["v1", "containers"]) => list_containers(state, base, &call.query),
        ("GET", ["v1", "containers", id]) => state
            .containers
            .get(*id)
            .map_or_else(not_found, |container| (200, container_json(base, id, container))),
        ("DELETE", ["v1", "containers", id]) => removed(state.containers.remove(*id).is_some()),
        ("POST", ["compute", "os-keypairs"]) => create_keypair(state, &call.body),
        ("DELETE", ["compute", "os-keypairs", name]) => {
            if state.keypairs.remove(*name) { (202, Value::Null) } else { not_found() }
        }
        ("POST", ["compute", "servers"]) => create_server(state, options, &call.body),
        ("GET", ["compute", "servers", id]) => match state.servers.get_mut(*id) {
            Some(server) => {
                server.advance();
                let body = json!({ "id": id, "name": server.name, "status": server.status });
                (200, json!({ "server": body }))
            }
            None => not_found(),
        },
        ("DELETE", ["compute", "servers", id]) => removed(state.servers.remove(*id).is_some()),
        ("GET", ["compute", "flavors", id]) if *id == FLAVOR_ID => (
            200,
            json!({
                "flavor": {
                    "id": FLAVOR_ID,
                    "name": "m1.small",
                    "ram": 2048,
                    "vcpus": 1,
                    "disk": 20
                }
            }),
        ),
        ("POST", ["compute", "servers", id, "action"]) => {
            if call.token.as_deref() != Some(ADMIN_TOKEN) {
                return (403, json!({ "title": "admin token required" }));
            }
            server_action(state, options, id, &call.body)
        }
        ("GET", ["stacky", rest @ ..]) => stacky(options, rest, &call.query),
        _ => not_found(),
    }
}

/// 404 body.
fn not_found() -> (u16, Value) {
    (404, json!({ "title": "not found" }))
}

/// 204 when something was removed, else 404.
fn removed(found: bool) -> (u16, Value) {
    if found { (204, Value::Null) } else { not_found() }
}

// ============================================================================
// SECTION: Key Manager
// ============================================================================

/// Renders a stored container.
fn container_json(base: &str, id: &str, container: &StoredContainer) -> Value {
    json!({
        "name": container.name,
        "container_ref": format!("{base}/v1/containers/{id}"),
        "type": container.container_type,
        "status": "ACTIVE",
        "secret_refs": container.secret_refs,
    })
}

/// `POST /v1/containers`.
fn create_container(
    state: &mut CloudState,
    options: &StubOptions,
    base: &str,
    body: &Value,
) -> (u16, Value) {
    if options.container_create_status != 201 {
        return (options.container_create_status, json!({ "title": "container create refused" }));
    }
    let Some(container_type) = body.get("type").and_then(Value::as_str) else {
        return (400, json!({ "title": "container type is required" }));
    };
    let secret_refs = body.get("secret_refs").cloned().unwrap_or_else(|| json!([]));
    let id = state.next_id();
    state.containers.insert(id.clone(), StoredContainer {
        name: body.get("name").and_then(Value::as_str).map(str::to_string),
        container_type: container_type.to_string(),
        secret_refs,
    });
    (201, json!({ "container_ref": format!("{base}/v1/containers/{id}") }))
}

/// `GET /v1/containers?limit=&offset=`.
fn list_containers(
    state: &CloudState,
    base: &str,
    query: &BTreeMap<String, String>,
) -> (u16, Value) {
    let number = |key: &str, default: usize| {
        query.get(key).and_then(|value| value.parse::<usize>().ok()).unwrap_or(default)
    };
    let limit = number("limit", DEFAULT_PAGE_LIMIT);
    let offset = number("offset", 0);
    let page = state
        .containers
        .iter()
        .skip(offset)
        .take(limit)
        .map(|(id, container)| container_json(base, id, container))
        .collect::<Vec<_>>();
    let total = state.containers.len();
    let mut body = json!({ "containers": page, "total": total });
    if offset + limit < total {
        let next = offset + limit;
        body["next"] = json!(format!("{base}/v1/containers?limit={limit}&offset={next}"));
    }
    (200, body)
}

// ============================================================================
// SECTION: Compute
// ============================================================================

/// `POST /compute/os-keypairs`.
fn create_keypair(state: &mut CloudState, body: &Value) -> (u16, Value) {
    let Some(name) = body.pointer("/keypair/name").and_then(Value::as_str) else {
        return (400, json!({ "title": "keypair name is required" }));
    };
    if !state.keypairs.insert(name.to_string()) {
        return (409, json!({ "title": "keypair exists" }));
    }
    let keypair = json!({
        "name": name,
        "public_key": "ssh-rsa AAAAstub",
        "fingerprint": "00:11:22"
    });
    (200, json!({ "keypair": keypair }))
}

/// `POST /compute/servers`.
fn create_server(state: &mut CloudState, options: &StubOptions, body: &Value) -> (u16, Value) {
    let Some(name) = body.pointer("/server/name").and_then(Value::as_str) else {
        return (400, json!({ "title": "server name is required" }));
    };
    if let Some(key) = body.pointer("/server/key_name").and_then(Value::as_str)
        && !state.keypairs.contains(key)
    {
        return (400, json!({ "title": "unknown keypair" }));
    }
    let id = state.next_id();
    let admin_pass = format!("create-{id}");
    let target = if options.server_build_fails { "ERROR" } else { "ACTIVE" };
    let mut server = StoredServer {
        name: name.to_string(),
        status: "BUILD",
        pending: None,
        admin_pass: admin_pass.clone(),
    };
    server.begin("BUILD", target, options.transition_polls);
    state.servers.insert(id.clone(), server);
    (202, json!({ "server": { "id": id, "adminPass": admin_pass } }))
}

/// `POST /compute/servers/{id}/action`.
fn server_action(
    state: &mut CloudState,
    options: &StubOptions,
    id: &str,
    body: &Value,
) -> (u16, Value) {
    let Some(server) = state.servers.get_mut(id) else {
        return not_found();
    };
    if body.get("rescue").is_some() {
        if server.status != "ACTIVE" {
            let title = format!("cannot rescue a server in {}", server.status);
            return (409, json!({ "title": title }));
        }
        server.begin("ACTIVE", "RESCUE", options.transition_polls);
        let password = if options.rescue_keeps_password {
            server.admin_pass.clone()
        } else {
            format!("rescue-{id}")
        };
        return (200, json!({ "adminPass": password }));
    }
    if body.get("unrescue").is_some() {
        if server.status != "RESCUE" {
            let title = format!("cannot unrescue a server in {}", server.status);
            return (409, json!({ "title": title }));
        }
        server.begin("RESCUE", "ACTIVE", options.transition_polls);
        return (202, Value::Null);
    }
    (400, json!({ "title": "unknown action" }))
}

// ============================================================================
// SECTION: StackTach
// ============================================================================

/// `GET /stacky/...` tables: a header row followed by data rows.
fn stacky(options: &StubOptions, rest: &[&str], query: &BTreeMap<String, String>) -> (u16, Value) {
    let (header, rows) = match rest {
        ["events"] => (
            json!(["Event Name"]),
            json!([["compute.instance.create.start"], ["compute.instance.reboot.end"]]),
        ),
        ["hosts"] => (json!(["Host Name"]), json!([["compute-01"], ["compute-02"]])),
        ["deployments"] => (json!(["#", "Name"]), json!([[1, "east"], [2, "west"]])),
        ["timings", "summary"] => (
            json!(["Event", "N", "Min", "Max", "Avg"]),
            json!([["compute.instance.reboot", 4, "0d 00:00:03", "0d 00:00:09", "0d 00:00:05"]]),
        ),
        ["kpi"] => (
            json!(["Event", "Time", "UUID", "Deployment"]),
            json!([["compute.instance.create", "0d 00:01:10", "6f1c-uuid", "east"]]),
        ),
        ["timings"] => {
            let name = query.get("name").cloned().unwrap_or_default();
            (json!([name.clone(), "Time"]), json!([[name, "0d 00:00:04"]]))
        }
        ["reports"] => (
            json!(["Id", "Start", "End", "Created", "Name", "Version"]),
            json!([[
                1,
                "2014-07-01 00:00:00",
                "2014-07-02 00:00:00",
                "2014-07-02 00:05:00",
                "summary for 2014-07-01",
                4
            ]]),
        ),
        ["show", id] => {
            if *id != KNOWN_EVENT_ID || query.get("service").is_none() {
                return not_found();
            }
            let service = query.get("service").cloned().unwrap_or_default();
            (
                json!(["Key", "Value"]),
                json!([
                    ["#", id],
                    ["Category", "monitor.info"],
                    ["Publisher", "compute.compute-01"],
                    ["State", "active"],
                    ["Event", "compute.instance.update"],
                    ["Service", service],
                    ["Host", "compute-01"],
                    ["UUID", "6f1c-uuid"],
                    ["Req ID", "req-1"],
                    ["When", "2014-07-01 12:00:00"],
                    ["Deployment", "east"],
                    ["Actual Event", "{\"event_type\": \"compute.instance.update\"}"],
                ]),
            )
        }
        _ => return not_found(),
    };
    let mut table = vec![header];
    if !options.stacktach_empty
        && let Value::Array(rows) = rows
    {
        table.extend(rows);
    }
    (200, Value::Array(table))
}
