// crates/roast-clients/tests/common/mod.rs
// ============================================================================
// Module: Client Test Support
// Description: Scripted local HTTP server for client tests.
// Purpose: Serve canned responses and record what clients send.
// Dependencies: tiny_http, roast-clients, roast-config
// ============================================================================

#![allow(dead_code, reason = "Not every test binary uses every helper.")]

use std::sync::Arc;
use std::sync::Mutex;
use std::thread;

use roast_clients::Credentials;
use roast_clients::RestClient;
use roast_config::HttpConfig;
use roast_config::Secret;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

/// Request captured by the scripted server.
#[derive(Debug, Clone)]
pub struct Recorded {
    /// HTTP method.
    pub method: String,
    /// Path and query.
    pub url: String,
    /// `X-Auth-Token` value, if sent.
    pub token: Option<String>,
    /// `X-Project-Id` value, if sent.
    pub project: Option<String>,
    /// Request body.
    pub body: String,
}

/// Local server answering requests from a fixed script.
pub struct Scripted {
    /// Base URL (`http://127.0.0.1:port/`).
    pub url: String,
    /// Requests seen so far.
    pub requests: Arc<Mutex<Vec<Recorded>>>,
    /// Serving thread.
    handle: Option<thread::JoinHandle<()>>,
}

impl Scripted {
    /// Starts a server answering each request with the next `(status, body)`.
    pub fn start(script: Vec<(u16, String)>) -> Self {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);
        let handle = thread::spawn(move || {
            for (status, body) in script {
                let Ok(mut request) = server.recv() else {
                    return;
                };
                let header = |name: &'static str| {
                    request
                        .headers()
                        .iter()
                        .find(|header| header.field.equiv(name))
                        .map(|header| header.value.as_str().to_string())
                };
                let token = header("x-auth-token");
                let project = header("x-project-id");
                let mut text = String::new();
                let _ = request.as_reader().read_to_string(&mut text);
                seen.lock().unwrap().push(Recorded {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    token,
                    project,
                    body: text,
                });
                let content_type =
                    Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
                let response =
                    Response::from_string(body).with_status_code(status).with_header(content_type);
                let _ = request.respond(response);
            }
        });
        Self {
            url: format!("http://{addr}/"),
            requests,
            handle: Some(handle),
        }
    }

    /// Waits for the script to finish and returns the recorded requests.
    pub fn finish(mut self) -> Vec<Recorded> {
        if let Some(handle) = self.handle.take() {
            handle.join().unwrap();
        }
        self.requests.lock().unwrap().clone()
    }
}

/// Builds a transport for `url` with a fixed token and project.
pub fn rest_client(url: &str) -> RestClient {
    let credentials = Credentials {
        token: Some(Secret::new("token-1")),
        project_id: Some("project-1".to_string()),
    };
    RestClient::new(url, &HttpConfig::default(), &credentials).unwrap()
}

/// Builds a transport with a custom response size limit.
pub fn limited_client(url: &str, max_response_bytes: usize) -> RestClient {
    let http = HttpConfig {
        max_response_bytes,
        ..HttpConfig::default()
    };
    RestClient::new(url, &http, &Credentials::default()).unwrap()
}
