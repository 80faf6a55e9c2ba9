// crates/roast-clients/src/rest.rs
// ============================================================================
// Module: REST Transport
// Description: Blocking JSON-over-HTTP client with bounded response bodies.
// Purpose: Produce typed responses that keep the full exchange context.
// Dependencies: reqwest, serde, serde_json, tracing, url
// ============================================================================

//! ## Overview
//! [`RestClient`] wraps a blocking `reqwest` client bound to one service
//! endpoint. Every call returns an [`ApiResponse`] carrying the status code,
//! reason phrase, an optional decoded entity, and the [`Exchange`] used for
//! assertion messages. Bodies are read with a hard byte limit; non-JSON or
//! mismatched bodies simply leave the entity empty.
//!
//! Request targets are either absolute URLs (resource references returned by
//! the service) or paths relative to the endpoint.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;

use reqwest::Method;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderName;
use reqwest::header::HeaderValue;
use reqwest::redirect::Policy;
use roast_config::AuthConfig;
use roast_config::HttpConfig;
use roast_config::Secret;
use roast_core::CleanupOutcome;
use roast_core::Exchange;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::ClientError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Header carrying the auth token.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";
/// Header carrying the project id.
pub const PROJECT_ID_HEADER: &str = "x-project-id";
/// JSON media type.
const JSON: &str = "application/json";
/// User agent sent with every request.
const USER_AGENT: &str = concat!("roast/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// SECTION: Responses
// ============================================================================

/// Response from one API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse<T> {
    /// HTTP status code.
    pub status: u16,
    /// Reason phrase.
    pub reason: String,
    /// Decoded entity, when the body decoded as `T`.
    pub entity: Option<T>,
    /// Exchange context for assertion messages.
    pub exchange: Exchange,
}

impl<T> ApiResponse<T> {
    /// Returns true for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Transforms the entity, keeping status and context.
    #[must_use]
    pub fn map_entity<U>(self, f: impl FnOnce(T) -> Option<U>) -> ApiResponse<U> {
        ApiResponse {
            status: self.status,
            reason: self.reason,
            entity: self.entity.and_then(f),
            exchange: self.exchange,
        }
    }

    /// Fails unless the status equals `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnexpectedStatus`] on mismatch.
    pub fn check_status(&self, operation: &str, expected: u16) -> Result<(), ClientError> {
        if self.status == expected {
            return Ok(());
        }
        Err(ClientError::UnexpectedStatus {
            operation: operation.to_string(),
            expected,
            exchange: self.exchange.clone(),
        })
    }

    /// Requires the `expected` status and a decoded entity.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnexpectedStatus`] or
    /// [`ClientError::MissingEntity`].
    pub fn require(self, operation: &str, expected: u16) -> Result<T, ClientError> {
        self.check_status(operation, expected)?;
        self.entity.ok_or_else(|| ClientError::MissingEntity {
            operation: operation.to_string(),
            exchange: self.exchange,
        })
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Credentials attached to every request.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// Sent as `X-Auth-Token`.
    pub token: Option<Secret>,
    /// Sent as `X-Project-Id`.
    pub project_id: Option<String>,
}

impl Credentials {
    /// Copies the shared credentials from configuration.
    #[must_use]
    pub fn from_auth(auth: &AuthConfig) -> Self {
        Self {
            token: auth.token.clone(),
            project_id: auth.project_id.clone(),
        }
    }

    /// Replaces the token when `token` is set.
    #[must_use]
    pub fn with_token_override(mut self, token: Option<&Secret>) -> Self {
        if let Some(token) = token {
            self.token = Some(token.clone());
        }
        self
    }
}

/// Blocking JSON client bound to one service endpoint.
///
/// # Invariants
/// - `base` always ends with `/` so relative targets extend its path.
#[derive(Debug, Clone)]
pub struct RestClient {
    /// Underlying HTTP client (cheap to clone).
    client: Client,
    /// Endpoint base URL.
    base: Url,
    /// Maximum accepted response size.
    max_response_bytes: usize,
}

impl RestClient {
    /// Builds a client for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the endpoint or credentials are invalid or
    /// the HTTP client cannot be built.
    pub fn new(
        endpoint: &str,
        http: &HttpConfig,
        credentials: &Credentials,
    ) -> Result<Self, ClientError> {
        let mut base = Url::parse(endpoint)
            .map_err(|err| ClientError::InvalidUrl(format!("{endpoint}: {err}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON));
        if let Some(token) = &credentials.token {
            insert_header(&mut headers, AUTH_TOKEN_HEADER, token.expose(), true)?;
        }
        if let Some(project) = &credentials.project_id {
            insert_header(&mut headers, PROJECT_ID_HEADER, project, false)?;
        }
        let client = Client::builder()
            .timeout(http.timeout())
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .redirect(Policy::none())
            .build()
            .map_err(|err| ClientError::Build(err.to_string()))?;
        Ok(Self {
            client,
            base,
            max_response_bytes: http.max_response_bytes,
        })
    }

    /// Returns the endpoint base URL.
    #[must_use]
    pub const fn base(&self) -> &Url {
        &self.base
    }

    /// Resolves a target against the endpoint and appends query pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] when the target cannot be resolved.
    pub fn url(&self, target: &str, query: &[(&str, &str)]) -> Result<Url, ClientError> {
        let mut url = if target.starts_with("http://") || target.starts_with("https://") {
            Url::parse(target)
        } else {
            self.base.join(target.trim_start_matches('/'))
        }
        .map_err(|err| ClientError::InvalidUrl(format!("{target}: {err}")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Issues a GET request.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request cannot be completed.
    pub fn get<T: DeserializeOwned>(&self, target: &str) -> Result<ApiResponse<T>, ClientError> {
        self.get_query(target, &[])
    }

    /// Issues a GET request with query parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request cannot be completed.
    pub fn get_query<T: DeserializeOwned>(
        &self,
        target: &str,
        query: &[(&str, &str)],
    ) -> Result<ApiResponse<T>, ClientError> {
        let url = self.url(target, query)?;
        self.send(Method::GET, url, None)
    }

    /// Issues a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when encoding or the request fails.
    pub fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        target: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, ClientError> {
        let url = self.url(target, &[])?;
        let bytes = serde_json::to_vec(body).map_err(|err| ClientError::Encode(err.to_string()))?;
        self.send(Method::POST, url, Some(bytes))
    }

    /// Issues a DELETE request.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request cannot be completed.
    pub fn delete(&self, target: &str) -> Result<ApiResponse<Value>, ClientError> {
        let url = self.url(target, &[])?;
        self.send(Method::DELETE, url, None)
    }

    /// Returns a cleanup callback deleting `target`.
    ///
    /// Any 2xx status counts as released and 404 as already gone.
    #[must_use]
    pub fn delete_cleanup(
        &self,
        target: impl Into<String>,
    ) -> impl FnOnce() -> Result<CleanupOutcome, String> + 'static {
        let client = self.clone();
        let target = target.into();
        move || {
            let response = client.delete(&target).map_err(|err| err.to_string())?;
            match response.status {
                200 ..= 299 => Ok(CleanupOutcome::Released),
                404 => Ok(CleanupOutcome::AlreadyGone),
                status => Err(format!("DELETE {target} returned {status}")),
            }
        }
    }

    /// Sends a request and decodes the bounded response.
    fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<ApiResponse<T>, ClientError> {
        let mut request = self.client.request(method.clone(), url.clone());
        if let Some(bytes) = body {
            request = request.header(CONTENT_TYPE, JSON).body(bytes);
        }
        let mut response = request
            .send()
            .map_err(|err| ClientError::Transport(format!("{method} {url}: {err}")))?;
        let status = response.status();
        let bytes = read_response_limited(&mut response, self.max_response_bytes, &url)?;
        let text = String::from_utf8_lossy(&bytes);
        let reason = status.canonical_reason().unwrap_or_default().to_string();
        debug!(
            method = %method,
            url = %url,
            status = status.as_u16(),
            bytes = bytes.len(),
            "http exchange"
        );
        let entity = if bytes.is_empty() {
            None
        } else {
            match serde_json::from_slice::<T>(&bytes) {
                Ok(entity) => Some(entity),
                Err(err) => {
                    debug!(url = %url, error = %err, "response body did not decode");
                    None
                }
            }
        };
        Ok(ApiResponse {
            status: status.as_u16(),
            reason: reason.clone(),
            entity,
            exchange: Exchange::new(method.as_str(), url.as_str(), status.as_u16(), reason, &text),
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Inserts a validated header value.
fn insert_header(
    headers: &mut HeaderMap,
    name: &'static str,
    value: &str,
    sensitive: bool,
) -> Result<(), ClientError> {
    let mut value = HeaderValue::from_str(value)
        .map_err(|_| ClientError::Build(format!("invalid value for header {name}")))?;
    value.set_sensitive(sensitive);
    headers.insert(HeaderName::from_static(name), value);
    Ok(())
}

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(
    response: &mut reqwest::blocking::Response,
    max_bytes: usize,
    url: &Url,
) -> Result<Vec<u8>, ClientError> {
    let too_large = || ClientError::ResponseTooLarge {
        url: url.to_string(),
        max_bytes,
    };
    let max_bytes_u64 = u64::try_from(max_bytes).map_err(|_| too_large())?;
    if response.content_length().is_some_and(|expected| expected > max_bytes_u64) {
        return Err(too_large());
    }
    let mut buf = Vec::new();
    response
        .take(max_bytes_u64.saturating_add(1))
        .read_to_end(&mut buf)
        .map_err(|err| {
            ClientError::Transport(format!("failed to read response from {url}: {err}"))
        })?;
    if buf.len() > max_bytes {
        return Err(too_large());
    }
    Ok(buf)
}
