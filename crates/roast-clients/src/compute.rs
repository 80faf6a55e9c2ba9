// crates/roast-clients/src/compute.rs
// ============================================================================
// Module: Compute Client
// Description: Servers, keypairs, flavors, and admin rescue API client.
// Purpose: Boot servers for tests and drive admin server actions.
// Dependencies: serde, tracing, roast-core
// ============================================================================

//! ## Overview
//! [`ComputeClient`] holds two transports: the tenant endpoint for servers,
//! keypairs, and flavors, and the admin endpoint for rescue actions.
//! [`ServerBehaviors`] boots servers to `ACTIVE` and polls status changes.
//!
//! Invariants:
//! - A created server is registered for deletion before any status polling,
//!   so a server that never becomes active is still cleaned up.
//! - Polling stops at the target status, the terminal `ERROR` status, or the
//!   configured build timeout, whichever comes first.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::thread;
use std::time::Duration;
use std::time::Instant;

use roast_core::CleanupOutcome;
use roast_core::ResourceRegistry;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use tracing::debug;
use tracing::info;

use crate::datagen::rand_name;
use crate::error::ClientError;
use crate::rest::ApiResponse;
use crate::rest::RestClient;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Status of a running server.
pub const STATUS_ACTIVE: &str = "ACTIVE";
/// Status of a server in rescue mode.
pub const STATUS_RESCUE: &str = "RESCUE";
/// Terminal failure status.
pub const STATUS_ERROR: &str = "ERROR";

// ============================================================================
// SECTION: Models
// ============================================================================

/// SSH keypair.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Keypair {
    /// Keypair name.
    pub name: String,
    /// Public key material.
    #[serde(default)]
    pub public_key: Option<String>,
    /// Key fingerprint.
    #[serde(default)]
    pub fingerprint: Option<String>,
}

/// Compute server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Server {
    /// Server id.
    pub id: String,
    /// Server name.
    #[serde(default)]
    pub name: Option<String>,
    /// Lifecycle status.
    #[serde(default)]
    pub status: Option<String>,
    /// Admin password (returned on create and rescue).
    #[serde(default, rename = "adminPass")]
    pub admin_pass: Option<String>,
}

/// Flavor details.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Flavor {
    /// Flavor id.
    pub id: String,
    /// Flavor name.
    #[serde(default)]
    pub name: Option<String>,
    /// Memory in MiB.
    #[serde(default)]
    pub ram: Option<u64>,
    /// Virtual CPU count.
    #[serde(default)]
    pub vcpus: Option<u32>,
    /// Root disk in GiB.
    #[serde(default)]
    pub disk: Option<u64>,
}

/// Rescue action result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RescueResult {
    /// Password for the rescue image.
    #[serde(default, rename = "adminPass")]
    pub admin_pass: Option<String>,
}

/// Server creation request body.
#[derive(Debug, Serialize)]
struct ServerRequest<'a> {
    /// Server name.
    name: &'a str,
    /// Image to boot.
    #[serde(rename = "imageRef")]
    image_ref: &'a str,
    /// Flavor to boot.
    #[serde(rename = "flavorRef")]
    flavor_ref: &'a str,
    /// Keypair injected into the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    key_name: Option<&'a str>,
}

/// `{"server": ...}` creation envelope.
#[derive(Debug, Serialize)]
struct ServerCreate<'a> {
    /// Wrapped request.
    server: ServerRequest<'a>,
}

/// `{"keypair": ...}` envelope.
#[derive(Debug, Deserialize)]
struct KeypairEnvelope {
    /// Wrapped keypair.
    keypair: Keypair,
}

/// `{"server": ...}` envelope.
#[derive(Debug, Deserialize)]
struct ServerEnvelope {
    /// Wrapped server.
    server: Server,
}

/// `{"flavor": ...}` envelope.
#[derive(Debug, Deserialize)]
struct FlavorEnvelope {
    /// Wrapped flavor.
    flavor: Flavor,
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Compute API client with tenant and admin transports.
#[derive(Debug, Clone)]
pub struct ComputeClient {
    /// Tenant endpoint transport.
    tenant: RestClient,
    /// Admin endpoint transport.
    admin: RestClient,
}

impl ComputeClient {
    /// Creates a client from tenant and admin transports.
    #[must_use]
    pub const fn new(tenant: RestClient, admin: RestClient) -> Self {
        Self {
            tenant,
            admin,
        }
    }

    /// Returns the tenant transport.
    #[must_use]
    pub const fn tenant(&self) -> &RestClient {
        &self.tenant
    }

    /// Creates a keypair.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request cannot be completed.
    pub fn create_keypair(&self, name: &str) -> Result<ApiResponse<Keypair>, ClientError> {
        let body = json!({ "keypair": { "name": name } });
        let response = self.tenant.post::<_, KeypairEnvelope>("os-keypairs", &body)?;
        Ok(response.map_entity(|envelope| Some(envelope.keypair)))
    }

    /// Deletes a keypair.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request cannot be completed.
    pub fn delete_keypair(&self, name: &str) -> Result<ApiResponse<Value>, ClientError> {
        self.tenant.delete(&format!("os-keypairs/{name}"))
    }

    /// Requests a new server.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request cannot be completed.
    pub fn create_server(
        &self,
        name: &str,
        image_ref: &str,
        flavor_ref: &str,
        key_name: Option<&str>,
    ) -> Result<ApiResponse<Server>, ClientError> {
        let request = ServerRequest {
            name,
            image_ref,
            flavor_ref,
            key_name,
        };
        let body = ServerCreate {
            server: request,
        };
        let response = self.tenant.post::<_, ServerEnvelope>("servers", &body)?;
        Ok(response.map_entity(|envelope| Some(envelope.server)))
    }

    /// Fetches a server.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request cannot be completed.
    pub fn get_server(&self, id: &str) -> Result<ApiResponse<Server>, ClientError> {
        let response = self.tenant.get::<ServerEnvelope>(&format!("servers/{id}"))?;
        Ok(response.map_entity(|envelope| Some(envelope.server)))
    }

    /// Deletes a server.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request cannot be completed.
    pub fn delete_server(&self, id: &str) -> Result<ApiResponse<Value>, ClientError> {
        self.tenant.delete(&format!("servers/{id}"))
    }

    /// Fetches flavor details.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request cannot be completed.
    pub fn get_flavor(&self, id: &str) -> Result<ApiResponse<Flavor>, ClientError> {
        let response = self.tenant.get::<FlavorEnvelope>(&format!("flavors/{id}"))?;
        Ok(response.map_entity(|envelope| Some(envelope.flavor)))
    }

    /// Puts a server into rescue mode through the admin API.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request cannot be completed.
    pub fn rescue(&self, id: &str) -> Result<ApiResponse<RescueResult>, ClientError> {
        self.admin.post(&format!("servers/{id}/action"), &json!({ "rescue": {} }))
    }

    /// Takes a server out of rescue mode through the admin API.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request cannot be completed.
    pub fn unrescue(&self, id: &str) -> Result<ApiResponse<Value>, ClientError> {
        self.admin.post(&format!("servers/{id}/action"), &json!({ "unrescue": null }))
    }

    /// Returns a cleanup callback deleting a keypair.
    #[must_use]
    pub fn keypair_cleanup(
        &self,
        name: &str,
    ) -> impl FnOnce() -> Result<CleanupOutcome, String> + 'static {
        self.tenant.delete_cleanup(format!("os-keypairs/{name}"))
    }
}

// ============================================================================
// SECTION: Behaviors
// ============================================================================

/// Boot parameters and polling policy for server behaviors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    /// Image to boot.
    pub image_ref: String,
    /// Flavor to boot.
    pub flavor_ref: String,
    /// Maximum time to wait for a status.
    pub build_timeout: Duration,
    /// Interval between polls.
    pub poll_interval: Duration,
}

/// Server lifecycle behaviors.
#[derive(Debug, Clone)]
pub struct ServerBehaviors {
    /// Compute client.
    client: ComputeClient,
    /// Boot and polling settings.
    settings: BuildSettings,
}

impl ServerBehaviors {
    /// Creates behaviors over a client.
    #[must_use]
    pub const fn new(client: ComputeClient, settings: BuildSettings) -> Self {
        Self {
            client,
            settings,
        }
    }

    /// Returns the underlying client.
    #[must_use]
    pub const fn client(&self) -> &ComputeClient {
        &self.client
    }

    /// Boots a server and waits until it is `ACTIVE`.
    ///
    /// The returned server keeps the admin password from the create response.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when creation is refused, the server errors, or
    /// the build timeout elapses. The server stays registered for cleanup.
    pub fn create_active_server(
        &self,
        resources: &mut ResourceRegistry,
        key_name: Option<&str>,
    ) -> Result<Server, ClientError> {
        let name = rand_name("server");
        let created = self
            .client
            .create_server(&name, &self.settings.image_ref, &self.settings.flavor_ref, key_name)?
            .require("create server", 202)?;
        resources.add(
            format!("server {}", created.id),
            self.client.tenant().delete_cleanup(format!("servers/{}", created.id)),
        );
        info!(server = %created.id, name = %name, "server requested");
        let mut active = self.wait_for_server_status(&created.id, STATUS_ACTIVE)?;
        if active.admin_pass.is_none() {
            active.admin_pass = created.admin_pass;
        }
        Ok(active)
    }

    /// Polls a server until it reaches `target`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ServerFailed`] on `ERROR`,
    /// [`ClientError::Timeout`] when the build timeout elapses, or the first
    /// transport error.
    pub fn wait_for_server_status(&self, id: &str, target: &str) -> Result<Server, ClientError> {
        let started = Instant::now();
        loop {
            let response = self.client.get_server(id)?;
            if let Some(server) = response.entity.filter(|_| response.status == 200) {
                let status = server.status.as_deref().unwrap_or_default();
                debug!(server = %id, status, target, "polled server status");
                if status == target {
                    return Ok(server);
                }
                if status == STATUS_ERROR {
                    return Err(ClientError::ServerFailed {
                        id: id.to_string(),
                        status: status.to_string(),
                    });
                }
            }
            let waited = started.elapsed();
            if waited >= self.settings.build_timeout {
                return Err(ClientError::Timeout {
                    what: format!("server {id} to reach {target}"),
                    waited_ms: u64::try_from(waited.as_millis()).unwrap_or(u64::MAX),
                });
            }
            thread::sleep(self.settings.poll_interval.min(self.settings.build_timeout - waited));
        }
    }
}
