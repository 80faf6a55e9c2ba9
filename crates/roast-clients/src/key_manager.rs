// crates/roast-clients/src/key_manager.rs
// ============================================================================
// Module: Key Manager Client
// Description: Secrets and containers API client plus creation behaviors.
// Purpose: Create, read, list, and delete key manager resources in tests.
// Dependencies: serde, roast-core
// ============================================================================

//! ## Overview
//! [`KeyManagerClient`] maps the secrets and containers endpoints one call
//! per operation. [`ContainerBehaviors`] composes those calls into the
//! multi-step setups used by suites; every resource a behavior creates is
//! registered for deletion in the caller's [`ResourceRegistry`] as soon as
//! its reference is known.

// ============================================================================
// SECTION: Imports
// ============================================================================

use roast_core::ResourceRegistry;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::datagen::rand_name;
use crate::error::ClientError;
use crate::rest::ApiResponse;
use crate::rest::RestClient;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Generic container type.
pub const GENERIC_CONTAINER: &str = "generic";
/// RSA container type.
pub const RSA_CONTAINER: &str = "rsa";
/// Secrets collection path.
const SECRETS_PATH: &str = "v1/secrets";
/// Containers collection path.
const CONTAINERS_PATH: &str = "v1/containers";

// ============================================================================
// SECTION: Models
// ============================================================================

/// Secret creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecretRequest {
    /// Secret name.
    pub name: String,
    /// Secret payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    /// Payload media type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_content_type: Option<String>,
    /// Payload encoding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_content_encoding: Option<String>,
    /// Key algorithm.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    /// Key size in bits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bit_length: Option<u32>,
    /// Cipher mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl SecretRequest {
    /// Builds a request with the standard AES test payload.
    #[must_use]
    pub fn standard(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: Some("dGhlIHBheWxvYWQ=".to_string()),
            payload_content_type: Some("application/octet-stream".to_string()),
            payload_content_encoding: Some("base64".to_string()),
            algorithm: Some("aes".to_string()),
            bit_length: Some(256),
            mode: Some("cbc".to_string()),
        }
    }
}

/// Reference returned when a secret is created.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SecretRef {
    /// Absolute secret URL.
    pub secret_ref: String,
}

/// Named secret reference held by a container.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContainerSecret {
    /// Role name inside the container.
    pub name: String,
    /// Absolute secret URL.
    pub secret_ref: String,
}

/// Container creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerRequest {
    /// Container name.
    pub name: String,
    /// Container type (`generic` or `rsa`).
    #[serde(rename = "type")]
    pub container_type: String,
    /// Referenced secrets.
    pub secret_refs: Vec<ContainerSecret>,
}

/// Reference returned when a container is created.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContainerRef {
    /// Absolute container URL.
    pub container_ref: String,
}

/// Container metadata.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Container {
    /// Container name.
    #[serde(default)]
    pub name: Option<String>,
    /// Absolute container URL.
    pub container_ref: String,
    /// Container type.
    #[serde(rename = "type")]
    pub container_type: String,
    /// Lifecycle status.
    #[serde(default)]
    pub status: Option<String>,
    /// Referenced secrets.
    #[serde(default)]
    pub secret_refs: Vec<ContainerSecret>,
}

/// One page of containers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContainerPage {
    /// Containers on this page.
    #[serde(default)]
    pub containers: Vec<Container>,
    /// Total containers visible to the project.
    #[serde(default)]
    pub total: Option<u64>,
    /// Next page link.
    #[serde(default)]
    pub next: Option<String>,
    /// Previous page link.
    #[serde(default)]
    pub previous: Option<String>,
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Key manager API client.
#[derive(Debug, Clone)]
pub struct KeyManagerClient {
    /// Transport bound to the key manager endpoint.
    rest: RestClient,
}

impl KeyManagerClient {
    /// Wraps a transport bound to the key manager endpoint.
    #[must_use]
    pub const fn new(rest: RestClient) -> Self {
        Self {
            rest,
        }
    }

    /// Returns the underlying transport.
    #[must_use]
    pub const fn rest(&self) -> &RestClient {
        &self.rest
    }

    /// Creates a secret.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request cannot be completed.
    pub fn create_secret(
        &self,
        request: &SecretRequest,
    ) -> Result<ApiResponse<SecretRef>, ClientError> {
        self.rest.post(SECRETS_PATH, request)
    }

    /// Deletes a secret by reference.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request cannot be completed.
    pub fn delete_secret(&self, secret_ref: &str) -> Result<ApiResponse<Value>, ClientError> {
        self.rest.delete(secret_ref)
    }

    /// Creates a container.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request cannot be completed.
    pub fn create_container(
        &self,
        request: &ContainerRequest,
    ) -> Result<ApiResponse<ContainerRef>, ClientError> {
        self.rest.post(CONTAINERS_PATH, request)
    }

    /// Fetches a container by reference.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request cannot be completed.
    pub fn get_container(
        &self,
        container_ref: &str,
    ) -> Result<ApiResponse<Container>, ClientError> {
        self.rest.get(container_ref)
    }

    /// Lists one page of containers.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request cannot be completed.
    pub fn list_containers(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<ApiResponse<ContainerPage>, ClientError> {
        let limit = limit.to_string();
        let offset = offset.to_string();
        self.rest.get_query(CONTAINERS_PATH, &[("limit", &limit), ("offset", &offset)])
    }

    /// Deletes a container by reference.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request cannot be completed.
    pub fn delete_container(&self, container_ref: &str) -> Result<ApiResponse<Value>, ClientError> {
        self.rest.delete(container_ref)
    }
}

// ============================================================================
// SECTION: Behaviors
// ============================================================================

/// Multi-step container and secret setups with cleanup registration.
#[derive(Debug, Clone)]
pub struct ContainerBehaviors {
    /// Key manager client.
    client: KeyManagerClient,
}

impl ContainerBehaviors {
    /// Creates behaviors over a client.
    #[must_use]
    pub const fn new(client: KeyManagerClient) -> Self {
        Self {
            client,
        }
    }

    /// Returns the underlying client.
    #[must_use]
    pub const fn client(&self) -> &KeyManagerClient {
        &self.client
    }

    /// Creates a standard secret and registers its deletion.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] unless the service answers 201 with a reference.
    pub fn create_secret(
        &self,
        resources: &mut ResourceRegistry,
        name: &str,
    ) -> Result<String, ClientError> {
        let created = self
            .client
            .create_secret(&SecretRequest::standard(name))?
            .require("create secret", 201)?;
        resources.add(
            format!("secret {}", created.secret_ref),
            self.client.rest().delete_cleanup(created.secret_ref.clone()),
        );
        Ok(created.secret_ref)
    }

    /// Creates `count` secrets with random names.
    ///
    /// # Errors
    ///
    /// Returns the first [`ClientError`]; secrets created before it stay
    /// registered for cleanup.
    pub fn create_n_secrets(
        &self,
        resources: &mut ResourceRegistry,
        count: usize,
    ) -> Result<Vec<String>, ClientError> {
        let mut refs = Vec::with_capacity(count);
        for _ in 0 .. count {
            refs.push(self.create_secret(resources, &rand_name("secret"))?);
        }
        Ok(refs)
    }

    /// Creates a container and registers its deletion when the service
    /// returns a reference.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request cannot be completed; status
    /// checks are left to the caller.
    pub fn create_container(
        &self,
        resources: &mut ResourceRegistry,
        name: &str,
        container_type: &str,
        secret_refs: Vec<ContainerSecret>,
    ) -> Result<ApiResponse<ContainerRef>, ClientError> {
        let request = ContainerRequest {
            name: name.to_string(),
            container_type: container_type.to_string(),
            secret_refs,
        };
        let response = self.client.create_container(&request)?;
        if let Some(created) = response.entity.as_ref().filter(|_| response.is_success()) {
            resources.add(
                format!("container {}", created.container_ref),
                self.client.rest().delete_cleanup(created.container_ref.clone()),
            );
        }
        Ok(response)
    }

    /// Creates one secret and a generic container referencing it.
    ///
    /// Returns the secret reference and the container creation response.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the secret cannot be created or the
    /// container request cannot be completed.
    pub fn create_container_with_secret(
        &self,
        resources: &mut ResourceRegistry,
        name: &str,
        secret_name: &str,
    ) -> Result<(String, ApiResponse<ContainerRef>), ClientError> {
        let secret_ref = self.create_secret(resources, secret_name)?;
        let refs = vec![ContainerSecret {
            name: secret_name.to_string(),
            secret_ref: secret_ref.clone(),
        }];
        let response = self.create_container(resources, name, GENERIC_CONTAINER, refs)?;
        Ok((secret_ref, response))
    }

    /// Creates an RSA container from private key, public key, and passphrase
    /// secret references.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request cannot be completed.
    pub fn create_rsa_container(
        &self,
        resources: &mut ResourceRegistry,
        name: &str,
        private_key: &str,
        public_key: &str,
        passphrase: &str,
    ) -> Result<ApiResponse<ContainerRef>, ClientError> {
        let refs = [
            ("private_key", private_key),
            ("public_key", public_key),
            ("private_key_passphrase", passphrase),
        ]
        .into_iter()
        .map(|(role, secret_ref)| ContainerSecret {
            name: role.to_string(),
            secret_ref: secret_ref.to_string(),
        })
        .collect();
        self.create_container(resources, name, RSA_CONTAINER, refs)
    }

    /// Deletes a container; its registered cleanup later finds it gone.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request cannot be completed.
    pub fn delete_container(&self, container_ref: &str) -> Result<ApiResponse<Value>, ClientError> {
        self.client.delete_container(container_ref)
    }
}
