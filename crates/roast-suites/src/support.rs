// crates/roast-suites/src/support.rs
// ============================================================================
// Module: Suite Support
// Description: Client construction shared by fixtures.
// Dependencies: roast-clients, roast-config
// ============================================================================

//! Fixture helpers: client construction and missing-section messages.

use roast_clients::ClientError;
use roast_clients::Credentials;
use roast_clients::RestClient;
use roast_config::RoastConfig;
use roast_config::Secret;
use roast_core::SetupFailure;

/// Builds a transport for `endpoint` using the run's shared credentials,
/// replacing the token when `token` is set.
pub fn client_for(
    config: &RoastConfig,
    endpoint: &str,
    token: Option<&Secret>,
) -> Result<RestClient, ClientError> {
    let credentials = Credentials::from_auth(&config.auth).with_token_override(token);
    RestClient::new(endpoint, &config.http, &credentials)
}

/// Message used when a class needs a section the config does not define.
pub fn missing_section(section: &str) -> String {
    format!("[{section}] is not configured")
}

/// Returns the section or a setup failure naming it.
pub fn require_section<'a, T>(section: Option<&'a T>, name: &str) -> Result<&'a T, SetupFailure> {
    section.ok_or_else(|| SetupFailure::new(missing_section(name)))
}
