// crates/roast-config/src/config.rs
// ============================================================================
// Module: Cloud Roast Configuration
// Description: Configuration loading and validation for smoke runs.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and UTF-8
//! limits, then environment overrides are applied and the whole value is
//! validated. Each service section is optional; suites whose section is
//! missing report their cases as unsupported instead of failing.
//!
//! Secrets (`auth.token`, `compute.admin_token`) are wrapped in [`Secret`] and
//! never appear in `Debug` output.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::env::EnvOverrides;
use crate::env::RoastEnv;
use crate::env::read_env_nonempty;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "roast.toml";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 256 * 1024;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Upper bound for the HTTP timeout in seconds.
const MAX_TIMEOUT_SECS: u64 = 3600;
/// Default response body limit in bytes.
const DEFAULT_MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;
/// Lower bound for the response body limit in bytes.
const MIN_RESPONSE_BYTES: usize = 1024;
/// Upper bound for the response body limit in bytes.
const MAX_RESPONSE_BYTES: usize = 64 * 1024 * 1024;
/// Default server build timeout in seconds.
const DEFAULT_BUILD_TIMEOUT_SECS: u64 = 600;
/// Default status poll interval in milliseconds.
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
/// Default StackTach service name.
const DEFAULT_STACKTACH_SERVICE: &str = "nova";
/// Default event name used for timing lookups.
const DEFAULT_TIMING_EVENT: &str = "compute.instance.reboot";

// ============================================================================
// SECTION: Secret
// ============================================================================

/// Credential value redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Wraps a credential.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw credential for use in request headers.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Complete configuration for one smoke run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoastConfig {
    /// HTTP transport settings.
    #[serde(default)]
    pub http: HttpConfig,
    /// Credentials shared by all services.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Key manager service settings.
    #[serde(default)]
    pub key_manager: Option<KeyManagerConfig>,
    /// Compute service settings.
    #[serde(default)]
    pub compute: Option<ComputeConfig>,
    /// StackTach service settings.
    #[serde(default)]
    pub stacktach: Option<StackTachConfig>,
    /// Known-issue resolution settings.
    #[serde(default)]
    pub issues: IssuesConfig,
    /// Report artifact settings.
    #[serde(default)]
    pub report: ReportConfig,
}

impl RoastConfig {
    /// Loads configuration from disk, applies environment overrides, and
    /// validates the result.
    ///
    /// Path resolution: explicit `path`, then `ROAST_CONFIG`, then
    /// `./roast.toml`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading, overriding, or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        let bytes = fs::read(&resolved)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", resolved.display())))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        let overrides = EnvOverrides::load().map_err(ConfigError::Invalid)?;
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates configuration from TOML text without consulting
    /// the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        if content.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Applies environment overrides on top of file values.
    pub fn apply_overrides(&mut self, overrides: EnvOverrides) {
        if let Some(token) = overrides.auth_token {
            self.auth.token = Some(token);
        }
        if let Some(timeout) = overrides.timeout {
            self.http.timeout_secs = timeout.as_secs();
        }
        if let Some(dir) = overrides.report_dir {
            self.report.dir = Some(dir);
        }
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.http.validate()?;
        self.auth.validate()?;
        if let Some(key_manager) = &self.key_manager {
            key_manager.validate()?;
        }
        if let Some(compute) = &self.compute {
            compute.validate()?;
        }
        if let Some(stacktach) = &self.stacktach {
            stacktach.validate()?;
        }
        self.issues.validate()?;
        self.report.validate()
    }
}

// ============================================================================
// SECTION: HTTP
// ============================================================================

/// HTTP transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Maximum accepted response body size in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }
}

impl HttpConfig {
    /// Returns the request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validates transport limits.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 || self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::Invalid(format!(
                "http.timeout_secs must be between 1 and {MAX_TIMEOUT_SECS}"
            )));
        }
        if !(MIN_RESPONSE_BYTES ..= MAX_RESPONSE_BYTES).contains(&self.max_response_bytes) {
            return Err(ConfigError::Invalid(format!(
                "http.max_response_bytes must be between {MIN_RESPONSE_BYTES} and \
                 {MAX_RESPONSE_BYTES}"
            )));
        }
        Ok(())
    }
}

/// Serde default for `http.timeout_secs`.
const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Serde default for `http.max_response_bytes`.
const fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}

// ============================================================================
// SECTION: Auth
// ============================================================================

/// Credentials shared by all service clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Token sent as `X-Auth-Token`.
    #[serde(default)]
    pub token: Option<Secret>,
    /// Project sent as `X-Project-Id`.
    #[serde(default)]
    pub project_id: Option<String>,
}

impl AuthConfig {
    /// Validates credential fields.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(token) = &self.token {
            validate_header_value("auth.token", token.expose())?;
        }
        if let Some(project) = &self.project_id {
            validate_header_value("auth.project_id", project)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Services
// ============================================================================

/// Key manager (secrets and containers) settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyManagerConfig {
    /// Base URL, for example `http://barbican:9311`.
    pub endpoint: String,
}

impl KeyManagerConfig {
    /// Validates the endpoint.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_endpoint("key_manager.endpoint", &self.endpoint)
    }
}

/// Compute hypervisor families.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hypervisor {
    /// KVM through libvirt.
    #[default]
    Kvm,
    /// QEMU through libvirt.
    Qemu,
    /// Xen server.
    XenServer,
    /// VMware vCenter.
    Vmware,
    /// Hyper-V.
    HyperV,
    /// Bare metal provisioning.
    Ironic,
    /// LXC containers through libvirt.
    LxcLibvirt,
}

impl Hypervisor {
    /// Returns the configuration spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kvm => "kvm",
            Self::Qemu => "qemu",
            Self::XenServer => "xen_server",
            Self::Vmware => "vmware",
            Self::HyperV => "hyper_v",
            Self::Ironic => "ironic",
            Self::LxcLibvirt => "lxc_libvirt",
        }
    }

    /// Returns true when servers on this hypervisor can be rescued.
    #[must_use]
    pub const fn supports_rescue(self) -> bool {
        !matches!(self, Self::Ironic | Self::LxcLibvirt)
    }
}

impl fmt::Display for Hypervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compute service settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComputeConfig {
    /// Base URL of the tenant compute API.
    pub endpoint: String,
    /// Base URL of the admin compute API; defaults to `endpoint`.
    #[serde(default)]
    pub admin_endpoint: Option<String>,
    /// Admin token; defaults to `auth.token`.
    #[serde(default)]
    pub admin_token: Option<Secret>,
    /// Image used to boot servers.
    pub image_ref: String,
    /// Flavor used to boot servers.
    pub flavor_ref: String,
    /// Hypervisor backing the deployment.
    #[serde(default)]
    pub hypervisor: Hypervisor,
    /// Maximum time to wait for a server status.
    #[serde(default = "default_build_timeout_secs")]
    pub build_timeout_secs: u64,
    /// Interval between status polls.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl ComputeConfig {
    /// Returns the admin endpoint, falling back to the tenant endpoint.
    #[must_use]
    pub fn admin_endpoint(&self) -> &str {
        self.admin_endpoint.as_deref().unwrap_or(&self.endpoint)
    }

    /// Returns the server build timeout.
    #[must_use]
    pub const fn build_timeout(&self) -> Duration {
        Duration::from_secs(self.build_timeout_secs)
    }

    /// Returns the status poll interval.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Validates endpoints, references, and timing bounds.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_endpoint("compute.endpoint", &self.endpoint)?;
        if let Some(admin) = &self.admin_endpoint {
            validate_endpoint("compute.admin_endpoint", admin)?;
        }
        if let Some(token) = &self.admin_token {
            validate_header_value("compute.admin_token", token.expose())?;
        }
        validate_identifier("compute.image_ref", &self.image_ref)?;
        validate_identifier("compute.flavor_ref", &self.flavor_ref)?;
        if self.build_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "compute.build_timeout_secs must be greater than zero".to_string(),
            ));
        }
        let build_timeout_ms = self.build_timeout_secs.saturating_mul(1000);
        if self.poll_interval_ms == 0 || self.poll_interval_ms > build_timeout_ms {
            return Err(ConfigError::Invalid(
                "compute.poll_interval_ms must be positive and below the build timeout".to_string(),
            ));
        }
        Ok(())
    }
}

/// Serde default for `compute.build_timeout_secs`.
const fn default_build_timeout_secs() -> u64 {
    DEFAULT_BUILD_TIMEOUT_SECS
}

/// Serde default for `compute.poll_interval_ms`.
const fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

/// StackTach (notification monitoring) settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StackTachConfig {
    /// Base URL of the StackTach API.
    pub endpoint: String,
    /// Event id looked up by the event detail case.
    pub event_id: String,
    /// Service name passed with event detail lookups.
    #[serde(default = "default_stacktach_service")]
    pub service: String,
    /// Event name used by the timing lookup case.
    #[serde(default = "default_timing_event")]
    pub timing_event: String,
}

impl StackTachConfig {
    /// Validates the endpoint and lookup keys.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_endpoint("stacktach.endpoint", &self.endpoint)?;
        validate_identifier("stacktach.event_id", &self.event_id)?;
        validate_identifier("stacktach.service", &self.service)?;
        validate_identifier("stacktach.timing_event", &self.timing_event)
    }
}

/// Serde default for `stacktach.service`.
fn default_stacktach_service() -> String {
    DEFAULT_STACKTACH_SERVICE.to_string()
}

/// Serde default for `stacktach.timing_event`.
fn default_timing_event() -> String {
    DEFAULT_TIMING_EVENT.to_string()
}

// ============================================================================
// SECTION: Issues and Reports
// ============================================================================

/// Known-issue resolution settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IssuesConfig {
    /// `tracker:id` references that are fixed in the target deployment.
    #[serde(default)]
    pub resolved: Vec<String>,
}

impl IssuesConfig {
    /// Validates issue references.
    fn validate(&self) -> Result<(), ConfigError> {
        for reference in &self.resolved {
            let valid = reference
                .split_once(':')
                .is_some_and(|(tracker, id)| !tracker.trim().is_empty() && !id.trim().is_empty());
            if !valid {
                return Err(ConfigError::Invalid(format!(
                    "issues.resolved entry `{reference}` must look like tracker:id"
                )));
            }
        }
        Ok(())
    }
}

/// Report artifact settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// Directory receiving `summary.json` and `summary.md`.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl ReportConfig {
    /// Validates the report directory path.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(dir) = &self.dir {
            let text = dir.to_string_lossy();
            if text.trim().is_empty() {
                return Err(ConfigError::Invalid("report.dir must be non-empty".to_string()));
            }
            if text.len() > MAX_TOTAL_PATH_LENGTH {
                return Err(ConfigError::Invalid("report.dir exceeds max length".to_string()));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Some(env_path) =
        read_env_nonempty(RoastEnv::Config.as_str()).map_err(ConfigError::Invalid)?
    {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates an http(s) base URL.
fn validate_endpoint(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|err| ConfigError::Invalid(format!("{field} is not a valid url: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid(format!("{field} must use http or https")));
    }
    if url.host_str().is_none() {
        return Err(ConfigError::Invalid(format!("{field} must include a host")));
    }
    Ok(())
}

/// Validates a non-empty identifier without whitespace.
fn validate_identifier(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(ConfigError::Invalid(format!("{field} must not contain whitespace")));
    }
    Ok(())
}

/// Validates a value destined for an HTTP header.
fn validate_header_value(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if value.chars().any(|ch| ch.is_control() || !ch.is_ascii()) {
        return Err(ConfigError::Invalid(format!("{field} must be printable ascii")));
    }
    Ok(())
}
