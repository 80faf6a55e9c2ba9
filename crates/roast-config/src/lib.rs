// crates/roast-config/src/lib.rs
// ============================================================================
// Module: Cloud Roast Config Library
// Description: Configuration model and loader for smoke runs.
// Purpose: Provide one explicit, validated configuration value per run.
// Dependencies: serde, toml, url
// ============================================================================

//! ## Overview
//! `roast-config` loads `roast.toml`, applies environment overrides, and
//! validates the result before any fixture sees it. The configuration is a
//! plain value passed into fixture setup; there is no global state.

pub mod config;
pub mod env;

pub use config::AuthConfig;
pub use config::ComputeConfig;
pub use config::ConfigError;
pub use config::HttpConfig;
pub use config::Hypervisor;
pub use config::IssuesConfig;
pub use config::KeyManagerConfig;
pub use config::ReportConfig;
pub use config::RoastConfig;
pub use config::Secret;
pub use config::StackTachConfig;
pub use env::EnvOverrides;
pub use env::RoastEnv;
