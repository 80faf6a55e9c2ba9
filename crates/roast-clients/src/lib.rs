// crates/roast-clients/src/lib.rs
// ============================================================================
// Module: Cloud Roast Clients Library
// Description: HTTP clients and behaviors for the services under test.
// Purpose: Give fixtures and case bodies typed, bounded API access.
// Dependencies: reqwest, serde, serde_json, tracing, url
// ============================================================================

//! ## Overview
//! Each service gets a thin client mapping one method to one API call and,
//! where suites need multi-step setups, a behaviors type composing those
//! calls. Behaviors register every resource they create in a
//! [`roast_core::ResourceRegistry`] so teardown can release it.
//!
//! All calls block; timeouts and response size limits come from
//! [`roast_config::HttpConfig`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod compute;
pub mod datagen;
pub mod error;
pub mod key_manager;
pub mod rest;
pub mod stacktach;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use compute::BuildSettings;
pub use compute::ComputeClient;
pub use compute::ServerBehaviors;
pub use datagen::rand_name;
pub use error::ClientError;
pub use key_manager::ContainerBehaviors;
pub use key_manager::KeyManagerClient;
pub use rest::ApiResponse;
pub use rest::Credentials;
pub use rest::RestClient;
pub use stacktach::StackTachClient;
