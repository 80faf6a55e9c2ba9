// crates/roast-suites/src/rescue.rs
// ============================================================================
// Module: Rescue Server Suite
// Description: Admin rescue and unrescue of an active server.
// Purpose: Verify the admin rescue round trip on supported hypervisors.
// Dependencies: roast-clients, roast-config, roast-core, tracing
// ============================================================================

//! ## Overview
//! Class setup creates a keypair, boots a server with it, and fetches the
//! configured flavor. Both the keypair and the server are registered for
//! deletion in the class registry before anything that can fail afterwards.
//!
//! Bare metal and LXC deployments cannot rescue servers, so the class is
//! reported unsupported there without booting anything.

// ============================================================================
// SECTION: Imports
// ============================================================================

use roast_clients::BuildSettings;
use roast_clients::ComputeClient;
use roast_clients::ServerBehaviors;
use roast_clients::compute::Flavor;
use roast_clients::compute::Keypair;
use roast_clients::compute::STATUS_ACTIVE;
use roast_clients::compute::STATUS_RESCUE;
use roast_clients::compute::Server;
use roast_clients::rand_name;
use roast_config::RoastConfig;
use roast_core::CaseContext;
use roast_core::CaseResult;
use roast_core::Expect;
use roast_core::Fixture;
use roast_core::ResourceRegistry;
use roast_core::SetupFailure;
use roast_core::TestCase;
use roast_core::TestClass;
use tracing::info;

use crate::support::client_for;
use crate::support::missing_section;
use crate::support::require_section;

/// Registered class name.
pub const CLASS_NAME: &str = "rescue_server_as_admin";

// ============================================================================
// SECTION: Fixture
// ============================================================================

/// Active server and its prerequisites.
#[derive(Debug)]
pub struct RescueFixture {
    /// Server behaviors over tenant and admin transports.
    servers: ServerBehaviors,
    /// Keypair injected into the server.
    key: Keypair,
    /// Server booted during setup.
    server: Server,
    /// Flavor the server was booted with.
    flavor: Flavor,
}

impl RescueFixture {
    /// Returns the compute client.
    fn compute(&self) -> &ComputeClient {
        self.servers.client()
    }
}

impl Fixture for RescueFixture {
    type Config = RoastConfig;

    fn set_up(
        config: &RoastConfig,
        resources: &mut ResourceRegistry,
    ) -> Result<Self, SetupFailure> {
        let section = require_section(config.compute.as_ref(), "compute")?;
        let tenant = client_for(config, &section.endpoint, None)?;
        let admin = client_for(config, section.admin_endpoint(), section.admin_token.as_ref())?;
        let client = ComputeClient::new(tenant, admin);

        let key = client.create_keypair(&rand_name("key"))?.require("create keypair", 200)?;
        resources.add(format!("keypair {}", key.name), client.keypair_cleanup(&key.name));

        let servers = ServerBehaviors::new(client, BuildSettings {
            image_ref: section.image_ref.clone(),
            flavor_ref: section.flavor_ref.clone(),
            build_timeout: section.build_timeout(),
            poll_interval: section.poll_interval(),
        });
        let server = servers.create_active_server(resources, Some(&key.name))?;
        let flavor =
            servers.client().get_flavor(&section.flavor_ref)?.require("get flavor", 200)?;
        info!(server = %server.id, flavor = %flavor.id, "rescue fixture ready");
        Ok(Self {
            servers,
            key,
            server,
            flavor,
        })
    }
}

// ============================================================================
// SECTION: Class
// ============================================================================

/// Builds the rescue class.
#[must_use]
pub fn class() -> TestClass<RescueFixture> {
    TestClass::new(CLASS_NAME)
        .unsupported_when(|config: &RoastConfig| match &config.compute {
            None => Some(missing_section("compute")),
            Some(compute) if !compute.hypervisor.supports_rescue() => Some(format!(
                "rescue server is not supported on the {} hypervisor",
                compute.hypervisor
            )),
            Some(_) => None,
        })
        .case(
            TestCase::new("rescue_and_unrescue_server_as_admin", rescue_and_unrescue)
                .tag("type", "smoke")
                .tag("net", "yes")
                .summary("Rescues the fixture server as admin, then unrescues it."),
        )
}

// ============================================================================
// SECTION: Cases
// ============================================================================

/// Rescues the server, waits for `RESCUE`, unrescues, and waits for `ACTIVE`.
fn rescue_and_unrescue(fixture: &RescueFixture, ctx: &mut CaseContext) -> CaseResult {
    let server_id = fixture.server.id.as_str();
    ctx.note(format!("server {server_id} flavor {} key {}", fixture.flavor.id, fixture.key.name));
    let rescued = fixture.compute().rescue(server_id)?;
    let expect = Expect::on(&rescued.exchange);
    expect.status(200)?;
    let rescue_pass = rescued.entity.as_ref().and_then(|result| result.admin_pass.as_deref());
    expect.holds(
        "admin password",
        rescue_pass.is_some() && rescue_pass != fixture.server.admin_pass.as_deref(),
        "the password did not change after rescue",
    )?;
    fixture.servers.wait_for_server_status(server_id, STATUS_RESCUE)?;

    let unrescued = fixture.compute().unrescue(server_id)?;
    Expect::on(&unrescued.exchange).status(202)?;
    fixture.servers.wait_for_server_status(server_id, STATUS_ACTIVE)?;
    Ok(())
}
