// crates/roast-suites/src/containers.rs
// ============================================================================
// Module: Containers Suite
// Description: Positive-path checks for key manager containers.
// Purpose: Create, fetch, list, and delete generic and RSA containers.
// Dependencies: roast-clients, roast-core
// ============================================================================

//! ## Overview
//! Every case creates its own secrets and containers through
//! [`ContainerBehaviors`], which registers them in the case registry; the
//! lifecycle manager deletes them after the case finishes. The fixture holds
//! only the client.
//!
//! The three creation cases are blocked on launchpad issue 1344365 and are
//! skipped unless the issue is listed as resolved.

// ============================================================================
// SECTION: Imports
// ============================================================================

use roast_clients::ApiResponse;
use roast_clients::ContainerBehaviors;
use roast_clients::KeyManagerClient;
use roast_clients::key_manager::ContainerRef;
use roast_clients::key_manager::GENERIC_CONTAINER;
use roast_clients::key_manager::RSA_CONTAINER;
use roast_config::RoastConfig;
use roast_core::CaseContext;
use roast_core::CaseFailure;
use roast_core::CaseResult;
use roast_core::Expect;
use roast_core::Fixture;
use roast_core::ResourceRegistry;
use roast_core::SetupFailure;
use roast_core::TestCase;
use roast_core::TestClass;

use crate::support::client_for;
use crate::support::missing_section;
use crate::support::require_section;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Registered class name.
pub const CLASS_NAME: &str = "containers";
/// Containers created before listing.
const LIST_CREATE_COUNT: usize = 11;
/// Page size requested when listing.
const LIST_LIMIT: usize = 10;
/// Open issue blocking container creation checks.
const CREATE_ISSUE: (&str, &str) = ("launchpad", "1344365");
/// Secret roles of an RSA container.
const RSA_ROLES: [&str; 3] = ["private_key", "public_key", "private_key_passphrase"];

// ============================================================================
// SECTION: Fixture
// ============================================================================

/// Key manager clients shared by the containers class.
#[derive(Debug)]
pub struct ContainerFixture {
    /// Container and secret behaviors.
    behaviors: ContainerBehaviors,
}

impl ContainerFixture {
    /// Returns the raw client.
    fn client(&self) -> &KeyManagerClient {
        self.behaviors.client()
    }
}

impl Fixture for ContainerFixture {
    type Config = RoastConfig;

    fn set_up(
        config: &RoastConfig,
        _resources: &mut ResourceRegistry,
    ) -> Result<Self, SetupFailure> {
        let section = require_section(config.key_manager.as_ref(), "key_manager")?;
        let rest = client_for(config, &section.endpoint, None)?;
        Ok(Self {
            behaviors: ContainerBehaviors::new(KeyManagerClient::new(rest)),
        })
    }
}

// ============================================================================
// SECTION: Class
// ============================================================================

/// Builds the containers class.
#[must_use]
pub fn class() -> TestClass<ContainerFixture> {
    let (tracker, issue) = CREATE_ISSUE;
    TestClass::new(CLASS_NAME)
        .unsupported_when(|config: &RoastConfig| {
            config.key_manager.is_none().then(|| missing_section("key_manager"))
        })
        .case(
            TestCase::new("create_empty_generic_container", create_empty_generic_container)
                .tag("type", "positive")
                .skip_open_issue(tracker, issue)
                .summary("Creates a generic container with no secret refs."),
        )
        .case(
            TestCase::new("create_generic_container", create_generic_container)
                .tag("type", "positive")
                .skip_open_issue(tracker, issue)
                .summary("Creates a generic container with one secret ref."),
        )
        .case(
            TestCase::new("create_rsa_container", create_rsa_container)
                .tag("type", "positive")
                .skip_open_issue(tracker, issue)
                .summary("Creates an RSA container from key and passphrase secrets."),
        )
        .case(
            TestCase::new("get_generic_container", get_generic_container)
                .tag("type", "positive")
                .summary("Fetches a generic container holding one secret."),
        )
        .case(
            TestCase::new("get_rsa_container", get_rsa_container)
                .tag("type", "positive")
                .summary("Fetches an RSA container and its three secret refs."),
        )
        .case(
            TestCase::new("list_containers", list_containers)
                .tag("type", "positive")
                .summary("Lists containers with a page limit."),
        )
        .case(
            TestCase::new("delete_container", delete_container)
                .tag("type", "positive")
                .summary("Deletes a container holding one secret."),
        )
}

// ============================================================================
// SECTION: Cases
// ============================================================================

/// Creates an empty generic container and checks it round-trips.
fn create_empty_generic_container(fixture: &ContainerFixture, ctx: &mut CaseContext) -> CaseResult {
    let response = fixture.behaviors.create_container(
        ctx.resources(),
        "empty_container",
        GENERIC_CONTAINER,
        Vec::new(),
    )?;
    let container_ref = check_created(&response)?;
    let fetched = fixture.client().get_container(&container_ref)?;
    let expect = Expect::on(&fetched.exchange);
    expect.status(200)?;
    let container = expect.present("container entity", fetched.entity.as_ref())?;
    expect.equals("container type", GENERIC_CONTAINER, container.container_type.as_str())?;
    expect.len_eq("secret refs", 0, &container.secret_refs)?;
    Ok(())
}

/// Creates a generic container referencing one secret.
fn create_generic_container(fixture: &ContainerFixture, ctx: &mut CaseContext) -> CaseResult {
    let (_, response) =
        fixture.behaviors.create_container_with_secret(ctx.resources(), "container", "secret")?;
    check_created(&response)?;
    Ok(())
}

/// Creates an RSA container from three fresh secrets.
fn create_rsa_container(fixture: &ContainerFixture, ctx: &mut CaseContext) -> CaseResult {
    let response = rsa_container_from_new_secrets(fixture, ctx)?.1;
    check_created(&response)?;
    Ok(())
}

/// Fetches a generic container and checks its fields and secret ref.
fn get_generic_container(fixture: &ContainerFixture, ctx: &mut CaseContext) -> CaseResult {
    let (secret_ref, created) = fixture.behaviors.create_container_with_secret(
        ctx.resources(),
        "test_container",
        "test_secret",
    )?;
    let container_ref = created.require("create container", 201)?.container_ref;

    let fetched = fixture.client().get_container(&container_ref)?;
    let expect = Expect::on(&fetched.exchange);
    expect.status(200)?;
    let container = expect.present("container entity", fetched.entity.as_ref())?;
    expect.equals("name", "test_container", container.name.as_deref().unwrap_or_default())?;
    expect.equals("container ref", container_ref.as_str(), container.container_ref.as_str())?;
    expect.equals("container type", GENERIC_CONTAINER, container.container_type.as_str())?;

    expect.len_eq("secret refs", 1, &container.secret_refs)?;
    let returned = expect.present("secret ref", container.secret_refs.first())?;
    expect.equals("secret name", "test_secret", returned.name.as_str())?;
    expect.equals("secret ref", secret_ref.as_str(), returned.secret_ref.as_str())?;
    Ok(())
}

/// Fetches an RSA container and checks its three secret refs.
fn get_rsa_container(fixture: &ContainerFixture, ctx: &mut CaseContext) -> CaseResult {
    let (secret_refs, created) = rsa_container_from_new_secrets(fixture, ctx)?;
    let container_ref = created.require("create container", 201)?.container_ref;

    let fetched = fixture.client().get_container(&container_ref)?;
    let expect = Expect::on(&fetched.exchange);
    expect.status(200)?;
    let container = expect.present("container entity", fetched.entity.as_ref())?;
    expect.equals("name", "rsa_container", container.name.as_deref().unwrap_or_default())?;
    expect.equals("container ref", container_ref.as_str(), container.container_ref.as_str())?;
    expect.equals("container type", RSA_CONTAINER, container.container_type.as_str())?;

    expect.len_eq("secret refs", RSA_ROLES.len(), &container.secret_refs)?;
    let returned_refs =
        container.secret_refs.iter().map(|secret| secret.secret_ref.clone()).collect::<Vec<_>>();
    expect.same_members("secret ref urls", &secret_refs, &returned_refs)?;
    let names = container.secret_refs.iter().map(|secret| secret.name.clone()).collect::<Vec<_>>();
    for role in RSA_ROLES {
        expect.contains("secret ref names", &names, role)?;
    }
    Ok(())
}

/// Creates more containers than one page holds and lists a single page.
fn list_containers(fixture: &ContainerFixture, ctx: &mut CaseContext) -> CaseResult {
    for index in 0 .. LIST_CREATE_COUNT {
        fixture.behaviors.create_container(
            ctx.resources(),
            &format!("container{index}"),
            GENERIC_CONTAINER,
            Vec::new(),
        )?;
    }
    let response = fixture.client().list_containers(LIST_LIMIT, 0)?;
    let expect = Expect::on(&response.exchange);
    expect.status(200)?;
    let page = expect.present("container page", response.entity.as_ref())?;
    expect.len_eq("containers", LIST_LIMIT, &page.containers)?;
    Ok(())
}

/// Deletes a freshly created container.
fn delete_container(fixture: &ContainerFixture, ctx: &mut CaseContext) -> CaseResult {
    let (_, created) = fixture.behaviors.create_container_with_secret(
        ctx.resources(),
        "container",
        "secret",
    )?;
    let container_ref = created.require("create container", 201)?.container_ref;
    let deleted = fixture.behaviors.delete_container(&container_ref)?;
    Expect::on(&deleted.exchange).status(204)?;
    Ok(())
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Checks a creation response and returns the new container reference.
fn check_created(response: &ApiResponse<ContainerRef>) -> Result<String, CaseFailure> {
    let expect = Expect::on(&response.exchange);
    expect.status(201)?;
    let created = expect.present("container ref", response.entity.as_ref())?;
    expect.holds(
        "container ref",
        !created.container_ref.is_empty(),
        "creation must return a container reference",
    )?;
    Ok(created.container_ref.clone())
}

/// Creates three secrets and an RSA container over them.
fn rsa_container_from_new_secrets(
    fixture: &ContainerFixture,
    ctx: &mut CaseContext,
) -> Result<(Vec<String>, ApiResponse<ContainerRef>), CaseFailure> {
    let secret_refs = fixture.behaviors.create_n_secrets(ctx.resources(), RSA_ROLES.len())?;
    let [private_key, public_key, passphrase] = secret_refs.as_slice() else {
        return Err(CaseFailure::error("secret creation returned the wrong number of refs"));
    };
    let response = fixture.behaviors.create_rsa_container(
        ctx.resources(),
        "rsa_container",
        private_key,
        public_key,
        passphrase,
    )?;
    Ok((secret_refs, response))
}
