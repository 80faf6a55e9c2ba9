// crates/roast-suites/src/stacktach.rs
// ============================================================================
// Module: StackTach Suite
// Description: Read-only smoke checks for the stacky reporting API.
// Purpose: Verify every listing answers 200 with populated rows.
// Dependencies: roast-clients, roast-config, roast-core
// ============================================================================

//! ## Overview
//! Each case fetches one stacky listing and checks three things: status 200,
//! a non-empty entity, and that every row carries the fields the listing
//! documents. Event detail lookups must return exactly one record.

use roast_clients::ApiResponse;
use roast_clients::StackTachClient;
use roast_config::RoastConfig;
use roast_core::AssertionFailure;
use roast_core::CaseContext;
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

/// Registered class name.
pub const CLASS_NAME: &str = "stacktach_api";

// ============================================================================
// SECTION: Fixture
// ============================================================================

/// StackTach client and lookup keys.
#[derive(Debug)]
pub struct StackTachFixture {
    /// Stacky client.
    client: StackTachClient,
    /// Event id for the detail lookup.
    event_id: String,
    /// Service passed with the detail lookup.
    service: String,
    /// Event name for the timing lookup.
    timing_event: String,
}

impl Fixture for StackTachFixture {
    type Config = RoastConfig;

    fn set_up(
        config: &RoastConfig,
        _resources: &mut ResourceRegistry,
    ) -> Result<Self, SetupFailure> {
        let section = require_section(config.stacktach.as_ref(), "stacktach")?;
        Ok(Self {
            client: StackTachClient::new(client_for(config, &section.endpoint, None)?),
            event_id: section.event_id.clone(),
            service: section.service.clone(),
            timing_event: section.timing_event.clone(),
        })
    }
}

// ============================================================================
// SECTION: Class
// ============================================================================

/// Builds the StackTach class.
#[must_use]
pub fn class() -> TestClass<StackTachFixture> {
    let cases: [(&str, fn(&StackTachFixture, &mut CaseContext) -> CaseResult, &str); 8] = [
        ("get_event_names", get_event_names, "Lists event names."),
        ("get_host_names", get_host_names, "Lists reporting hosts."),
        ("get_deployments", get_deployments, "Lists deployments."),
        ("get_timings_summary", get_timings_summary, "Lists timing statistics."),
        ("get_kpi", get_kpi, "Lists key performance indicators."),
        ("get_event_id_details", get_event_id_details, "Shows one raw event."),
        ("get_timings_for_event_name", get_timings_for_event_name, "Lists timings for one event."),
        ("get_reports", get_reports, "Lists generated reports."),
    ];
    cases.into_iter().fold(
        TestClass::new(CLASS_NAME).unsupported_when(|config: &RoastConfig| {
            config.stacktach.is_none().then(|| missing_section("stacktach"))
        }),
        |class, (name, body, summary)| {
            class.case(TestCase::new(name, body).tag("type", "smoke").summary(summary))
        },
    )
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Checks status 200 and at least one row, returning the rows.
fn listed<'r, T>(
    response: &'r ApiResponse<Vec<T>>,
    expect: &Expect<'_>,
) -> Result<&'r [T], AssertionFailure> {
    expect.status(200)?;
    let rows = expect.present("response entity", response.entity.as_ref())?;
    expect.len_at_least("response entity", 1, rows)?;
    Ok(rows.as_slice())
}

/// Checks that every named field is populated.
fn fields_present(expect: &Expect<'_>, fields: &[(&str, Option<&str>)]) -> CaseResult {
    for &(name, value) in fields {
        expect.present(name, value)?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Cases
// ============================================================================

/// `/stacky/events`.
fn get_event_names(fixture: &StackTachFixture, _ctx: &mut CaseContext) -> CaseResult {
    let response = fixture.client.get_event_names()?;
    let expect = Expect::on(&response.exchange);
    for row in listed(&response, &expect)? {
        fields_present(&expect, &[("event_name", row.event_name.as_deref())])?;
    }
    Ok(())
}

/// `/stacky/hosts`.
fn get_host_names(fixture: &StackTachFixture, _ctx: &mut CaseContext) -> CaseResult {
    let response = fixture.client.get_host_names()?;
    let expect = Expect::on(&response.exchange);
    for row in listed(&response, &expect)? {
        fields_present(&expect, &[("host_name", row.host_name.as_deref())])?;
    }
    Ok(())
}

/// `/stacky/deployments`.
fn get_deployments(fixture: &StackTachFixture, _ctx: &mut CaseContext) -> CaseResult {
    let response = fixture.client.get_deployments()?;
    let expect = Expect::on(&response.exchange);
    for row in listed(&response, &expect)? {
        fields_present(&expect, &[("id", row.id.as_deref()), ("name", row.name.as_deref())])?;
    }
    Ok(())
}

/// `/stacky/timings/summary`.
fn get_timings_summary(fixture: &StackTachFixture, _ctx: &mut CaseContext) -> CaseResult {
    let response = fixture.client.get_timings_summary()?;
    let expect = Expect::on(&response.exchange);
    for row in listed(&response, &expect)? {
        fields_present(&expect, &[
            ("event_name", row.event_name.as_deref()),
            ("count", row.count.as_deref()),
            ("minimum", row.minimum.as_deref()),
            ("maximum", row.maximum.as_deref()),
            ("average", row.average.as_deref()),
        ])?;
    }
    Ok(())
}

/// `/stacky/kpi`.
fn get_kpi(fixture: &StackTachFixture, _ctx: &mut CaseContext) -> CaseResult {
    let response = fixture.client.get_kpi()?;
    let expect = Expect::on(&response.exchange);
    for row in listed(&response, &expect)? {
        fields_present(&expect, &[
            ("event_name", row.event_name.as_deref()),
            ("timing", row.timing.as_deref()),
            ("uuid", row.uuid.as_deref()),
            ("deployment", row.deployment.as_deref()),
        ])?;
    }
    Ok(())
}

/// `/stacky/show/{id}`; exactly one record.
fn get_event_id_details(fixture: &StackTachFixture, _ctx: &mut CaseContext) -> CaseResult {
    let response = fixture.client.get_event_id_details(&fixture.event_id, &fixture.service)?;
    let expect = Expect::on(&response.exchange);
    expect.status(200)?;
    let rows = expect.present("response entity", response.entity.as_ref())?;
    expect.len_eq("response entity", 1, rows)?;
    for row in rows {
        fields_present(&expect, &[
            ("category", row.category.as_deref()),
            ("publisher", row.publisher.as_deref()),
            ("event_id", row.event_id.as_deref()),
            ("uuid", row.uuid.as_deref()),
            ("service", row.service.as_deref()),
            ("when", row.when.as_deref()),
            ("host_name", row.host_name.as_deref()),
            ("state", row.state.as_deref()),
            ("deployment", row.deployment.as_deref()),
            ("event_name", row.event_name.as_deref()),
            ("actual_event", row.actual_event.as_deref()),
        ])?;
    }
    Ok(())
}

/// `/stacky/timings?name=`.
fn get_timings_for_event_name(fixture: &StackTachFixture, _ctx: &mut CaseContext) -> CaseResult {
    let response = fixture.client.get_timings_for_event_name(&fixture.timing_event)?;
    let expect = Expect::on(&response.exchange);
    for row in listed(&response, &expect)? {
        fields_present(&expect, &[
            ("event_name", row.event_name.as_deref()),
            ("timing", row.timing.as_deref()),
        ])?;
    }
    Ok(())
}

/// `/stacky/reports`.
fn get_reports(fixture: &StackTachFixture, _ctx: &mut CaseContext) -> CaseResult {
    let response = fixture.client.get_reports()?;
    let expect = Expect::on(&response.exchange);
    for row in listed(&response, &expect)? {
        fields_present(&expect, &[
            ("report_id", row.report_id.as_deref()),
            ("start", row.start.as_deref()),
            ("end", row.end.as_deref()),
            ("created", row.created.as_deref()),
            ("name", row.name.as_deref()),
            ("version", row.version.as_deref()),
        ])?;
    }
    Ok(())
}
