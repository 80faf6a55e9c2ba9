// crates/roast-clients/src/stacktach.rs
// ============================================================================
// Module: StackTach Client
// Description: Read-only client for the StackTach "stacky" reporting API.
// Purpose: Decode tabular listings into typed rows for smoke checks.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Stacky answers every listing as a JSON array of arrays. The first row is a
//! header row and each following row is one record, read positionally. Event
//! detail lookups return a two-column `Key`/`Value` table instead, which is
//! folded into a single [`EventDetails`] record.
//!
//! Cells are kept as optional strings: numbers are rendered in decimal, `null`
//! and missing trailing cells become `None`. Smoke checks only assert field
//! presence, so no further typing is attempted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

use crate::error::ClientError;
use crate::rest::ApiResponse;
use crate::rest::RestClient;

// ============================================================================
// SECTION: Table Decoding
// ============================================================================

/// Raw stacky table as returned on the wire.
pub type RawTable = Vec<Vec<Value>>;

/// Record decoded positionally from one data row.
pub trait TableRow: Sized {
    /// Builds the record from the row's cells in column order.
    fn from_cells(cells: &[Value]) -> Self;
}

/// Renders one cell as an optional string.
#[must_use]
pub fn cell_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        other => Some(other.to_string()),
    }
}

/// Decodes every data row after the header row.
#[must_use]
pub fn decode_table<T: TableRow>(table: &[Vec<Value>]) -> Vec<T> {
    table.iter().skip(1).map(|row| T::from_cells(row)).collect()
}

/// Returns the `index`-th cell of `cells` as text.
fn col(cells: &[Value], index: usize) -> Option<String> {
    cell_text(cells.get(index))
}

// ============================================================================
// SECTION: Models
// ============================================================================

/// Row of `/stacky/events`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventName {
    /// Notification event name.
    pub event_name: Option<String>,
}

impl TableRow for EventName {
    fn from_cells(cells: &[Value]) -> Self {
        Self {
            event_name: col(cells, 0),
        }
    }
}

/// Row of `/stacky/hosts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostName {
    /// Reporting host.
    pub host_name: Option<String>,
}

impl TableRow for HostName {
    fn from_cells(cells: &[Value]) -> Self {
        Self {
            host_name: col(cells, 0),
        }
    }
}

/// Row of `/stacky/deployments`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    /// Deployment id.
    pub id: Option<String>,
    /// Deployment name.
    pub name: Option<String>,
}

impl TableRow for Deployment {
    fn from_cells(cells: &[Value]) -> Self {
        Self {
            id: col(cells, 0),
            name: col(cells, 1),
        }
    }
}

/// Row of `/stacky/timings/summary`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingSummary {
    /// Event name.
    pub event_name: Option<String>,
    /// Sample count.
    pub count: Option<String>,
    /// Minimum duration.
    pub minimum: Option<String>,
    /// Maximum duration.
    pub maximum: Option<String>,
    /// Average duration.
    pub average: Option<String>,
}

impl TableRow for TimingSummary {
    fn from_cells(cells: &[Value]) -> Self {
        Self {
            event_name: col(cells, 0),
            count: col(cells, 1),
            minimum: col(cells, 2),
            maximum: col(cells, 3),
            average: col(cells, 4),
        }
    }
}

/// Row of `/stacky/kpi`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kpi {
    /// Event name.
    pub event_name: Option<String>,
    /// End-to-end duration.
    pub timing: Option<String>,
    /// Instance uuid.
    pub uuid: Option<String>,
    /// Deployment name.
    pub deployment: Option<String>,
}

impl TableRow for Kpi {
    fn from_cells(cells: &[Value]) -> Self {
        Self {
            event_name: col(cells, 0),
            timing: col(cells, 1),
            uuid: col(cells, 2),
            deployment: col(cells, 3),
        }
    }
}

/// Row of `/stacky/timings?name=`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventTiming {
    /// Event name.
    pub event_name: Option<String>,
    /// Duration.
    pub timing: Option<String>,
}

impl TableRow for EventTiming {
    fn from_cells(cells: &[Value]) -> Self {
        Self {
            event_name: col(cells, 0),
            timing: col(cells, 1),
        }
    }
}

/// Row of `/stacky/reports`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Report id.
    pub report_id: Option<String>,
    /// Period start.
    pub start: Option<String>,
    /// Period end.
    pub end: Option<String>,
    /// Creation time.
    pub created: Option<String>,
    /// Report name.
    pub name: Option<String>,
    /// Report version.
    pub version: Option<String>,
}

impl TableRow for Report {
    fn from_cells(cells: &[Value]) -> Self {
        Self {
            report_id: col(cells, 0),
            start: col(cells, 1),
            end: col(cells, 2),
            created: col(cells, 3),
            name: col(cells, 4),
            version: col(cells, 5),
        }
    }
}

/// Details of one raw event from `/stacky/show/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDetails {
    /// Notification category.
    pub category: Option<String>,
    /// Publisher id.
    pub publisher: Option<String>,
    /// Raw event id.
    pub event_id: Option<String>,
    /// Instance uuid.
    pub uuid: Option<String>,
    /// Originating service.
    pub service: Option<String>,
    /// Event time.
    pub when: Option<String>,
    /// Reporting host.
    pub host_name: Option<String>,
    /// Instance state.
    pub state: Option<String>,
    /// Deployment name.
    pub deployment: Option<String>,
    /// Event name.
    pub event_name: Option<String>,
    /// Raw notification body.
    pub actual_event: Option<String>,
}

impl EventDetails {
    /// Folds a `Key`/`Value` table into one record. Unknown keys are ignored.
    #[must_use]
    pub fn from_key_values(table: &[Vec<Value>]) -> Self {
        let mut details = Self::default();
        for row in table.iter().skip(1) {
            let Some(key) = col(row, 0) else {
                continue;
            };
            let value = col(row, 1);
            let slot = match normalize_key(&key).as_str() {
                "category" => &mut details.category,
                "publisher" => &mut details.publisher,
                "#" | "event_id" => &mut details.event_id,
                "uuid" => &mut details.uuid,
                "service" => &mut details.service,
                "when" => &mut details.when,
                "host" | "host_name" => &mut details.host_name,
                "state" => &mut details.state,
                "deployment" => &mut details.deployment,
                "event" | "event_name" => &mut details.event_name,
                "actual_event" => &mut details.actual_event,
                _ => continue,
            };
            *slot = value;
        }
        details
    }
}

/// Lowercases a key and replaces spaces with underscores.
fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_lowercase().replace(' ', "_")
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// StackTach stacky API client.
#[derive(Debug, Clone)]
pub struct StackTachClient {
    /// Transport bound to the StackTach endpoint.
    rest: RestClient,
}

impl StackTachClient {
    /// Wraps a transport bound to the StackTach endpoint.
    #[must_use]
    pub const fn new(rest: RestClient) -> Self {
        Self {
            rest,
        }
    }

    /// Lists known event names.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request cannot be completed.
    pub fn get_event_names(&self) -> Result<ApiResponse<Vec<EventName>>, ClientError> {
        self.table("stacky/events", &[])
    }

    /// Lists reporting hosts.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request cannot be completed.
    pub fn get_host_names(&self) -> Result<ApiResponse<Vec<HostName>>, ClientError> {
        self.table("stacky/hosts", &[])
    }

    /// Lists deployments.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request cannot be completed.
    pub fn get_deployments(&self) -> Result<ApiResponse<Vec<Deployment>>, ClientError> {
        self.table("stacky/deployments", &[])
    }

    /// Lists per-event timing statistics.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request cannot be completed.
    pub fn get_timings_summary(&self) -> Result<ApiResponse<Vec<TimingSummary>>, ClientError> {
        self.table("stacky/timings/summary", &[])
    }

    /// Lists key performance indicators.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request cannot be completed.
    pub fn get_kpi(&self) -> Result<ApiResponse<Vec<Kpi>>, ClientError> {
        self.table("stacky/kpi", &[])
    }

    /// Fetches one raw event. The entity holds exactly one record when the
    /// body decodes.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request cannot be completed.
    pub fn get_event_id_details(
        &self,
        event_id: &str,
        service: &str,
    ) -> Result<ApiResponse<Vec<EventDetails>>, ClientError> {
        let response = self
            .rest
            .get_query::<RawTable>(&format!("stacky/show/{event_id}"), &[("service", service)])?;
        Ok(response.map_entity(|table| Some(vec![EventDetails::from_key_values(&table)])))
    }

    /// Lists timings recorded for one event name.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request cannot be completed.
    pub fn get_timings_for_event_name(
        &self,
        event_name: &str,
    ) -> Result<ApiResponse<Vec<EventTiming>>, ClientError> {
        self.table("stacky/timings", &[("name", event_name)])
    }

    /// Lists generated reports.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request cannot be completed.
    pub fn get_reports(&self) -> Result<ApiResponse<Vec<Report>>, ClientError> {
        self.table("stacky/reports", &[])
    }

    /// Fetches and decodes a positional table.
    fn table<T: TableRow>(
        &self,
        target: &str,
        query: &[(&str, &str)],
    ) -> Result<ApiResponse<Vec<T>>, ClientError> {
        let response = self.rest.get_query::<RawTable>(target, query)?;
        Ok(response.map_entity(|table| Some(decode_table(&table))))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
