// crates/roast-core/src/skip.rs
// ============================================================================
// Module: Skip Registry
// Description: Known-issue annotations and the skip decision table.
// Purpose: Suppress execution of cases blocked on open external defects.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`SkipRecord`] ties a test case to an issue in an external tracker. The
//! [`SkipRegistry`] decides, before a case runs, whether the record still
//! applies. Issues listed as resolved (or a registry that ignores known
//! issues entirely) let the case run again.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Skip Records
// ============================================================================

/// Known-issue annotation attached to a test case.
///
/// # Invariants
/// - `tracker` is stored lowercase so references compare case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipRecord {
    /// Issue tracker name (for example `launchpad`).
    tracker: String,
    /// Issue identifier within the tracker.
    issue_id: String,
    /// Optional human-readable reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl SkipRecord {
    /// Creates a record for an open issue.
    #[must_use]
    pub fn new(tracker: impl Into<String>, issue_id: impl Into<String>) -> Self {
        Self {
            tracker: tracker.into().to_ascii_lowercase(),
            issue_id: issue_id.into(),
            reason: None,
        }
    }

    /// Attaches a reason to the record.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Returns the tracker name.
    #[must_use]
    pub fn tracker(&self) -> &str {
        &self.tracker
    }

    /// Returns the issue identifier.
    #[must_use]
    pub fn issue_id(&self) -> &str {
        &self.issue_id
    }

    /// Returns the optional reason.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Returns the `tracker:issue` reference string.
    #[must_use]
    pub fn reference(&self) -> String {
        format!("{}:{}", self.tracker, self.issue_id)
    }
}

impl fmt::Display for SkipRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tracker, self.issue_id)?;
        if let Some(reason) = &self.reason {
            write!(f, " ({reason})")?;
        }
        Ok(())
    }
}

/// Why a case was not executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// Blocked on an open issue.
    KnownIssue {
        /// The issue reference.
        record: SkipRecord,
    },
    /// The class does not apply to the configured environment.
    Unsupported {
        /// Explanation from the applicability check.
        message: String,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KnownIssue {
                record,
            } => write!(f, "known issue {record}"),
            Self::Unsupported {
                message,
            } => write!(f, "unsupported: {message}"),
        }
    }
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Decides whether skip records still suppress execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipRegistry {
    /// Lowercase `tracker:issue` references known to be fixed.
    resolved: BTreeSet<String>,
    /// When set, no known issue suppresses execution.
    include_known_issues: bool,
}

impl SkipRegistry {
    /// Creates a registry where every record is treated as open.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a `tracker:issue` reference as resolved.
    #[must_use]
    pub fn resolve(mut self, reference: &str) -> Self {
        self.resolved.insert(normalize_reference(reference));
        self
    }

    /// Marks every reference in the iterator as resolved.
    #[must_use]
    pub fn with_resolved<I, S>(self, references: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        references
            .into_iter()
            .fold(self, |registry, reference| registry.resolve(reference.as_ref()))
    }

    /// Returns a registry that runs cases regardless of known issues.
    #[must_use]
    pub fn including_known_issues(mut self) -> Self {
        self.include_known_issues = true;
        self
    }

    /// Returns true when the record's issue is considered fixed.
    #[must_use]
    pub fn is_resolved(&self, record: &SkipRecord) -> bool {
        self.include_known_issues
            || self.resolved.contains(&normalize_reference(&record.reference()))
    }

    /// Returns the skip reason for a case, or `None` when it should run.
    #[must_use]
    pub fn decide(&self, record: Option<&SkipRecord>) -> Option<SkipReason> {
        let record = record?;
        if self.is_resolved(record) {
            return None;
        }
        Some(SkipReason::KnownIssue {
            record: record.clone(),
        })
    }
}

/// Normalizes a reference so tracker names compare case-insensitively.
fn normalize_reference(reference: &str) -> String {
    match reference.trim().split_once(':') {
        Some((tracker, issue)) => {
            format!("{}:{}", tracker.trim().to_ascii_lowercase(), issue.trim())
        }
        None => reference.trim().to_string(),
    }
}
