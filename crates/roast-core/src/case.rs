// crates/roast-core/src/case.rs
// ============================================================================
// Module: Test Cases
// Description: Named, tagged units of behavior verification.
// Purpose: Attach tags and skip metadata explicitly at registration time.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A [`TestCase`] bundles a name, a [`TagSet`], an optional [`SkipRecord`],
//! and a body closure. The body runs against the class fixture and a
//! [`CaseContext`] whose resource registry is torn down right after the body
//! returns, so resources created inside a case never outlive it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::expect::AssertionFailure;
use crate::resources::ResourceRegistry;
use crate::skip::SkipRecord;
use crate::tags::TagSet;

// ============================================================================
// SECTION: Identifiers
// ============================================================================

/// Test case name, unique within its class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CaseName(String);

impl CaseName {
    /// Creates a case name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SECTION: Failures
// ============================================================================

/// Reason a case body did not pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaseFailure {
    /// An expectation did not hold.
    #[error(transparent)]
    Assertion(#[from] AssertionFailure),
    /// The case could not complete (transport, protocol, or setup error).
    #[error("{0}")]
    Error(String),
}

impl CaseFailure {
    /// Builds an error failure from any displayable cause.
    #[must_use]
    pub fn error(cause: impl fmt::Display) -> Self {
        Self::Error(cause.to_string())
    }
}

/// Result returned by case bodies.
pub type CaseResult = Result<(), CaseFailure>;

// ============================================================================
// SECTION: Case Context
// ============================================================================

/// Per-case execution context.
#[derive(Debug)]
pub struct CaseContext {
    /// Name of the running case.
    name: CaseName,
    /// Resources created by the case body.
    resources: ResourceRegistry,
    /// Free-form notes surfaced in the report.
    notes: Vec<String>,
}

impl CaseContext {
    /// Creates a context for the named case.
    #[must_use]
    pub fn new(name: CaseName) -> Self {
        let resources = ResourceRegistry::new(name.as_str());
        Self {
            name,
            resources,
            notes: Vec::new(),
        }
    }

    /// Returns the running case name.
    #[must_use]
    pub const fn name(&self) -> &CaseName {
        &self.name
    }

    /// Returns the case-scoped resource registry.
    pub const fn resources(&mut self) -> &mut ResourceRegistry {
        &mut self.resources
    }

    /// Records a note for the report.
    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    /// Splits the context into its registry and notes.
    pub(crate) fn into_parts(self) -> (ResourceRegistry, Vec<String>) {
        (self.resources, self.notes)
    }
}

// ============================================================================
// SECTION: Test Cases
// ============================================================================

/// Boxed case body.
type CaseBody<F> = Box<dyn Fn(&F, &mut CaseContext) -> CaseResult>;

/// Discoverable metadata for a test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseInfo {
    /// Owning class name.
    pub class: String,
    /// Case name.
    pub name: CaseName,
    /// Attached tags.
    pub tags: TagSet,
    /// Known-issue annotation, if any.
    pub skip: Option<SkipRecord>,
    /// One-line description.
    pub summary: Option<String>,
}

/// A named, tagged test case running against fixture `F`.
pub struct TestCase<F> {
    /// Case name.
    name: CaseName,
    /// Attached tags.
    tags: TagSet,
    /// Known-issue annotation.
    skip: Option<SkipRecord>,
    /// One-line description.
    summary: Option<String>,
    /// Procedure under test.
    body: CaseBody<F>,
}

impl<F> TestCase<F> {
    /// Creates an untagged case.
    pub fn new<B>(name: impl Into<String>, body: B) -> Self
    where
        B: Fn(&F, &mut CaseContext) -> CaseResult + 'static,
    {
        Self {
            name: CaseName::new(name),
            tags: TagSet::new(),
            skip: None,
            summary: None,
            body: Box::new(body),
        }
    }

    /// Adds a tag.
    #[must_use]
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key, value);
        self
    }

    /// Marks the case as blocked on an open issue.
    #[must_use]
    pub fn skip_open_issue(
        mut self,
        tracker: impl Into<String>,
        issue_id: impl Into<String>,
    ) -> Self {
        self.skip = Some(SkipRecord::new(tracker, issue_id));
        self
    }

    /// Attaches a full skip record.
    #[must_use]
    pub fn skip_record(mut self, record: SkipRecord) -> Self {
        self.skip = Some(record);
        self
    }

    /// Adds a one-line description.
    #[must_use]
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Returns the case name.
    #[must_use]
    pub const fn name(&self) -> &CaseName {
        &self.name
    }

    /// Returns the case tags.
    #[must_use]
    pub const fn tags(&self) -> &TagSet {
        &self.tags
    }

    /// Returns the skip record, if any.
    #[must_use]
    pub const fn skip(&self) -> Option<&SkipRecord> {
        self.skip.as_ref()
    }

    /// Returns discoverable metadata for the case.
    #[must_use]
    pub fn info(&self, class: &str) -> CaseInfo {
        CaseInfo {
            class: class.to_string(),
            name: self.name.clone(),
            tags: self.tags.clone(),
            skip: self.skip.clone(),
            summary: self.summary.clone(),
        }
    }

    /// Invokes the body.
    pub(crate) fn invoke(&self, fixture: &F, context: &mut CaseContext) -> CaseResult {
        (self.body)(fixture, context)
    }
}

impl<F> fmt::Debug for TestCase<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("skip", &self.skip)
            .finish_non_exhaustive()
    }
}
