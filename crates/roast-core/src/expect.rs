// crates/roast-core/src/expect.rs
// ============================================================================
// Module: Expectations
// Description: Fail-fast response checks with request/response context.
// Purpose: Turn expectation mismatches into descriptive assertion failures.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Case bodies check responses with [`Expect`]. Every check returns
//! `Result<(), AssertionFailure>` so bodies chain them with `?`: the first
//! mismatch ends the case and later checks are never evaluated. When the
//! check is bound to an [`Exchange`], the failure message carries the
//! request line, status, reason, and a body excerpt.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum number of body characters kept in failure context.
pub const MAX_CONTEXT_BODY_CHARS: usize = 2048;

// ============================================================================
// SECTION: Exchange
// ============================================================================

/// Request/response context captured for one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exchange {
    /// HTTP method.
    pub method: String,
    /// Request URL.
    pub url: String,
    /// Response status code.
    pub status: u16,
    /// Response reason phrase.
    pub reason: String,
    /// Response body excerpt.
    pub body: String,
}

impl Exchange {
    /// Builds an exchange, truncating the body excerpt.
    #[must_use]
    pub fn new(
        method: impl Into<String>,
        url: impl Into<String>,
        status: u16,
        reason: impl Into<String>,
        body: &str,
    ) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            status,
            reason: reason.into(),
            body: truncate_body(body),
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {} {}", self.method, self.url, self.status, self.reason)?;
        if !self.body.is_empty() {
            write!(f, "; contents: {}", self.body)?;
        }
        Ok(())
    }
}

/// Truncates a body excerpt on a character boundary.
fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_CONTEXT_BODY_CHARS) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

// ============================================================================
// SECTION: Assertion Failure
// ============================================================================

/// Expectation mismatch reported by a case body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{}", render_failure(self))]
pub struct AssertionFailure {
    /// What was checked (for example `status code`).
    pub check: String,
    /// Rendered expected value.
    pub expected: String,
    /// Rendered actual value.
    pub actual: String,
    /// Optional explanatory note.
    pub note: Option<String>,
    /// Exchange the check was evaluated against.
    pub context: Option<Exchange>,
}

/// Renders the mismatch, note, and request context on one line.
fn render_failure(failure: &AssertionFailure) -> String {
    let mut message = format!(
        "unexpected {} value: expected {}, received {}",
        failure.check, failure.expected, failure.actual
    );
    if let Some(note) = &failure.note {
        message.push_str(&format!(" ({note})"));
    }
    if let Some(context) = &failure.context {
        message.push_str(&format!("; request: {context}"));
    }
    message
}

// ============================================================================
// SECTION: Expect
// ============================================================================

/// Fail-fast expectation checks, optionally bound to an exchange.
#[derive(Debug, Clone, Copy, Default)]
pub struct Expect<'a> {
    /// Exchange attached to every failure.
    context: Option<&'a Exchange>,
}

impl<'a> Expect<'a> {
    /// Binds checks to a response exchange.
    #[must_use]
    pub const fn on(exchange: &'a Exchange) -> Self {
        Self {
            context: Some(exchange),
        }
    }

    /// Creates checks with no response context.
    #[must_use]
    pub const fn detached() -> Self {
        Self {
            context: None,
        }
    }

    /// Builds a failure carrying this check's context.
    #[must_use]
    pub fn failure(
        &self,
        check: &str,
        expected: impl fmt::Display,
        actual: impl fmt::Display,
    ) -> AssertionFailure {
        AssertionFailure {
            check: check.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
            note: None,
            context: self.context.cloned(),
        }
    }

    /// Checks the bound exchange's status code.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionFailure`] when the status differs or no exchange is bound.
    pub fn status(&self, expected: u16) -> Result<(), AssertionFailure> {
        self.status_in(&[expected])
    }

    /// Checks the bound exchange's status code against several accepted codes.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionFailure`] when the status is not accepted.
    pub fn status_in(&self, accepted: &[u16]) -> Result<(), AssertionFailure> {
        let expected = accepted.iter().map(u16::to_string).collect::<Vec<_>>().join(" or ");
        match self.context {
            Some(exchange) if accepted.contains(&exchange.status) => Ok(()),
            Some(exchange) => Err(self.failure("status code", expected, exchange.status)),
            None => Err(self.failure("status code", expected, "no response")),
        }
    }

    /// Checks that two values are equal.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionFailure`] when the values differ.
    pub fn equals<E, A>(&self, check: &str, expected: E, actual: A) -> Result<(), AssertionFailure>
    where
        A: PartialEq<E> + fmt::Display,
        E: fmt::Display,
    {
        if actual == expected { Ok(()) } else { Err(self.failure(check, expected, actual)) }
    }

    /// Checks that a value differs from one it must not equal.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionFailure`] when the values are equal.
    pub fn differs<E, A>(
        &self,
        check: &str,
        unexpected: E,
        actual: A,
    ) -> Result<(), AssertionFailure>
    where
        A: PartialEq<E> + fmt::Display,
        E: fmt::Display,
    {
        if actual == unexpected {
            Err(self.failure(check, format!("anything but {unexpected}"), actual))
        } else {
            Ok(())
        }
    }

    /// Checks that an optional field is present.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionFailure`] when the field is `None`.
    pub fn present<'v, T>(
        &self,
        check: &str,
        value: Option<&'v T>,
    ) -> Result<&'v T, AssertionFailure>
    where
        T: ?Sized,
    {
        value.ok_or_else(|| self.failure(check, "a value", "none"))
    }

    /// Checks that a collection has exactly `expected` elements.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionFailure`] when the length differs.
    pub fn len_eq<T>(
        &self,
        check: &str,
        expected: usize,
        items: &[T],
    ) -> Result<(), AssertionFailure> {
        self.equals(&format!("{check} length"), expected, items.len())
    }

    /// Checks that a collection has at least `minimum` elements.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionFailure`] when the collection is shorter.
    pub fn len_at_least<T>(
        &self,
        check: &str,
        minimum: usize,
        items: &[T],
    ) -> Result<(), AssertionFailure> {
        if items.len() >= minimum {
            Ok(())
        } else {
            let check = format!("{check} length");
            Err(self.failure(&check, format!("at least {minimum}"), items.len()))
        }
    }

    /// Checks that a collection contains a value.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionFailure`] when the value is missing.
    pub fn contains<T, N>(
        &self,
        check: &str,
        items: &[T],
        needle: &N,
    ) -> Result<(), AssertionFailure>
    where
        T: PartialEq<N> + fmt::Display,
        N: fmt::Display + ?Sized,
    {
        if items.iter().any(|item| item == needle) {
            Ok(())
        } else {
            Err(self.failure(check, format!("a member equal to {needle}"), render_list(items)))
        }
    }

    /// Checks that two collections hold the same members, ignoring order.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionFailure`] when the members differ.
    pub fn same_members<T>(
        &self,
        check: &str,
        expected: &[T],
        actual: &[T],
    ) -> Result<(), AssertionFailure>
    where
        T: Ord + fmt::Display,
    {
        let mut left = expected.iter().collect::<Vec<_>>();
        let mut right = actual.iter().collect::<Vec<_>>();
        left.sort();
        left.dedup();
        right.sort();
        right.dedup();
        if left == right {
            Ok(())
        } else {
            Err(self.failure(check, render_list(expected), render_list(actual)))
        }
    }

    /// Checks a boolean condition with an explanatory note.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionFailure`] when the condition is false.
    pub fn holds(&self, check: &str, condition: bool, note: &str) -> Result<(), AssertionFailure> {
        if condition {
            return Ok(());
        }
        let mut failure = self.failure(check, true, false);
        failure.note = Some(note.to_string());
        Err(failure)
    }
}

/// Renders a slice as `[a, b, c]`.
fn render_list<T: fmt::Display>(items: &[T]) -> String {
    let rendered = items.iter().map(ToString::to_string).collect::<Vec<_>>();
    format!("[{}]", rendered.join(", "))
}
