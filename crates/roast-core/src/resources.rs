// crates/roast-core/src/resources.rs
// ============================================================================
// Module: Resource Registry
// Description: Ordered cleanup callbacks for resources created by tests.
// Purpose: Guarantee every created resource is released exactly once.
// Dependencies: serde, thiserror, tracing
// ============================================================================

//! ## Overview
//! Fixtures and case bodies register a cleanup callback for every remote
//! resource they create. [`ResourceRegistry::tear_down`] runs the callbacks in
//! reverse registration order. A callback that fails (or panics) is recorded
//! as a [`TeardownFailure`] and never stops the remaining callbacks. A
//! resource that is already gone counts as released.
//!
//! Invariants:
//! - Each registered callback is invoked exactly once.
//! - `TeardownReport::invoked` equals the number of callbacks registered since
//!   the previous teardown.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::panic::catch_unwind;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use tracing::warn;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Result of a single cleanup callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupOutcome {
    /// The resource was deleted by this callback.
    Released,
    /// The resource no longer existed.
    AlreadyGone,
}

/// Cleanup callback that failed during teardown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("cleanup of {label} failed: {message}")]
pub struct TeardownFailure {
    /// Label supplied at registration.
    pub label: String,
    /// Failure description.
    pub message: String,
}

/// Summary of one teardown pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeardownReport {
    /// Registry scope (class or case name).
    pub scope: String,
    /// Callbacks registered before this teardown.
    pub registered: usize,
    /// Callbacks invoked by this teardown.
    pub invoked: usize,
    /// Callbacks that reported [`CleanupOutcome::Released`].
    pub released: usize,
    /// Callbacks that reported [`CleanupOutcome::AlreadyGone`].
    pub already_gone: usize,
    /// Callbacks that failed.
    pub failures: Vec<TeardownFailure>,
}

impl TeardownReport {
    /// Returns true when no callback failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Boxed cleanup callback.
type CleanupFn = Box<dyn FnOnce() -> Result<CleanupOutcome, String>>;

/// Registered cleanup entry.
struct Cleanup {
    /// Human-readable resource label.
    label: String,
    /// Callback releasing the resource.
    action: CleanupFn,
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Ordered collection of cleanup callbacks.
///
/// # Invariants
/// - Entries are consumed exactly once, in reverse order, by `tear_down`.
/// - Dropping a registry with pending entries tears them down.
pub struct ResourceRegistry {
    /// Scope label used in reports and logs.
    scope: String,
    /// Pending cleanups in registration order.
    entries: Vec<Cleanup>,
}

impl ResourceRegistry {
    /// Creates an empty registry for the given scope.
    #[must_use]
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            entries: Vec::new(),
        }
    }

    /// Registers a cleanup callback for a created resource.
    pub fn add<F>(&mut self, label: impl Into<String>, action: F)
    where
        F: FnOnce() -> Result<CleanupOutcome, String> + 'static,
    {
        let label = label.into();
        debug!(scope = %self.scope, resource = %label, "registered cleanup");
        self.entries.push(Cleanup {
            label,
            action: Box::new(action),
        });
    }

    /// Returns the number of pending cleanups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no cleanup is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns pending labels in registration order.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.label.as_str()).collect()
    }

    /// Runs every pending cleanup in reverse registration order.
    pub fn tear_down(&mut self) -> TeardownReport {
        let mut report = TeardownReport {
            scope: self.scope.clone(),
            registered: self.entries.len(),
            ..TeardownReport::default()
        };
        while let Some(entry) = self.entries.pop() {
            report.invoked += 1;
            let Cleanup {
                label,
                action,
            } = entry;
            match catch_unwind(AssertUnwindSafe(action)) {
                Ok(Ok(CleanupOutcome::Released)) => report.released += 1,
                Ok(Ok(CleanupOutcome::AlreadyGone)) => {
                    debug!(scope = %self.scope, resource = %label, "resource already gone");
                    report.already_gone += 1;
                }
                Ok(Err(message)) => {
                    warn!(
                        scope = %self.scope,
                        resource = %label,
                        error = %message,
                        "cleanup failed"
                    );
                    report.failures.push(TeardownFailure {
                        label,
                        message,
                    });
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    warn!(
                        scope = %self.scope,
                        resource = %label,
                        error = %message,
                        "cleanup panicked"
                    );
                    report.failures.push(TeardownFailure {
                        label,
                        message,
                    });
                }
            }
        }
        report
    }
}

impl fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("scope", &self.scope)
            .field("pending", &self.labels())
            .finish()
    }
}

impl Drop for ResourceRegistry {
    fn drop(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        warn!(
            scope = %self.scope,
            pending = self.entries.len(),
            "registry dropped before teardown"
        );
        let _ = self.tear_down();
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload.downcast_ref::<&str>().map_or_else(
        || {
            payload
                .downcast_ref::<String>()
                .cloned()
                .unwrap_or_else(|| "panic with non-string payload".to_string())
        },
        |message| (*message).to_string(),
    )
}
