//! Error types used by the dispatcher and by listeners.
//!
//! This module defines:
//!
//! - [`ListenerError`]: errors returned by a listener's `on_event`.
//! - [`ListenerFailure`]: one failed listener invocation (error or panic).
//! - [`DispatchError`]: aggregate error of immediate delivery.
//! - [`RuntimeError`]: errors raised while constructing the dispatcher.
//!
//! All types provide an `as_label` helper returning a short stable label for logs/metrics.

use thiserror::Error;

/// # Errors returned by listeners.
///
/// A listener reports a recoverable failure by returning `Err`; panics are
/// caught separately by the dispatcher and reported as [`FailureCause::Panicked`].
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ListenerError {
    /// Listener could not handle the event.
    #[error("listener failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The event could not be viewed as the type the listener declared.
    ///
    /// Selection only picks listeners whose declared type the event can be
    /// viewed as, so this indicates an `Event` impl whose `view` is inconsistent.
    #[error("event {actual} cannot be viewed as {expected}")]
    Incompatible {
        /// Type the listener declared interest in.
        expected: &'static str,
        /// Runtime type of the dispatched event.
        actual: &'static str,
    },
}

impl ListenerError {
    /// Shorthand for [`ListenerError::Fail`].
    ///
    /// # Example
    /// ```
    /// use typebus::ListenerError;
    ///
    /// let err = ListenerError::fail("connection refused");
    /// assert_eq!(err.to_string(), "listener failed: connection refused");
    /// ```
    pub fn fail(error: impl std::fmt::Display) -> Self {
        ListenerError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ListenerError::Fail { .. } => "listener_failed",
            ListenerError::Incompatible { .. } => "listener_incompatible",
        }
    }
}

/// Why a single listener invocation failed.
#[derive(Error, Debug)]
pub enum FailureCause {
    /// The listener returned an error.
    #[error(transparent)]
    Error(#[from] ListenerError),

    /// The listener panicked; carries the panic message when it was a string.
    #[error("listener panicked: {0}")]
    Panicked(String),
}

/// One failed listener invocation.
#[derive(Error, Debug)]
#[error("{listener} on {event}: {cause}")]
pub struct ListenerFailure {
    /// Listener name as reported by `EventListener::name`.
    pub listener: String,
    /// Runtime type name of the event being delivered.
    pub event: &'static str,
    /// What went wrong.
    #[source]
    pub cause: FailureCause,
}

impl ListenerFailure {
    /// Returns `true` if the listener panicked rather than returning an error.
    pub fn is_panic(&self) -> bool {
        matches!(self.cause, FailureCause::Panicked(_))
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match &self.cause {
            FailureCause::Error(e) => e.as_label(),
            FailureCause::Panicked(_) => "listener_panicked",
        }
    }
}

/// # Errors produced by immediate delivery.
///
/// Pooled delivery modes never return errors to the caller; their failures
/// are logged inside the worker tasks.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DispatchError {
    /// One or more listeners failed; every selected listener was still attempted.
    #[error("{} of {attempted} listeners failed for {event}", .failures.len())]
    ListenersFailed {
        /// Runtime type name of the dispatched event.
        event: &'static str,
        /// Number of listeners that were attempted.
        attempted: usize,
        /// Failures in invocation order.
        failures: Vec<ListenerFailure>,
    },
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use typebus::DispatchError;
    ///
    /// let err = DispatchError::ListenersFailed { event: "demo", attempted: 2, failures: vec![] };
    /// assert_eq!(err.as_label(), "dispatch_listeners_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::ListenersFailed { .. } => "dispatch_listeners_failed",
        }
    }

    /// Returns the collected listener failures.
    pub fn failures(&self) -> &[ListenerFailure] {
        match self {
            DispatchError::ListenersFailed { failures, .. } => failures,
        }
    }
}

/// # Errors produced while building a dispatcher.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The default executor needs an ambient tokio runtime and none was found.
    #[error("no tokio runtime available; build inside a runtime or supply an executor")]
    NoRuntime,
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::NoRuntime => "runtime_missing",
        }
    }
}
