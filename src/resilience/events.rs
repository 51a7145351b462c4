//! Notifications emitted by circuit breakers.
//!
//! The breaker only knows the [`CircuitObserver`] trait; the sink behind it
//! (structured logs, metrics, paging) is injected by the host.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::Serialize;

use crate::config::BreakerConfig;

/// Circuit breaker states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    /// Calls pass through and failures are counted.
    Closed,
    /// Calls are skipped and the fallback is returned immediately.
    Open,
    /// Calls are let through to probe for recovery.
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "CLOSED"),
            CircuitState::Open => write!(f, "OPEN"),
            CircuitState::HalfOpen => write!(f, "HALF_OPEN"),
        }
    }
}

/// Why a call was counted as failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// The operation returned an error.
    Error,
    /// The operation did not finish within the request timeout.
    Timeout,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Error => "error",
            FailureKind::Timeout => "timeout",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A state change on one breaker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionEvent {
    pub service: String,
    pub from: CircuitState,
    pub to: CircuitState,
    pub reason: &'static str,
    /// Consecutive counters as they stood when the transition fired.
    pub failure_count: u32,
    pub success_count: u32,
}

/// A recorded failure on one breaker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureEvent {
    pub service: String,
    pub kind: FailureKind,
    pub error: String,
    pub failure_count: u32,
    pub failure_threshold: u32,
}

/// Sink for breaker lifecycle notifications.
///
/// Calls are fire-and-forget and happen after the breaker lock is released.
/// Implementations must not block; a panic is caught and logged.
pub trait CircuitObserver: Send + Sync {
    fn on_created(&self, _service: &str, _config: &BreakerConfig) {}

    fn on_transition(&self, _event: &TransitionEvent) {}

    fn on_failure(&self, _event: &FailureEvent) {}
}

/// Observer that discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl CircuitObserver for NoopObserver {}

/// Run an observer callback, containing any panic it raises.
pub(crate) fn notify(service: &str, f: impl FnOnce()) {
    if catch_unwind(AssertUnwindSafe(f)).is_err() {
        tracing::error!(service = %service, "Circuit observer panicked; notification dropped");
    }
}
