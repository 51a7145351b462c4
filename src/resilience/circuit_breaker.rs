//! Circuit breaker for dependency protection.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: dependency assumed down, calls fail fast
//! - Half-Open: probing whether the dependency recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive failures >= failure_threshold
//! Open → Half-Open: next admission after reset_timeout since last failure
//! Half-Open → Closed: consecutive successes >= success_threshold
//! Half-Open → Open: any failure
//! ```
//!
//! # Design Decisions
//! - One breaker per dependency name, all bookkeeping under one mutex
//! - No background timers; Open → Half-Open is evaluated on admission
//! - Observer notifications are emitted after the lock is released

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::config::BreakerConfig;
use crate::resilience::events::{
    notify, CircuitObserver, CircuitState, FailureEvent, FailureKind, TransitionEvent,
};

/// Point-in-time copy of a breaker's fields.
#[derive(Debug, Clone)]
pub struct BreakerSnapshot {
    pub name: String,
    pub config: BreakerConfig,
    pub state: CircuitState,
    pub failure_count: u32,
    pub success_count: u32,
    pub total_requests: u64,
    pub total_failures: u64,
    pub total_successes: u64,
    pub last_failure_at: Option<DateTime<Utc>>,
    /// Time spent in the current state.
    pub uptime: Duration,
}

#[derive(Debug, Clone, Copy)]
struct FailureStamp {
    at: Instant,
    wall: DateTime<Utc>,
}

#[derive(Debug)]
struct BreakerCore {
    state: CircuitState,
    failure_count: u32,
    success_count: u32,
    last_failure: Option<FailureStamp>,
    last_state_change: Instant,
    total_requests: u64,
    total_failures: u64,
    total_successes: u64,
}

impl BreakerCore {
    fn new(now: Instant) -> Self {
        Self {
            state: CircuitState::Closed,
            failure_count: 0,
            success_count: 0,
            last_failure: None,
            last_state_change: now,
            total_requests: 0,
            total_failures: 0,
            total_successes: 0,
        }
    }

    /// Move to `to`, resetting consecutive counters. No-op if already there.
    fn transition(
        &mut self,
        service: &str,
        to: CircuitState,
        reason: &'static str,
        now: Instant,
    ) -> Option<TransitionEvent> {
        if self.state == to {
            return None;
        }
        let event = TransitionEvent {
            service: service.to_string(),
            from: self.state,
            to,
            reason,
            failure_count: self.failure_count,
            success_count: self.success_count,
        };
        self.state = to;
        self.failure_count = 0;
        self.success_count = 0;
        self.last_state_change = now;
        Some(event)
    }
}

/// Guard for a single named dependency.
pub struct CircuitBreaker {
    name: String,
    config: BreakerConfig,
    core: Mutex<BreakerCore>,
    observer: Arc<dyn CircuitObserver>,
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("core", &*self.core.lock())
            .finish()
    }
}

impl CircuitBreaker {
    pub fn new(
        name: impl Into<String>,
        config: BreakerConfig,
        observer: Arc<dyn CircuitObserver>,
    ) -> Self {
        Self {
            name: name.into(),
            config,
            core: Mutex::new(BreakerCore::new(Instant::now())),
            observer,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    /// Current state, without evaluating the reset timeout.
    pub fn state(&self) -> CircuitState {
        self.core.lock().state
    }

    /// Decide whether a call may be attempted now.
    ///
    /// This is the only place an open circuit moves to half-open: once
    /// `reset_timeout` has elapsed since the last failure.
    pub fn admit(&self) -> bool {
        let now = Instant::now();
        let (admitted, transition) = {
            let mut core = self.core.lock();
            match core.state {
                CircuitState::Open => {
                    let cooled = core
                        .last_failure
                        .map_or(true, |f| now.duration_since(f.at) >= self.config.reset_timeout);
                    if cooled {
                        let t = core.transition(
                            &self.name,
                            CircuitState::HalfOpen,
                            "reset timeout elapsed",
                            now,
                        );
                        (true, t)
                    } else {
                        (false, None)
                    }
                }
                CircuitState::Closed | CircuitState::HalfOpen => (true, None),
            }
        };
        self.emit(None, transition);
        admitted
    }

    /// Record a successful call.
    pub fn record_success(&self) {
        let now = Instant::now();
        let transition = {
            let mut core = self.core.lock();
            core.total_requests += 1;
            core.total_successes += 1;
            match core.state {
                CircuitState::Closed => {
                    core.failure_count = 0;
                    None
                }
                CircuitState::HalfOpen => {
                    core.success_count += 1;
                    if core.success_count >= self.config.success_threshold {
                        core.transition(&self.name, CircuitState::Closed, "recovered", now)
                    } else {
                        None
                    }
                }
                // A call admitted before the circuit opened finished late.
                CircuitState::Open => None,
            }
        };
        self.emit(None, transition);
    }

    /// Record a failed or timed-out call.
    pub fn record_failure(&self, kind: FailureKind, error: &str) {
        let now = Instant::now();
        let (failure, transition) = {
            let mut core = self.core.lock();
            core.total_requests += 1;
            core.total_failures += 1;
            core.last_failure = Some(FailureStamp {
                at: now,
                wall: Utc::now(),
            });

            let transition = match core.state {
                CircuitState::Closed => {
                    core.failure_count += 1;
                    if core.failure_count >= self.config.failure_threshold {
                        core.transition(
                            &self.name,
                            CircuitState::Open,
                            "failure threshold reached",
                            now,
                        )
                    } else {
                        None
                    }
                }
                CircuitState::HalfOpen => {
                    core.failure_count += 1;
                    core.transition(&self.name, CircuitState::Open, "probe failed", now)
                }
                CircuitState::Open => None,
            };

            let failure_count = transition
                .as_ref()
                .map_or(core.failure_count, |t| t.failure_count);
            let failure = FailureEvent {
                service: self.name.clone(),
                kind,
                error: error.to_string(),
                failure_count,
                failure_threshold: self.config.failure_threshold,
            };
            (failure, transition)
        };
        self.emit(Some(failure), transition);
    }

    /// Force the breaker back to a freshly created condition.
    pub fn reset(&self) {
        let now = Instant::now();
        let transition = {
            let mut core = self.core.lock();
            let transition = core.transition(&self.name, CircuitState::Closed, "manual reset", now);
            *core = BreakerCore::new(now);
            transition
        };
        tracing::info!(service = %self.name, "Circuit breaker reset");
        self.emit(None, transition);
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let now = Instant::now();
        let core = self.core.lock();
        BreakerSnapshot {
            name: self.name.clone(),
            config: self.config,
            state: core.state,
            failure_count: core.failure_count,
            success_count: core.success_count,
            total_requests: core.total_requests,
            total_failures: core.total_failures,
            total_successes: core.total_successes,
            last_failure_at: core.last_failure.map(|f| f.wall),
            uptime: now.saturating_duration_since(core.last_state_change),
        }
    }

    fn emit(&self, failure: Option<FailureEvent>, transition: Option<TransitionEvent>) {
        if let Some(event) = failure {
            notify(&self.name, || self.observer.on_failure(&event));
        }
        if let Some(event) = transition {
            notify(&self.name, || self.observer.on_transition(&event));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::events::NoopObserver;

    fn breaker(failure_threshold: u32, success_threshold: u32) -> CircuitBreaker {
        let config = BreakerConfig {
            failure_threshold,
            success_threshold,
            reset_timeout: Duration::from_millis(100),
            request_timeout: None,
        };
        CircuitBreaker::new("test", config, Arc::new(NoopObserver))
    }

    #[test]
    fn test_starts_closed_and_empty() {
        let cb = breaker(3, 2);
        let snap = cb.snapshot();
        assert_eq!(snap.state, CircuitState::Closed);
        assert_eq!(snap.failure_count, 0);
        assert_eq!(snap.success_count, 0);
        assert_eq!(snap.total_requests, 0);
        assert_eq!(snap.total_failures, 0);
        assert_eq!(snap.total_successes, 0);
        assert!(snap.last_failure_at.is_none());
    }

    #[test]
    fn test_opens_on_threshold() {
        let cb = breaker(3, 2);
        cb.record_failure(FailureKind::Error, "boom");
        cb.record_failure(FailureKind::Error, "boom");
        assert_eq!(cb.state(), CircuitState::Closed);
        assert_eq!(cb.snapshot().failure_count, 2);

        cb.record_failure(FailureKind::Error, "boom");
        let snap = cb.snapshot();
        assert_eq!(snap.state, CircuitState::Open);
        assert_eq!(snap.failure_count, 0);
        assert!(snap.last_failure_at.is_some());
    }

    #[test]
    fn test_success_clears_consecutive_failures() {
        let cb = breaker(3, 2);
        cb.record_failure(FailureKind::Error, "boom");
        cb.record_failure(FailureKind::Timeout, "slow");
        cb.record_success();
        assert_eq!(cb.snapshot().failure_count, 0);

        cb.record_failure(FailureKind::Error, "boom");
        cb.record_failure(FailureKind::Error, "boom");
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_half_open_failure_reopens_immediately() {
        let cb = breaker(3, 2);
        for _ in 0..3 {
            cb.record_failure(FailureKind::Error, "boom");
        }
        assert!(!cb.admit());

        tokio::time::advance(Duration::from_millis(100)).await;
        assert!(cb.admit());
        assert_eq!(cb.state(), CircuitState::HalfOpen);

        cb.record_failure(FailureKind::Error, "still down");
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(!cb.admit());
    }

    #[tokio::test(start_paused = true)]
    async fn test_half_open_closes_after_successes() {
        let cb = breaker(1, 2);
        cb.record_failure(FailureKind::Error, "boom");
        tokio::time::advance(Duration::from_millis(150)).await;
        assert!(cb.admit());

        cb.record_success();
        let snap = cb.snapshot();
        assert_eq!(snap.state, CircuitState::HalfOpen);
        assert_eq!(snap.success_count, 1);

        cb.record_success();
        let snap = cb.snapshot();
        assert_eq!(snap.state, CircuitState::Closed);
        assert_eq!(snap.success_count, 0);
        assert_eq!(snap.failure_count, 0);
    }

    #[test]
    fn test_late_outcome_while_open_keeps_state() {
        let cb = breaker(1, 1);
        cb.record_failure(FailureKind::Error, "boom");
        cb.record_success();
        cb.record_failure(FailureKind::Error, "late");

        let snap = cb.snapshot();
        assert_eq!(snap.state, CircuitState::Open);
        assert_eq!(snap.total_requests, 3);
        assert_eq!(snap.total_requests, snap.total_failures + snap.total_successes);
    }

    #[test]
    fn test_reset_from_open() {
        let cb = breaker(1, 1);
        cb.record_success();
        cb.record_failure(FailureKind::Error, "boom");
        assert_eq!(cb.state(), CircuitState::Open);

        cb.reset();
        let snap = cb.snapshot();
        assert_eq!(snap.state, CircuitState::Closed);
        assert_eq!(snap.total_requests, 0);
        assert_eq!(snap.total_failures, 0);
        assert_eq!(snap.total_successes, 0);
        assert!(snap.last_failure_at.is_none());
        assert!(cb.admit());
    }

    #[tokio::test(start_paused = true)]
    async fn test_uptime_measures_time_in_current_state() {
        let cb = breaker(2, 1);
        assert_eq!(cb.snapshot().uptime, Duration::ZERO);

        tokio::time::advance(Duration::from_secs(7)).await;
        cb.record_failure(FailureKind::Error, "boom");
        assert_eq!(cb.snapshot().uptime, Duration::from_secs(7));

        cb.record_failure(FailureKind::Error, "boom");
        let snap = cb.snapshot();
        assert_eq!(snap.state, CircuitState::Open);
        assert_eq!(snap.uptime, Duration::ZERO);

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cb.snapshot().uptime, Duration::from_secs(2));
    }
}
