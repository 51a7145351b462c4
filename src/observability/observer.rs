//! Default circuit observer: structured logs plus metrics.

use crate::config::BreakerConfig;
use crate::observability::metrics;
use crate::resilience::{CircuitObserver, CircuitState, FailureEvent, TransitionEvent};

/// Reports breaker events through `tracing` and the `metrics` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl CircuitObserver for TracingObserver {
    fn on_created(&self, service: &str, config: &BreakerConfig) {
        tracing::info!(
            service = %service,
            failure_threshold = config.failure_threshold,
            success_threshold = config.success_threshold,
            reset_timeout_ms = config.reset_timeout.as_millis() as u64,
            request_timeout_ms = config.request_timeout.map(|d| d.as_millis() as u64),
            "Circuit breaker created"
        );
        metrics::record_state(service, CircuitState::Closed);
    }

    fn on_transition(&self, event: &TransitionEvent) {
        match event.to {
            CircuitState::Open => tracing::warn!(
                service = %event.service,
                from = %event.from,
                to = %event.to,
                reason = event.reason,
                failure_count = event.failure_count,
                success_count = event.success_count,
                "Circuit opened, failing fast"
            ),
            CircuitState::HalfOpen => tracing::info!(
                service = %event.service,
                from = %event.from,
                to = %event.to,
                reason = event.reason,
                "Circuit half-open, probing dependency"
            ),
            CircuitState::Closed => tracing::info!(
                service = %event.service,
                from = %event.from,
                to = %event.to,
                reason = event.reason,
                success_count = event.success_count,
                "Circuit closed"
            ),
        }
        metrics::record_transition(&event.service, event.from, event.to);
    }

    fn on_failure(&self, event: &FailureEvent) {
        tracing::warn!(
            service = %event.service,
            kind = %event.kind,
            error = %event.error,
            failure_count = event.failure_count,
            failure_threshold = event.failure_threshold,
            "Dependency call failed"
        );
        metrics::record_failure(&event.service, event.kind);
    }
}
