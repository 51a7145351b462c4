//! Metrics collection and exposition.
//!
//! # Metrics
//! - `guard_circuit_transitions_total` (counter): state changes by service, from, to
//! - `guard_operation_failures_total` (counter): failures by service, kind
//! - `guard_calls_skipped_total` (counter): calls short-circuited by an open circuit
//! - `guard_circuit_state` (gauge): 0=closed, 1=half-open, 2=open
//!
//! Recording is a no-op until a recorder is installed, so library users that
//! never call [`init_metrics`] pay almost nothing.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::resilience::{CircuitState, FailureKind};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Prometheus exporter listening"),
        Err(e) => tracing::error!(
            address = %addr,
            error = %e,
            "Failed to install Prometheus exporter"
        ),
    }
}

fn state_value(state: CircuitState) -> f64 {
    match state {
        CircuitState::Closed => 0.0,
        CircuitState::HalfOpen => 1.0,
        CircuitState::Open => 2.0,
    }
}

pub fn record_transition(service: &str, from: CircuitState, to: CircuitState) {
    metrics::counter!(
        "guard_circuit_transitions_total",
        "service" => service.to_string(),
        "from" => from.to_string(),
        "to" => to.to_string()
    )
    .increment(1);
    record_state(service, to);
}

pub fn record_state(service: &str, state: CircuitState) {
    metrics::gauge!("guard_circuit_state", "service" => service.to_string())
        .set(state_value(state));
}

pub fn record_failure(service: &str, kind: FailureKind) {
    metrics::counter!(
        "guard_operation_failures_total",
        "service" => service.to_string(),
        "kind" => kind.as_str()
    )
    .increment(1);
}

pub fn record_skip(service: &str) {
    metrics::counter!("guard_calls_skipped_total", "service" => service.to_string()).increment(1);
}
