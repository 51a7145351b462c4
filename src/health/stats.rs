//! Per-dependency statistics.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::config::BreakerConfig;
use crate::resilience::{BreakerSnapshot, CircuitState};

/// Read-only statistics for one dependency.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStats {
    pub service: String,
    pub state: CircuitState,
    pub failure_count: u32,
    pub success_count: u32,
    pub total_requests: u64,
    pub total_failures: u64,
    pub total_successes: u64,
    /// Percentage of failed requests, two decimals.
    pub failure_rate: f64,
    #[serde(rename = "uptimeMs", serialize_with = "as_millis")]
    pub uptime: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_failure: Option<DateTime<Utc>>,
    pub failure_threshold: u32,
    pub success_threshold: u32,
    pub reset_timeout_ms: u64,
}

fn as_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// `failures / requests * 100`, rounded to two decimals; 0 with no requests.
pub fn failure_rate(total_failures: u64, total_requests: u64) -> f64 {
    if total_requests == 0 {
        return 0.0;
    }
    let rate = total_failures as f64 / total_requests as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}

impl ServiceStats {
    /// Stats for a dependency that has never been called.
    pub fn unreferenced(service: &str, config: &BreakerConfig) -> Self {
        Self {
            service: service.to_string(),
            state: CircuitState::Closed,
            failure_count: 0,
            success_count: 0,
            total_requests: 0,
            total_failures: 0,
            total_successes: 0,
            failure_rate: 0.0,
            uptime: Duration::ZERO,
            last_failure: None,
            failure_threshold: config.failure_threshold,
            success_threshold: config.success_threshold,
            reset_timeout_ms: config.reset_timeout.as_millis() as u64,
        }
    }
}

impl From<BreakerSnapshot> for ServiceStats {
    fn from(snap: BreakerSnapshot) -> Self {
        Self {
            failure_rate: failure_rate(snap.total_failures, snap.total_requests),
            failure_threshold: snap.config.failure_threshold,
            success_threshold: snap.config.success_threshold,
            reset_timeout_ms: snap.config.reset_timeout.as_millis() as u64,
            service: snap.name,
            state: snap.state,
            failure_count: snap.failure_count,
            success_count: snap.success_count,
            total_requests: snap.total_requests,
            total_failures: snap.total_failures,
            total_successes: snap.total_successes,
            uptime: snap.uptime,
            last_failure: snap.last_failure_at,
        }
    }
}
