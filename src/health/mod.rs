//! Health and statistics reporting.
//!
//! # Data Flow
//! ```text
//! Health-check endpoint / admin API
//!     → HealthReporter
//!         → registry snapshots (read-only, no breaker is created)
//!         → stats.rs  (per-dependency counters, failure rate, uptime)
//!         → system.rs (aggregate health, open circuits)
//!         → fallback.rs (caller-facing degraded payload)
//! ```

pub mod fallback;
pub mod stats;
pub mod system;

use std::sync::Arc;

pub use fallback::{FallbackMessages, FallbackResponse};
pub use stats::ServiceStats;
pub use system::{ServiceHealth, SystemHealth};

use crate::resilience::CircuitRegistry;

/// Read-side view over a [`CircuitRegistry`], plus the operator entry points.
pub struct HealthReporter {
    registry: Arc<CircuitRegistry>,
    messages: FallbackMessages,
}

impl HealthReporter {
    pub fn new(registry: Arc<CircuitRegistry>, messages: FallbackMessages) -> Self {
        Self { registry, messages }
    }

    pub fn registry(&self) -> &Arc<CircuitRegistry> {
        &self.registry
    }

    /// Stats for `name`; a dependency never called reports zeroes.
    pub fn service_stats(&self, name: &str) -> ServiceStats {
        match self.registry.get(name) {
            Some(breaker) => breaker.snapshot().into(),
            None => ServiceStats::unreferenced(name, &self.registry.config_for(name)),
        }
    }

    /// Stats for `name` only if a breaker exists for it.
    pub fn known_service_stats(&self, name: &str) -> Option<ServiceStats> {
        self.registry.get(name).map(|b| b.snapshot().into())
    }

    /// Stats for every registered dependency, sorted by name.
    pub fn all_service_statuses(&self) -> Vec<ServiceStats> {
        self.registry
            .snapshots()
            .into_iter()
            .map(ServiceStats::from)
            .collect()
    }

    pub fn system_health(&self) -> SystemHealth {
        SystemHealth::from_snapshots(&self.registry.snapshots())
    }

    pub fn is_circuit_open(&self, name: &str) -> bool {
        self.registry.is_open(name)
    }

    /// Degraded payload for `name`, preferring `custom_message` when given.
    pub fn fallback_response(&self, name: &str, custom_message: Option<&str>) -> FallbackResponse {
        let error = custom_message
            .unwrap_or_else(|| self.messages.message_for(name))
            .to_string();
        FallbackResponse {
            error,
            service: name.to_string(),
            fallback: true,
            retry_after: self.registry.config_for(name).retry_after_secs(),
        }
    }

    /// Operator reset; false if `name` was never referenced.
    pub fn reset_circuit_breaker(&self, name: &str) -> bool {
        self.registry.reset(name)
    }

    /// Drop every breaker. Intended for test harnesses.
    pub fn clear_all(&self) {
        self.registry.clear_all();
    }
}
