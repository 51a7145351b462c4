//! Circuit breaker registry.
//!
//! One breaker per dependency name, created lazily on first reference. The
//! registry is an owned value; hosts share it through `Arc` rather than a
//! process-wide global, so independent instances never see each other.

use std::sync::Arc;

use dashmap::DashMap;

use crate::config::{BreakerConfig, ConfigResolver};
use crate::observability::observer::TracingObserver;
use crate::resilience::circuit_breaker::{BreakerSnapshot, CircuitBreaker};
use crate::resilience::events::{notify, CircuitObserver, CircuitState, FailureKind};

/// Keyed store of circuit breakers.
pub struct CircuitRegistry {
    breakers: DashMap<String, Arc<CircuitBreaker>>,
    resolver: ConfigResolver,
    observer: Arc<dyn CircuitObserver>,
}

impl CircuitRegistry {
    /// Create a registry that reports through [`TracingObserver`].
    pub fn new(resolver: ConfigResolver) -> Self {
        Self::with_observer(resolver, Arc::new(TracingObserver))
    }

    pub fn with_observer(resolver: ConfigResolver, observer: Arc<dyn CircuitObserver>) -> Self {
        Self {
            breakers: DashMap::new(),
            resolver,
            observer,
        }
    }

    /// Get or create the breaker for `name`.
    pub fn breaker(&self, name: &str) -> Arc<CircuitBreaker> {
        if let Some(existing) = self.breakers.get(name) {
            return existing.clone();
        }

        let mut created = false;
        let breaker = self
            .breakers
            .entry(name.to_string())
            .or_insert_with(|| {
                created = true;
                Arc::new(CircuitBreaker::new(
                    name,
                    self.resolver.resolve(name),
                    self.observer.clone(),
                ))
            })
            .clone();

        if created {
            notify(name, || self.observer.on_created(name, breaker.config()));
        }
        breaker
    }

    /// Look up an existing breaker without creating one.
    pub fn get(&self, name: &str) -> Option<Arc<CircuitBreaker>> {
        self.breakers.get(name).map(|b| b.clone())
    }

    /// Effective config for `name`, whether or not a breaker exists yet.
    pub fn config_for(&self, name: &str) -> BreakerConfig {
        self.get(name)
            .map(|b| *b.config())
            .unwrap_or_else(|| self.resolver.resolve(name))
    }

    pub fn record_success(&self, name: &str) {
        self.breaker(name).record_success();
    }

    pub fn record_failure(&self, name: &str, kind: FailureKind, error: &str) {
        self.breaker(name).record_failure(kind, error);
    }

    /// True if `name` has a breaker and it is currently open.
    pub fn is_open(&self, name: &str) -> bool {
        self.get(name)
            .is_some_and(|b| b.state() == CircuitState::Open)
    }

    /// Force `name` back to CLOSED with zeroed counters.
    ///
    /// Returns false if no breaker was ever created for `name`.
    pub fn reset(&self, name: &str) -> bool {
        match self.get(name) {
            Some(breaker) => {
                breaker.reset();
                true
            }
            None => false,
        }
    }

    /// Drop every breaker.
    pub fn clear_all(&self) {
        self.breakers.clear();
        tracing::info!("Circuit registry cleared");
    }

    /// Snapshots of every breaker, sorted by name.
    pub fn snapshots(&self) -> Vec<BreakerSnapshot> {
        let breakers: Vec<_> = self.breakers.iter().map(|e| e.value().clone()).collect();
        let mut snapshots: Vec<_> = breakers.iter().map(|b| b.snapshot()).collect();
        snapshots.sort_by(|a, b| a.name.cmp(&b.name));
        snapshots
    }

    pub fn len(&self) -> usize {
        self.breakers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakers.is_empty()
    }
}

impl Default for CircuitRegistry {
    fn default() -> Self {
        Self::new(ConfigResolver::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BreakerOverride;
    use crate::resilience::events::NoopObserver;

    fn registry() -> CircuitRegistry {
        let resolver = ConfigResolver::default().with_override(
            "openai",
            BreakerOverride {
                failure_threshold: Some(3),
                ..Default::default()
            },
        );
        CircuitRegistry::with_observer(resolver, Arc::new(NoopObserver))
    }

    #[test]
    fn test_breaker_created_once() {
        let registry = registry();
        let a = registry.breaker("openai");
        let b = registry.breaker("openai");
        let c = registry.breaker("postgres");

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(registry.len(), 2);
        assert_eq!(a.config().failure_threshold, 3);
        assert_eq!(c.config().failure_threshold, 5);
    }

    #[test]
    fn test_lookups_do_not_create() {
        let registry = registry();
        assert!(registry.get("openai").is_none());
        assert!(!registry.is_open("openai"));
        assert!(!registry.reset("openai"));
        assert_eq!(registry.config_for("openai").failure_threshold, 3);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_record_by_name() {
        let registry = registry();
        for _ in 0..3 {
            registry.record_failure("openai", FailureKind::Error, "503");
        }
        assert!(registry.is_open("openai"));

        assert!(registry.reset("openai"));
        assert!(!registry.is_open("openai"));
    }

    #[test]
    fn test_clear_all() {
        let registry = registry();
        registry.record_success("redis");
        registry.record_success("postgres");
        assert_eq!(registry.snapshots().len(), 2);
        assert_eq!(registry.snapshots()[0].name, "postgres");

        registry.clear_all();
        assert!(registry.is_empty());
    }
}
