//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use chat_guard::config::{BreakerConfig, BreakerOverride, ConfigResolver};
use chat_guard::resilience::{CircuitObserver, FailureEvent, TransitionEvent};
use chat_guard::CircuitRegistry;

/// Observer that keeps every notification for later assertions.
#[derive(Default)]
pub struct RecordingObserver {
    pub created: Mutex<Vec<String>>,
    pub transitions: Mutex<Vec<TransitionEvent>>,
    pub failures: Mutex<Vec<FailureEvent>>,
}

impl CircuitObserver for RecordingObserver {
    fn on_created(&self, service: &str, _config: &BreakerConfig) {
        self.created.lock().push(service.to_string());
    }

    fn on_transition(&self, event: &TransitionEvent) {
        self.transitions.lock().push(event.clone());
    }

    fn on_failure(&self, event: &FailureEvent) {
        self.failures.lock().push(event.clone());
    }
}

/// Resolver with the overrides a typical chat deployment carries.
pub fn chat_resolver() -> ConfigResolver {
    ConfigResolver::default()
        .with_override(
            "openai",
            BreakerOverride {
                failure_threshold: Some(3),
                reset_timeout_ms: Some(20_000),
                ..Default::default()
            },
        )
        .with_override(
            "redis",
            BreakerOverride {
                failure_threshold: Some(10),
                reset_timeout_ms: Some(5_000),
                ..Default::default()
            },
        )
        .with_override(
            "weather",
            BreakerOverride {
                request_timeout_ms: Some(10_000),
                reset_timeout_ms: Some(120_000),
                ..Default::default()
            },
        )
}

pub fn recorded_registry() -> (Arc<CircuitRegistry>, Arc<RecordingObserver>) {
    let observer = Arc::new(RecordingObserver::default());
    let registry = Arc::new(CircuitRegistry::with_observer(chat_resolver(), observer.clone()));
    (registry, observer)
}

/// Counts invocations of a wrapped operation.
#[derive(Clone, Default)]
pub struct CallSpy {
    calls: Arc<AtomicU32>,
}

impl CallSpy {
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn succeed(&self, value: &'static str) -> Result<&'static str, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    }

    pub async fn fail(&self) -> Result<&'static str, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err("upstream returned 503".to_string())
    }

    pub async fn slow(&self, delay: Duration) -> Result<&'static str, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(delay).await;
        Ok("late")
    }
}
