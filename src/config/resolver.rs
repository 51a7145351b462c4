//! Effective per-dependency breaker configuration.

use std::collections::HashMap;
use std::time::Duration;

use crate::config::schema::{BreakerOverride, BreakerPolicy, GuardConfig};

/// Resolved, immutable policy for one dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerConfig {
    pub failure_threshold: u32,
    pub success_threshold: u32,
    pub reset_timeout: Duration,
    pub request_timeout: Option<Duration>,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self::from_policy(&BreakerPolicy::default())
    }
}

impl BreakerConfig {
    fn from_policy(policy: &BreakerPolicy) -> Self {
        Self {
            failure_threshold: policy.failure_threshold,
            success_threshold: policy.success_threshold,
            reset_timeout: Duration::from_millis(policy.reset_timeout_ms),
            request_timeout: timeout_from_millis(policy.request_timeout_ms),
        }
    }

    /// Seconds a client should wait before retrying, rounded up.
    pub fn retry_after_secs(&self) -> u64 {
        let millis = self.reset_timeout.as_millis() as u64;
        millis.div_ceil(1000)
    }
}

fn timeout_from_millis(ms: Option<u64>) -> Option<Duration> {
    ms.filter(|ms| *ms > 0).map(Duration::from_millis)
}

/// Merges the global default policy with named overrides.
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    defaults: BreakerPolicy,
    overrides: HashMap<String, BreakerOverride>,
}

impl ConfigResolver {
    pub fn new(defaults: BreakerPolicy) -> Self {
        Self {
            defaults,
            overrides: HashMap::new(),
        }
    }

    pub fn from_config(config: &GuardConfig) -> Self {
        Self {
            defaults: config.defaults.clone(),
            overrides: config.services.clone(),
        }
    }

    /// Register an override for `name`, replacing any previous one.
    pub fn with_override(mut self, name: impl Into<String>, policy: BreakerOverride) -> Self {
        self.overrides.insert(name.into(), policy);
        self
    }

    /// Resolve the effective config for `name`.
    ///
    /// Each field falls back to the default independently; unknown names get
    /// the defaults unchanged.
    pub fn resolve(&self, name: &str) -> BreakerConfig {
        let Some(o) = self.overrides.get(name) else {
            return BreakerConfig::from_policy(&self.defaults);
        };

        let merged = BreakerPolicy {
            failure_threshold: o.failure_threshold.unwrap_or(self.defaults.failure_threshold),
            success_threshold: o.success_threshold.unwrap_or(self.defaults.success_threshold),
            reset_timeout_ms: o.reset_timeout_ms.unwrap_or(self.defaults.reset_timeout_ms),
            request_timeout_ms: o.request_timeout_ms.or(self.defaults.request_timeout_ms),
        };
        BreakerConfig::from_policy(&merged)
    }
}
