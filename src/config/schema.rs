//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the guard.
//! All types derive Serde traits for deserialization from config files.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the degradation service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GuardConfig {
    /// Policy applied to every dependency without an override.
    pub defaults: BreakerPolicy,

    /// Per-dependency overrides keyed by dependency name.
    pub services: HashMap<String, BreakerOverride>,

    /// Caller-facing messages used when a dependency is degraded.
    pub fallback_messages: HashMap<String, String>,

    /// Admin and health-check HTTP surface.
    pub admin: AdminConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Complete breaker policy.
///
/// Timeouts are stored in milliseconds so config files stay readable.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct BreakerPolicy {
    /// Consecutive failures in CLOSED before the circuit opens.
    pub failure_threshold: u32,

    /// Consecutive successes in HALF_OPEN before the circuit closes.
    pub success_threshold: u32,

    /// Cooldown before an open circuit may probe again.
    pub reset_timeout_ms: u64,

    /// Per-call deadline. `None` or `0` disables the timeout race.
    pub request_timeout_ms: Option<u64>,
}

impl Default for BreakerPolicy {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 3,
            reset_timeout_ms: 30_000,
            request_timeout_ms: Some(10_000),
        }
    }
}

/// Partial policy for a single dependency. Unset fields inherit the defaults.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct BreakerOverride {
    pub failure_threshold: Option<u32>,
    pub success_threshold: Option<u32>,
    pub reset_timeout_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Bind address (e.g., "0.0.0.0:8081").
    pub bind_address: String,

    /// Bearer token required on `/admin/*` routes. There is no default; an
    /// empty key fails validation.
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8081".to_string(),
            api_key: String::new(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log format for the fmt layer.
    pub log_format: LogFormat,

    /// Default filter directive when `RUST_LOG` is unset.
    pub log_level: String,

    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Prometheus scrape address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            log_level: "chat_guard=info,tower_http=info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: GuardConfig = toml::from_str("").unwrap();
        assert_eq!(config.defaults, BreakerPolicy::default());
        assert!(config.services.is_empty());
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
        assert!(config.admin.api_key.is_empty());
    }

    #[test]
    fn test_partial_override_parses() {
        let config: GuardConfig = toml::from_str(
            r#"
            [services.redis]
            failure_threshold = 10
            reset_timeout_ms = 5000

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        let redis = &config.services["redis"];
        assert_eq!(redis.failure_threshold, Some(10));
        assert_eq!(redis.success_threshold, None);
        assert_eq!(redis.reset_timeout_ms, Some(5000));
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }
}
