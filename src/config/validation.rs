//! Configuration validation.
//!
//! Semantic checks run after serde has accepted the document. Every problem is
//! collected so an operator can fix a config file in one pass.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{BreakerOverride, BreakerPolicy, GuardConfig};

/// Keys copied from sample configs; accepting them would leave `/admin/*` open.
const PLACEHOLDER_KEYS: &[&str] = &["admin-secret-key", "changeme", "..."];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration, returning all errors found.
pub fn validate_config(config: &GuardConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_policy("defaults", &config.defaults, &mut errors);

    let mut names: Vec<_> = config.services.keys().collect();
    names.sort();
    for name in names {
        check_override(&format!("services.{name}"), &config.services[name], &mut errors);
    }

    if config.admin.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "admin.bind_address",
            format!("'{}' is not a socket address", config.admin.bind_address),
        ));
    }
    let api_key = config.admin.api_key.trim();
    if api_key.is_empty() {
        errors.push(ValidationError::new("admin.api_key", "must be set"));
    } else if PLACEHOLDER_KEYS.contains(&api_key) {
        errors.push(ValidationError::new(
            "admin.api_key",
            format!("'{api_key}' is a placeholder, choose a real secret"),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "'{}' is not a socket address",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_policy(prefix: &str, policy: &BreakerPolicy, errors: &mut Vec<ValidationError>) {
    check_override(
        prefix,
        &BreakerOverride {
            failure_threshold: Some(policy.failure_threshold),
            success_threshold: Some(policy.success_threshold),
            reset_timeout_ms: Some(policy.reset_timeout_ms),
            request_timeout_ms: policy.request_timeout_ms,
        },
        errors,
    );
}

fn check_override(prefix: &str, policy: &BreakerOverride, errors: &mut Vec<ValidationError>) {
    if policy.failure_threshold == Some(0) {
        errors.push(ValidationError::new(
            format!("{prefix}.failure_threshold"),
            "must be greater than 0",
        ));
    }
    if policy.success_threshold == Some(0) {
        errors.push(ValidationError::new(
            format!("{prefix}.success_threshold"),
            "must be greater than 0",
        ));
    }
    if policy.reset_timeout_ms == Some(0) {
        errors.push(ValidationError::new(
            format!("{prefix}.reset_timeout_ms"),
            "must be greater than 0",
        ));
    }
}
