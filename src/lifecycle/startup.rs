//! Startup orchestration.
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Config first, then observability, then the registry, listener last

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::config::{read_config, validate_config, ConfigError, ConfigResolver, GuardConfig};
use crate::health::{FallbackMessages, HealthReporter};
use crate::resilience::CircuitRegistry;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to initialise logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),

    #[error("invalid bind address '{address}': {source}")]
    BindAddress {
        address: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Load the config file if one was given, else built-in defaults, then apply
/// `api_key` over `[admin].api_key` and validate the result.
pub fn prepare_config(
    path: Option<&Path>,
    api_key: Option<String>,
) -> Result<GuardConfig, StartupError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => GuardConfig::default(),
    };
    if let Some(key) = api_key {
        config.admin.api_key = key;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Build the registry and reporter described by `config`.
pub fn build_reporter(config: &GuardConfig) -> Arc<HealthReporter> {
    let registry = Arc::new(CircuitRegistry::new(ConfigResolver::from_config(config)));
    let messages = FallbackMessages::with_overrides(&config.fallback_messages);
    Arc::new(HealthReporter::new(registry, messages))
}
