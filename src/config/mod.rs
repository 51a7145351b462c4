//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GuardConfig (validated, immutable)
//!     → resolver.rs (per-dependency BreakerConfig on first use)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no hot reload
//! - All fields have defaults to allow minimal configs
//! - Overrides are partial; each field inherits the default independently

pub mod loader;
pub mod resolver;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, read_config, ConfigError};
pub use resolver::{BreakerConfig, ConfigResolver};
pub use schema::{
    AdminConfig, BreakerOverride, BreakerPolicy, GuardConfig, LogFormat, ObservabilityConfig,
};
pub use validation::{validate_config, ValidationError};
