//! Graceful degradation for a chat backend's unreliable dependencies.
//!
//! Each named dependency (completion service, database, cache, third-party
//! APIs) gets a circuit breaker. Callers go through
//! [`CircuitRegistry::execute`] and receive either the real result or their
//! fallback value; a failing dependency is skipped until its reset timeout
//! elapses, then probed.
//!
//! ```no_run
//! # async fn demo() {
//! use chat_guard::{CircuitRegistry, ConfigResolver};
//!
//! let registry = CircuitRegistry::new(ConfigResolver::default());
//! let reply = registry
//!     .execute(
//!         "openai",
//!         |_cancel| async { Ok::<_, String>("hello".to_string()) },
//!         "The assistant is unavailable right now.".to_string(),
//!     )
//!     .await;
//! # let _ = reply;
//! # }
//! ```

pub mod admin;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::{BreakerConfig, ConfigResolver, GuardConfig};
pub use health::HealthReporter;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use resilience::{CircuitRegistry, CircuitState, ExecuteError};
