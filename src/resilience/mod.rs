//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to a dependency:
//!     → registry.rs (breaker for the dependency name, created lazily)
//!     → circuit_breaker.rs (admit? maybe probe after reset timeout)
//!     → timeouts.rs (race the call against its request timeout)
//!     → circuit_breaker.rs (record outcome, maybe transition)
//!     → events.rs (observer notified outside the breaker lock)
//! ```
//!
//! # Design Decisions
//! - Every external call has a deadline unless its config disables it
//! - Callers get the real result or their fallback, never an error
//! - Breaker state is process-local and never persisted

pub mod circuit_breaker;
pub mod events;
pub mod executor;
pub mod registry;
pub mod timeouts;

pub use circuit_breaker::{BreakerSnapshot, CircuitBreaker};
pub use events::{
    CircuitObserver, CircuitState, FailureEvent, FailureKind, NoopObserver, TransitionEvent,
};
pub use executor::ExecuteError;
pub use registry::CircuitRegistry;
