//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Circuit breakers produce:
//!     → observer.rs (creation, transition and failure events)
//!         → logging.rs (structured log events)
//!         → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;
pub mod observer;

pub use observer::TracingObserver;
