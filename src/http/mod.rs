//! HTTP surface for health checks and administration.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tracing layer)
//!     → admin/ (health endpoint, bearer-protected admin routes)
//!     → HealthReporter
//! ```

pub mod server;

pub use server::{AppState, HttpServer};
