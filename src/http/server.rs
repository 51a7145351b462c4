//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router for the health and admin surface
//! - Wire up middleware (tracing)
//! - Serve until the shutdown signal fires
//!
//! Breaker state is process-local, so the router belongs in the same process
//! as the handlers that call [`CircuitRegistry::execute`]. Hosts with their own
//! axum app merge [`HttpServer::build_router`] into it:
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use axum::{extract::State, routing::post, Router};
//! use chat_guard::health::{FallbackMessages, HealthReporter};
//! use chat_guard::http::{AppState, HttpServer};
//! use chat_guard::{CircuitRegistry, ConfigResolver};
//!
//! async fn chat(State(registry): State<Arc<CircuitRegistry>>) -> String {
//!     registry
//!         .execute(
//!             "openai",
//!             |_cancel| async { Ok::<_, String>("hi".to_string()) },
//!             "The assistant is unavailable.".to_string(),
//!         )
//!         .await
//! }
//!
//! let registry = Arc::new(CircuitRegistry::new(ConfigResolver::default()));
//! let reporter = Arc::new(HealthReporter::new(registry.clone(), FallbackMessages::default()));
//!
//! let app: Router = Router::new()
//!     .route("/chat", post(chat))
//!     .with_state(registry)
//!     .merge(HttpServer::build_router(AppState::new(reporter, "ops-key")));
//! # let _ = app;
//! ```
//!
//! [`CircuitRegistry::execute`]: crate::CircuitRegistry::execute

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::admin::setup_admin_router;
use crate::health::HealthReporter;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub reporter: Arc<HealthReporter>,
    pub api_key: Arc<str>,
}

impl AppState {
    pub fn new(reporter: Arc<HealthReporter>, api_key: &str) -> Self {
        Self {
            reporter,
            api_key: Arc::from(api_key),
        }
    }
}

/// HTTP server exposing `/health` and `/admin/*`.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(reporter: Arc<HealthReporter>, api_key: &str) -> Self {
        Self {
            router: Self::build_router(AppState::new(reporter, api_key)),
        }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The returned router carries its own state and can be merged into a
    /// host application's router.
    pub fn build_router(state: AppState) -> Router {
        setup_admin_router(state).layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
