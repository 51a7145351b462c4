//! Standalone demo host for the health check and admin API.
//!
//! Breaker state lives in the process that calls `execute`. A chat backend
//! mounts [`HttpServer::build_router`] next to its own routes so `/health` and
//! `/admin/*` see the registry its handlers use:
//!
//! ```text
//!     chat handlers ──execute()──▶ CircuitRegistry ──▶ dependency
//!                                        │
//!                                        ▼
//!                                 HealthReporter ◀── /health, /admin/*
//! ```
//!
//! This binary owns a registry nothing else writes to, so its circuit list
//! stays empty. Use it to try the admin surface and `guard-cli`.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use chat_guard::lifecycle::signals::shutdown_on_ctrl_c;
use chat_guard::lifecycle::startup::{build_reporter, prepare_config, StartupError};
use chat_guard::observability::{logging, metrics};
use chat_guard::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(
    name = "chat-guard",
    version,
    about = "Demo host for the chat-guard health check and admin API",
    long_about = "Demo host for the chat-guard health check and admin API.\n\n\
        Circuit breakers are process-local: this binary only sees calls made \
        inside it, so its circuits stay empty. In production, mount \
        HttpServer::build_router inside the chat backend that owns the registry."
)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "CHAT_GUARD_CONFIG")]
    config: Option<PathBuf>,

    /// Bearer key for `/admin/*`; overrides `[admin].api_key`.
    #[arg(long, env = "CHAT_GUARD_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let args = Args::parse();
    let config = prepare_config(args.config.as_deref(), args.api_key)?;

    logging::init_logging(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        admin_address = %config.admin.bind_address,
        overrides = config.services.len(),
        "chat-guard starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let bind: SocketAddr = config
        .admin
        .bind_address
        .parse()
        .map_err(|source| StartupError::BindAddress {
            address: config.admin.bind_address.clone(),
            source,
        })?;
    let listener = TcpListener::bind(bind).await?;

    let reporter = build_reporter(&config);
    let server = HttpServer::new(reporter, &config.admin.api_key);

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server_task = tokio::spawn(server.run(listener, server_shutdown));

    shutdown_on_ctrl_c(&shutdown).await;

    match server_task.await {
        Ok(result) => result?,
        Err(e) => tracing::error!(error = %e, "Server task panicked"),
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
