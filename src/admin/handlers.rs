use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::health::{ServiceStats, SystemHealth};
use crate::http::server::AppState;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub circuits: usize,
}

/// Public health check: 200 when no circuit is open, 503 otherwise.
pub async fn get_health(State(state): State<AppState>) -> (StatusCode, Json<SystemHealth>) {
    let health = state.reporter.system_health();
    let status = if health.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(health))
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let health = state.reporter.system_health();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: if health.healthy { "operational" } else { "degraded" },
        circuits: health.services.len(),
    })
}

pub async fn get_circuits(State(state): State<AppState>) -> Json<Vec<ServiceStats>> {
    Json(state.reporter.all_service_statuses())
}

pub async fn get_circuit(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ServiceStats>, StatusCode> {
    state
        .reporter
        .known_service_stats(&name)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn reset_circuit(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ServiceStats>, StatusCode> {
    if !state.reporter.reset_circuit_breaker(&name) {
        return Err(StatusCode::NOT_FOUND);
    }
    tracing::info!(service = %name, "Circuit reset via admin API");
    Ok(Json(state.reporter.service_stats(&name)))
}
