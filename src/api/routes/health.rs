//! Health Routes
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (database reachable)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use std::time::Duration;

use crate::api::dto::HealthResponse;
use crate::AppState;

/// GET /health/live
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Returns 503 while the database cannot be reached.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    if check_database(&state).await.is_some() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let latency = check_database(&state).await;
    let database_ok = latency.is_some();

    Json(HealthResponse {
        status: if database_ok { "healthy" } else { "unhealthy" }.to_string(),
        database: if database_ok { "ok" } else { "error" }.to_string(),
        database_latency_ms: latency.map(|d| d.as_millis() as u64),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn check_database(state: &AppState) -> Option<Duration> {
    match state.database.ping().await {
        Ok(latency) => Some(latency),
        Err(e) => {
            tracing::warn!("Database health check failed: {}", e);
            None
        }
    }
}
