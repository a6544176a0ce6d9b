//! RankMe REST API
//!
//! HTTP layer built with Axum. Authenticated routes read the caller from the
//! `Authorization: Bearer` token; the payment webhook is authenticated by its
//! HMAC signature instead.
//!
//! # Endpoints
//!
//! ## Gameplay
//! - `GET /api/v1/scoring/tiers` - Tier table
//! - `GET /api/v1/profile` - Own profile
//! - `POST /api/v1/quiz/results` - Submit a quiz result
//! - `GET /api/v1/quiz/results` - Own recent plays
//! - `POST /api/v1/duels/ranked` - Record a ranked duel
//! - `POST /api/v1/rewards/daily` - Claim the daily reward
//! - `POST /api/v1/daily-challenge` - Submit the daily challenge
//! - `GET /api/v1/daily-challenge/standing` - Own challenge standing
//!
//! ## Leaderboard and notifications
//! - `GET /api/v1/leaderboard` - Ranked players
//! - `GET /api/v1/leaderboard/me` - Own rank
//! - `GET /api/v1/notifications` - Own notifications
//! - `GET /api/v1/notifications/unread-count` - Unread count
//! - `POST /api/v1/notifications/:id/read` - Mark as read
//!
//! ## Admin
//! - `POST /api/v1/admin/users/:id/points`
//! - `DELETE /api/v1/admin/users/:id`
//! - `POST /api/v1/admin/users/:id/toggle-admin`
//! - `POST /api/v1/admin/leaderboard/reset`
//! - `GET /api/v1/admin/audit-log`
//!
//! ## Payments
//! - `POST /api/v1/payments/initialize`
//! - `GET /api/v1/payments/verify/:reference`
//! - `POST /api/v1/payments/webhook`
//!
//! ## Health
//! - `GET /health/live`, `GET /health/ready`, `GET /health`

pub mod dto;
pub mod error;
pub mod extract;
pub mod routes;

pub use error::{ApiResult, ErrorResponse};
pub use extract::AuthUser;

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::AppError;
use crate::AppState;

/// Build the API router with all routes and middleware
pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/scoring/tiers", get(routes::scoring::list_tiers))
        .route("/profile", get(routes::profile::get_profile))
        // Gameplay
        .route(
            "/quiz/results",
            get(routes::gameplay::recent_quiz_results).post(routes::gameplay::submit_quiz),
        )
        .route("/duels/ranked", post(routes::gameplay::record_duel))
        .route("/rewards/daily", post(routes::gameplay::claim_daily_reward))
        .route("/daily-challenge", post(routes::gameplay::submit_daily_challenge))
        .route(
            "/daily-challenge/standing",
            get(routes::gameplay::daily_challenge_standing),
        )
        // Leaderboard
        .route("/leaderboard", get(routes::leaderboard::get_leaderboard))
        .route("/leaderboard/me", get(routes::leaderboard::get_my_rank))
        // Notifications
        .route("/notifications", get(routes::notifications::list_notifications))
        .route(
            "/notifications/unread-count",
            get(routes::notifications::unread_count),
        )
        .route("/notifications/:id/read", post(routes::notifications::mark_read))
        // Admin
        .route("/admin/users/:id/points", post(routes::admin::adjust_points))
        .route("/admin/users/:id", delete(routes::admin::delete_user))
        .route("/admin/users/:id/toggle-admin", post(routes::admin::toggle_admin))
        .route("/admin/leaderboard/reset", post(routes::admin::reset_leaderboard))
        .route("/admin/audit-log", get(routes::admin::audit_log))
        // Payments
        .route("/payments/initialize", post(routes::payments::initialize_payment))
        .route("/payments/verify/:reference", get(routes::payments::verify_payment))
        .route("/payments/webhook", post(routes::payments::webhook));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the API server and run until ctrl-c
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> Result<(), AppError> {
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Message(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("🌐 HTTP API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Message(format!("Server error: {}", e)))?;

    tracing::info!("HTTP API shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        // Without a signal handler keep serving instead of exiting at once.
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
