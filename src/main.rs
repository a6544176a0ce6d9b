//! RankMe Backend Service
//!
//! Main entry point for the RankMe quiz platform backend.
//! This service provides:
//! - REST API for gameplay, leaderboards, admin functions and payments
//! - WebSocket server for realtime notifications

use rankme_backend::{
    api,
    database::{create_pool, run_migrations},
    AppConfig, AppError, AppResult, AppState,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "rankme_backend={},sqlx=warn,tower_http=info",
            config.log_level
        )
        .into()
    });

    if config.json_logs() {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        AppError::Config(e)
    })?;

    init_tracing(&config);

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║           RankMe Backend Service Starting                 ║");
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Environment: {}", config.environment);
    info!("Log level: {}", config.log_level);
    info!("HTTP port: {}", config.http_port);
    if let Some(ws_port) = config.ws_port {
        info!("WebSocket port: {}", ws_port);
    }
    // Production refuses to start without a payment secret.
    if !config.is_production() && !config.payment.is_configured() {
        warn!("PAYSTACK_SECRET_KEY not set - payment endpoints will fail");
    }

    // =========================================================================
    // DATABASE SETUP
    // =========================================================================
    info!("Connecting to database...");

    let pool = create_pool(&config.database).await.map_err(|e| {
        error!("Failed to create database pool: {}", e);
        AppError::Database(e)
    })?;

    info!("Database connection pool created successfully");
    info!("Max connections: {}", config.database.max_connections);

    info!("Running database migrations...");
    run_migrations(&pool).await.map_err(|e| {
        error!("Database migration failed: {}", e);
        AppError::Database(e)
    })?;

    info!("Database migrations completed successfully");

    // =========================================================================
    // CORE SERVICES INITIALIZATION
    // =========================================================================
    let http_port = config.http_port;
    let ws_port = config.ws_port;
    let environment = config.environment.clone();

    let state = Arc::new(AppState::new(config, pool)?);
    info!("✓ Application state initialized");

    // =========================================================================
    // START SERVERS
    // =========================================================================
    let ws_handle = if let Some(ws_port) = ws_port {
        let ws_addr = SocketAddr::from(([0, 0, 0, 0], ws_port));
        let listener = TcpListener::bind(ws_addr).await.map_err(|e| {
            AppError::Message(format!("Failed to bind WebSocket server: {}", e))
        })?;

        let handle = tokio::spawn(state.ws_server.clone().serve(listener));
        info!("✓ WebSocket server started on {}", ws_addr);
        Some(handle)
    } else {
        warn!("WS_PORT not configured - realtime notifications disabled");
        None
    };

    let http_addr = SocketAddr::from(([0, 0, 0, 0], http_port));

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║           RankMe Backend Service Ready!                   ║");
    info!("╠══════════════════════════════════════════════════════════╣");
    info!("║  HTTP API:     0.0.0.0:{}                              ║", http_port);
    if let Some(ws_port) = ws_port {
        info!("║  WebSocket:    0.0.0.0:{}                              ║", ws_port);
    }
    info!("║  Environment:  {}                                    ║", environment);
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Press Ctrl+C to shutdown gracefully");

    // =========================================================================
    // SHUTDOWN HANDLING
    // =========================================================================
    // The HTTP server owns the ctrl-c handler and returns once drained.
    tokio::select! {
        result = api::serve(state.clone(), http_addr) => {
            if let Err(e) = result {
                error!("HTTP server error: {}", e);
                return Err(e);
            }
        }
        _ = async {
            if let Some(handle) = ws_handle {
                handle.await.ok();
            } else {
                futures::future::pending::<()>().await;
            }
        } => {
            error!("WebSocket server exited unexpectedly");
        }
    }

    state.database.pool().close().await;
    info!("RankMe backend service shutdown complete");
    Ok(())
}
