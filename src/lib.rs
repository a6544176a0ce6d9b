//! RankMe Backend Library
//!
//! Scoring rules, persistence and HTTP/realtime surfaces of the RankMe
//! quiz platform, exposed for the binary and for tests.

pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod payments;
pub mod repositories;
pub mod scoring;
pub mod services;
pub mod websocket;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};

use auth::JwtVerifier;
use database::Database;
use payments::{PaymentGateway, PaystackClient};
use repositories::*;
use services::*;
use std::sync::Arc;
use std::time::Instant;
use websocket::WebSocketServer;

/// Application state containing all repositories and services
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub database: Database,
    pub jwt: Arc<JwtVerifier>,
    pub ws_server: Arc<WebSocketServer>,
    pub profile_repo: Arc<ProfileRepository>,
    pub gameplay: Arc<GameplayService>,
    pub leaderboard: Arc<LeaderboardService>,
    pub notifications: Arc<NotificationService>,
    pub admin: Arc<AdminService>,
    pub payments: Arc<PaymentService>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create a new AppState talking to the configured payment gateway
    pub fn new(config: AppConfig, pool: sqlx::PgPool) -> AppResult<Self> {
        let gateway = PaystackClient::new(&config.payment)?;
        Ok(Self::with_gateway(config, pool, Arc::new(gateway)))
    }

    /// Create a new AppState with an explicit payment gateway
    pub fn with_gateway(
        config: AppConfig,
        pool: sqlx::PgPool,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let database = Database::new(pool.clone());
        let jwt = Arc::new(JwtVerifier::new(&config.jwt));
        let ws_server = Arc::new(WebSocketServer::new().with_verifier(jwt.clone()));

        let profile_repo = Arc::new(ProfileRepository::new(pool.clone()));
        let quiz_repo = Arc::new(QuizResultRepository::new(pool.clone()));
        let duel_repo = Arc::new(DuelRepository::new(pool.clone()));
        let challenge_repo = Arc::new(DailyChallengeRepository::new(pool.clone()));
        let leaderboard_repo = Arc::new(LeaderboardRepository::new(pool.clone()));
        let notification_repo = Arc::new(NotificationRepository::new(pool.clone()));
        let payment_repo = Arc::new(PaymentRepository::new(pool.clone()));
        let audit_repo = Arc::new(AuditLogRepository::new(pool));

        let notifications =
            Arc::new(NotificationService::new(notification_repo, ws_server.clone()));
        let audit = Arc::new(AuditTrailService::new(audit_repo));

        let gameplay = Arc::new(GameplayService::new(
            profile_repo.clone(),
            quiz_repo,
            duel_repo,
            challenge_repo,
            notifications.clone(),
        ));
        let leaderboard = Arc::new(LeaderboardService::new(leaderboard_repo));
        let admin = Arc::new(AdminService::new(
            profile_repo.clone(),
            audit.clone(),
            notifications.clone(),
        ));
        let payments = Arc::new(PaymentService::new(
            payment_repo,
            profile_repo.clone(),
            gateway,
            config.payment.clone(),
            audit,
            notifications.clone(),
        ));

        Self {
            config: Arc::new(config),
            database,
            jwt,
            ws_server,
            profile_repo,
            gameplay,
            leaderboard,
            notifications,
            admin,
            payments,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
