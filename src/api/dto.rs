//! Request and response bodies that only exist at the HTTP boundary.

use crate::scoring::Tier;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub database_latency_ms: Option<u64>,
    pub uptime_seconds: u64,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct TierInfo {
    pub tier: Tier,
    pub name: &'static str,
    pub min_points: i64,
}

#[derive(Debug, Deserialize)]
pub struct DailyChallengeRequest {
    pub score: i64,
    pub time_taken_secs: i64,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub period: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AdjustPointsRequest {
    pub delta: i64,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResetResponse {
    pub profiles_reset: u64,
}

#[derive(Debug, Deserialize)]
pub struct AuditLogQuery {
    pub target: Option<Uuid>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct InitializePaymentRequest {
    pub plan: String,
}

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub status: crate::services::WebhookAck,
}
