use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Notification kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    TierPromoted,
    DuelResult,
    DailyReward,
    PremiumActivated,
    PointsAdjusted,
}

impl NotificationKind {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "tier_promoted" => Ok(NotificationKind::TierPromoted),
            "duel_result" => Ok(NotificationKind::DuelResult),
            "daily_reward" => Ok(NotificationKind::DailyReward),
            "premium_activated" => Ok(NotificationKind::PremiumActivated),
            "points_adjusted" => Ok(NotificationKind::PointsAdjusted),
            _ => Err(format!("Invalid notification kind: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::TierPromoted => "tier_promoted",
            NotificationKind::DuelResult => "duel_result",
            NotificationKind::DailyReward => "daily_reward",
            NotificationKind::PremiumActivated => "premium_activated",
            NotificationKind::PointsAdjusted => "points_adjusted",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String, // NotificationKind as TEXT
    pub title: String,
    pub body: String,
    pub read: bool,
    pub created_at: NaiveDateTime,
}
