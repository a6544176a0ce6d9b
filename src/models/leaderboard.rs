use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Leaderboard ranking window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardPeriod {
    #[default]
    AllTime,
    Weekly,
}

impl LeaderboardPeriod {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "all_time" | "alltime" => Ok(LeaderboardPeriod::AllTime),
            "weekly" => Ok(LeaderboardPeriod::Weekly),
            _ => Err(format!("Invalid leaderboard period: {}", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LeaderboardPeriod::AllTime => "all_time",
            LeaderboardPeriod::Weekly => "weekly",
        }
    }

    /// Profile column the period ranks by
    pub fn points_column(&self) -> &'static str {
        match self {
            LeaderboardPeriod::AllTime => "points",
            LeaderboardPeriod::Weekly => "weekly_points",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub user_id: Uuid,
    pub username: String,
    pub points: i64,
    pub tier: String,
}
