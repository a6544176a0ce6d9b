use crate::error::{AppError, AppResult};
use crate::models::{LeaderboardEntry, LeaderboardPeriod};
use crate::repositories::LeaderboardRepository;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

pub const DEFAULT_LEADERBOARD_LIMIT: i64 = 50;
pub const MAX_LEADERBOARD_LIMIT: i64 = 100;

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardPage {
    pub period: LeaderboardPeriod,
    pub entries: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MyRank {
    pub period: LeaderboardPeriod,
    #[serde(flatten)]
    pub entry: LeaderboardEntry,
    pub total_players: i64,
}

/// Clamp a requested page size into 1..=100
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
        .clamp(1, MAX_LEADERBOARD_LIMIT)
}

pub struct LeaderboardService {
    leaderboard_repo: Arc<LeaderboardRepository>,
}

impl LeaderboardService {
    pub fn new(leaderboard_repo: Arc<LeaderboardRepository>) -> Self {
        Self { leaderboard_repo }
    }

    pub async fn leaderboard(
        &self,
        period: LeaderboardPeriod,
        limit: Option<i64>,
    ) -> AppResult<LeaderboardPage> {
        let entries = self.leaderboard_repo.top(period, clamp_limit(limit)).await?;
        Ok(LeaderboardPage { period, entries })
    }

    pub async fn my_rank(&self, user_id: Uuid, period: LeaderboardPeriod) -> AppResult<MyRank> {
        let entry = self
            .leaderboard_repo
            .rank_of(user_id, period)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
        let total_players = self.leaderboard_repo.count_profiles().await?;

        Ok(MyRank {
            period,
            entry,
            total_players,
        })
    }
}
