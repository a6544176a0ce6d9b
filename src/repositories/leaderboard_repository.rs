use crate::error::RepositoryError;
use crate::models::{LeaderboardEntry, LeaderboardPeriod};
use sqlx::PgPool;
use uuid::Uuid;

/// Ranked view over `profiles`; the period picks the points column
fn ranked_query(period: LeaderboardPeriod) -> String {
    let column = period.points_column();
    format!(
        r#"
        SELECT RANK() OVER (ORDER BY {column} DESC) AS rank,
               id AS user_id, username, {column} AS points, tier
        FROM profiles
        "#,
        column = column
    )
}

/// Read-only leaderboard queries
pub struct LeaderboardRepository {
    pool: PgPool,
}

impl LeaderboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Top `limit` entries; ties share a rank and are listed by username
    pub async fn top(
        &self,
        period: LeaderboardPeriod,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>, RepositoryError> {
        let query = format!(
            "SELECT rank, user_id, username, points, tier FROM ({}) ranked \
             ORDER BY rank, username LIMIT $1",
            ranked_query(period)
        );
        let entries = sqlx::query_as::<_, LeaderboardEntry>(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }

    pub async fn rank_of(
        &self,
        user_id: Uuid,
        period: LeaderboardPeriod,
    ) -> Result<Option<LeaderboardEntry>, RepositoryError> {
        let query = format!(
            "SELECT rank, user_id, username, points, tier FROM ({}) ranked WHERE user_id = $1",
            ranked_query(period)
        );
        let entry = sqlx::query_as::<_, LeaderboardEntry>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(entry)
    }

    pub async fn count_profiles(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
