use crate::error::RepositoryError;
use crate::models::{DailyChallengeEntry, DailyChallengeStanding};
use crate::scoring::percentile;
use chrono::NaiveDate;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct StandingRow {
    challenge_date: NaiveDate,
    score: i64,
    time_taken_secs: i32,
    rank: i64,
    tied: i64,
    total: i64,
}

/// Repository for daily challenge entries
pub struct DailyChallengeRepository {
    pool: PgPool,
}

impl DailyChallengeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record the day's attempt; a second attempt is a `Duplicate`
    pub async fn insert(
        &self,
        user_id: Uuid,
        challenge_date: NaiveDate,
        score: i64,
        time_taken_secs: i32,
    ) -> Result<DailyChallengeEntry, RepositoryError> {
        let entry = sqlx::query_as::<_, DailyChallengeEntry>(
            r#"
            INSERT INTO daily_challenge_entries (user_id, challenge_date, score, time_taken_secs)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, challenge_date, score, time_taken_secs, created_at
            "#,
        )
        .bind(user_id)
        .bind(challenge_date)
        .bind(score)
        .bind(time_taken_secs)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match RepositoryError::from(e) {
            RepositoryError::Duplicate(_) => {
                RepositoryError::Duplicate("Daily challenge already submitted today".to_string())
            }
            other => other,
        })?;

        Ok(entry)
    }

    /// Rank of the user's entry on `challenge_date`.
    ///
    /// Competition ranking: higher score first, faster time breaks ties,
    /// equal (score, time) pairs share a rank.
    pub async fn standing(
        &self,
        user_id: Uuid,
        challenge_date: NaiveDate,
    ) -> Result<Option<DailyChallengeStanding>, RepositoryError> {
        let row = sqlx::query_as::<_, StandingRow>(
            r#"
            WITH ranked AS (
                SELECT user_id, challenge_date, score, time_taken_secs,
                       RANK() OVER (ORDER BY score DESC, time_taken_secs ASC) AS rank,
                       COUNT(*) OVER (PARTITION BY score, time_taken_secs) AS tied,
                       COUNT(*) OVER () AS total
                FROM daily_challenge_entries
                WHERE challenge_date = $2
            )
            SELECT challenge_date, score, time_taken_secs, rank, tied, total
            FROM ranked
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(challenge_date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| DailyChallengeStanding {
            challenge_date: r.challenge_date,
            score: r.score,
            time_taken_secs: r.time_taken_secs,
            rank: r.rank,
            total: r.total,
            percentile: percentile(r.rank, r.tied, r.total),
        }))
    }
}
