use crate::error::RepositoryError;
use crate::models::QuizResult;
use crate::repositories::profile_repository::{apply_points, lock_profile, PointsChange};
use crate::scoring::{QuizMode, QuizPerformance, XpBreakdown};
use chrono::NaiveDateTime;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

const QUIZ_RESULT_COLUMNS: &str = "id, user_id, mode, correct_answers, total_questions, \
     time_taken_secs, streak, difficulty, xp_awarded, play_index, created_at";

/// A stored play with the XP it earned and the profile it moved
#[derive(Debug, Clone)]
pub struct RecordedPlay {
    pub result: QuizResult,
    pub breakdown: XpBreakdown,
    pub change: PointsChange,
}

async fn count_since(
    conn: &mut PgConnection,
    user_id: Uuid,
    since: NaiveDateTime,
) -> Result<i64, RepositoryError> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM quiz_results
        WHERE user_id = $1 AND created_at >= $2
        "#,
    )
    .bind(user_id)
    .bind(since)
    .fetch_one(&mut *conn)
    .await?;

    Ok(count)
}

fn to_i32(value: i64) -> i32 {
    value.clamp(0, i32::MAX as i64) as i32
}

/// Repository for quiz plays
pub struct QuizResultRepository {
    pool: PgPool,
}

impl QuizResultRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Score a play and credit it to the player in one transaction.
    ///
    /// The profile row lock serializes a player's submissions so the play
    /// index (and the diminishing multiplier derived from it) is exact.
    pub async fn record_play(
        &self,
        user_id: Uuid,
        mode: QuizMode,
        performance: &QuizPerformance,
        day_start: NaiveDateTime,
        now: NaiveDateTime,
    ) -> Result<RecordedPlay, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let locked = lock_profile(&mut *tx, user_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("Profile {} not found", user_id)))?;

        let play_index = count_since(&mut *tx, user_id, day_start).await? + 1;
        let performance = performance.clamped();
        let breakdown = mode.breakdown(&performance, play_index);

        let query = format!(
            r#"
            INSERT INTO quiz_results
            (user_id, mode, correct_answers, total_questions, time_taken_secs,
             streak, difficulty, xp_awarded, play_index, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            QUIZ_RESULT_COLUMNS
        );
        let result = sqlx::query_as::<_, QuizResult>(&query)
            .bind(user_id)
            .bind(mode.as_str())
            .bind(to_i32(performance.correct))
            .bind(to_i32(performance.total))
            .bind(to_i32(performance.time_taken_secs))
            .bind(to_i32(performance.streak))
            .bind(performance.difficulty.as_str())
            .bind(breakdown.awarded_xp)
            .bind(to_i32(play_index))
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        let change = apply_points(&mut *tx, &locked, breakdown.awarded_xp).await?;

        tx.commit().await?;
        Ok(RecordedPlay {
            result,
            breakdown,
            change,
        })
    }

    /// Latest plays of a user, newest first
    pub async fn find_recent(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<QuizResult>, RepositoryError> {
        let query = format!(
            "SELECT {} FROM quiz_results WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
            QUIZ_RESULT_COLUMNS
        );
        let results = sqlx::query_as::<_, QuizResult>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(results)
    }
}
