use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One recorded quiz play
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizResult {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mode: String, // QuizMode as TEXT
    pub correct_answers: i32,
    pub total_questions: i32,
    pub time_taken_secs: i32,
    pub streak: i32,
    pub difficulty: String, // Difficulty as TEXT
    pub xp_awarded: i64,
    /// 1-based play number within the UTC day
    pub play_index: i32,
    pub created_at: NaiveDateTime,
}
