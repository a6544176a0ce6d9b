use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A user's single daily challenge attempt
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DailyChallengeEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub challenge_date: NaiveDate,
    pub score: i64,
    pub time_taken_secs: i32,
    pub created_at: NaiveDateTime,
}

/// Where an entry ranks among the day's entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyChallengeStanding {
    pub challenge_date: NaiveDate,
    pub score: i64,
    pub time_taken_secs: i32,
    pub rank: i64,
    pub total: i64,
    pub percentile: f64,
}
