use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Settled ranked duel. `id` is the client match id and is unique.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Duel {
    pub id: Uuid,
    pub player_id: Uuid,
    pub opponent_id: Uuid,
    pub winner_id: Uuid,
    pub player_score: i64,
    pub opponent_score: i64,
    pub player_mmr_before: i32,
    pub opponent_mmr_before: i32,
    pub player_delta: i32,
    pub opponent_delta: i32,
    pub created_at: NaiveDateTime,
}

impl Duel {
    pub fn player_mmr_after(&self) -> i32 {
        crate::scoring::apply_rank_change(self.player_mmr_before, self.player_delta)
    }

    pub fn opponent_mmr_after(&self) -> i32 {
        crate::scoring::apply_rank_change(self.opponent_mmr_before, self.opponent_delta)
    }
}
