use crate::error::RepositoryError;
use crate::models::{Duel, Profile};
use crate::repositories::profile_repository::PROFILE_COLUMNS;
use crate::scoring::{apply_rank_change, calculate_rank_change};
use chrono::NaiveDateTime;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

const DUEL_COLUMNS: &str = "id, player_id, opponent_id, winner_id, player_score, opponent_score, \
     player_mmr_before, opponent_mmr_before, player_delta, opponent_delta, created_at";

/// Input for settling one ranked duel
#[derive(Debug, Clone, Copy)]
pub struct DuelOutcome {
    pub match_id: Uuid,
    pub player_id: Uuid,
    pub opponent_id: Uuid,
    /// Whether `player_id` won
    pub player_won: bool,
    pub player_score: i64,
    pub opponent_score: i64,
    /// Start of the UTC day the duel is rated in
    pub day_start: NaiveDateTime,
}

/// Id of a duel the pair already played since `since`, in either seat
async fn pair_duel_since(
    conn: &mut PgConnection,
    a: Uuid,
    b: Uuid,
    since: NaiveDateTime,
) -> Result<Option<Uuid>, RepositoryError> {
    let id: Option<Uuid> = sqlx::query_scalar(
        r#"
        SELECT id
        FROM duels
        WHERE LEAST(player_id, opponent_id) = LEAST($1, $2)
          AND GREATEST(player_id, opponent_id) = GREATEST($1, $2)
          AND created_at >= $3
        LIMIT 1
        "#,
    )
    .bind(a)
    .bind(b)
    .bind(since)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(id)
}

/// Repository for ranked duels
pub struct DuelRepository {
    pool: PgPool,
}

impl DuelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Settle a duel: record it and move both ratings atomically.
    ///
    /// Both profiles are locked in id order so two duels between the same
    /// players cannot deadlock. A pair is rated at most once per UTC day,
    /// whichever side reports, so one player cannot drain another's rating
    /// with fresh match ids. A replayed `match_id` or a second duel of the
    /// day fails with `RepositoryError::Duplicate` and changes nothing.
    pub async fn settle(&self, outcome: &DuelOutcome) -> Result<Duel, RepositoryError> {
        if outcome.player_id == outcome.opponent_id {
            return Err(RepositoryError::InvalidInput(
                "A player cannot duel themselves".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let query = format!(
            "SELECT {} FROM profiles WHERE id = ANY($1) ORDER BY id FOR UPDATE",
            PROFILE_COLUMNS
        );
        let locked = sqlx::query_as::<_, Profile>(&query)
            .bind(vec![outcome.player_id, outcome.opponent_id])
            .fetch_all(&mut *tx)
            .await?;

        let find = |id: Uuid| {
            locked
                .iter()
                .find(|p| p.id == id)
                .ok_or_else(|| RepositoryError::NotFound(format!("Profile {} not found", id)))
        };
        let player = find(outcome.player_id)?;
        let opponent = find(outcome.opponent_id)?;

        // The row locks above serialize reports for this pair
        if let Some(existing) =
            pair_duel_since(&mut *tx, player.id, opponent.id, outcome.day_start).await?
        {
            let message = if existing == outcome.match_id {
                format!("Match {} was already recorded", outcome.match_id)
            } else {
                "These players already had a ranked duel today".to_string()
            };
            return Err(RepositoryError::Duplicate(message));
        }

        let player_delta = calculate_rank_change(
            player.mmr,
            opponent.mmr,
            outcome.player_won,
            outcome.player_score,
            outcome.opponent_score,
        );
        let opponent_delta = calculate_rank_change(
            opponent.mmr,
            player.mmr,
            !outcome.player_won,
            outcome.opponent_score,
            outcome.player_score,
        );
        let winner_id = if outcome.player_won { player.id } else { opponent.id };

        let query = format!(
            r#"
            INSERT INTO duels
            (id, player_id, opponent_id, winner_id, player_score, opponent_score,
             player_mmr_before, opponent_mmr_before, player_delta, opponent_delta)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            DUEL_COLUMNS
        );
        let duel = sqlx::query_as::<_, Duel>(&query)
            .bind(outcome.match_id)
            .bind(player.id)
            .bind(opponent.id)
            .bind(winner_id)
            .bind(outcome.player_score.max(0))
            .bind(outcome.opponent_score.max(0))
            .bind(player.mmr)
            .bind(opponent.mmr)
            .bind(player_delta)
            .bind(opponent_delta)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| match RepositoryError::from(e) {
                RepositoryError::Duplicate(_) => RepositoryError::Duplicate(format!(
                    "Match {} was already recorded",
                    outcome.match_id
                )),
                other => other,
            })?;

        for (id, mmr) in [
            (player.id, apply_rank_change(player.mmr, player_delta)),
            (opponent.id, apply_rank_change(opponent.mmr, opponent_delta)),
        ] {
            sqlx::query(
                r#"
                UPDATE profiles
                SET mmr = $2, updated_at = (NOW() AT TIME ZONE 'utc')
                WHERE id = $1
                "#,
            )
            .bind(id)
            .bind(mmr)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(duel)
    }
}
