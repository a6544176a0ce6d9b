//! ELO-style matchmaking rating for ranked duels.

/// Rating every new profile starts with
pub const STARTING_MMR: i32 = 1000;
/// ELO K-factor
pub const K_FACTOR: f64 = 32.0;
/// Rating gap that makes a player ten times more likely to win
pub const RATING_SCALE: f64 = 400.0;
/// Score gap worth one extra rating point
pub const PERFORMANCE_GAP: i64 = 50;
/// Smallest non-zero rating change
pub const MIN_RANK_CHANGE: i32 = 5;

/// Expected score of `player_mmr` against `opponent_mmr` on the logistic curve
pub fn expected_score(player_mmr: i32, opponent_mmr: i32) -> f64 {
    let diff = (opponent_mmr.max(0) - player_mmr.max(0)) as f64;
    1.0 / (1.0 + 10f64.powf(diff / RATING_SCALE))
}

/// Rating change for one player after a ranked duel.
///
/// Standard ELO update plus one point per 50 points of score differential.
/// A non-zero result is never smaller than 5 in magnitude; the result is 0
/// only when both the ELO part and the performance adjustment are exactly 0.
pub fn calculate_rank_change(
    player_mmr: i32,
    opponent_mmr: i32,
    won: bool,
    player_score: i64,
    opponent_score: i64,
) -> i32 {
    let actual = if won { 1.0 } else { 0.0 };
    let raw = K_FACTOR * (actual - expected_score(player_mmr, opponent_mmr));

    let score_gap = player_score.max(0) - opponent_score.max(0);
    let adjustment = (score_gap / PERFORMANCE_GAP).clamp(i32::MIN as i64, i32::MAX as i64) as i32;

    if raw == 0.0 && adjustment == 0 {
        return 0;
    }

    let delta = (raw.round() as i32).saturating_add(adjustment);
    if delta == 0 {
        return if won { MIN_RANK_CHANGE } else { -MIN_RANK_CHANGE };
    }
    if delta.abs() < MIN_RANK_CHANGE {
        return MIN_RANK_CHANGE * delta.signum();
    }
    delta
}

/// Apply a rating change, never going below zero
pub fn apply_rank_change(mmr: i32, delta: i32) -> i32 {
    mmr.max(0).saturating_add(delta).max(0)
}
