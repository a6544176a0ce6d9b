use chrono::NaiveDate;

/// Points for the first claim of a streak
pub const DAILY_REWARD_BASE: i64 = 50;
/// Extra points per consecutive day
pub const DAILY_REWARD_STEP: i64 = 10;
/// Streak length after which the reward stops growing
pub const DAILY_REWARD_MAX_STREAK: i64 = 7;

/// Outcome of checking a daily reward claim against the last claim date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakCheck {
    /// Already claimed today
    AlreadyClaimed,
    /// Claim allowed; carries the streak length including today
    Claimable(i64),
}

/// Points granted for a claim on day `streak` of a streak
pub fn daily_reward(streak: i64) -> i64 {
    let day = streak.clamp(1, DAILY_REWARD_MAX_STREAK);
    DAILY_REWARD_BASE + DAILY_REWARD_STEP * (day - 1)
}

/// Work out the streak for a claim made on `today`.
///
/// Consecutive days extend the streak, a gap resets it to 1. A last claim
/// dated after `today` (clock skew) is treated as already claimed.
pub fn next_streak(
    last_claim: Option<NaiveDate>,
    current_streak: i64,
    today: NaiveDate,
) -> StreakCheck {
    match last_claim {
        None => StreakCheck::Claimable(1),
        Some(last) if last >= today => StreakCheck::AlreadyClaimed,
        Some(last) if today.signed_duration_since(last).num_days() == 1 => {
            StreakCheck::Claimable(current_streak.max(0) + 1)
        }
        Some(_) => StreakCheck::Claimable(1),
    }
}

/// Share of the other entrants ranked strictly below `rank`, in percent.
///
/// `tied` counts the entrants sharing `rank`, the caller included; none of
/// them is below the caller. Rank 1 alone is 100, the last rank is 0 and a
/// sole entrant is 100.
pub fn percentile(rank: i64, tied: i64, total: i64) -> f64 {
    if total <= 1 {
        return 100.0;
    }
    let rank = rank.clamp(1, total);
    let tied = tied.clamp(1, total - rank + 1);
    let below = (total - rank - (tied - 1)) as f64;
    let pct = below * 100.0 / (total - 1) as f64;
    (pct * 100.0).round() / 100.0
}
