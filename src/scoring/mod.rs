//! Scoring rules for RankMe.
//!
//! Everything in this module is pure: tier bands, XP per quiz mode,
//! ranked-duel MMR updates and the daily reward / challenge helpers.
//! Inputs coming from clients are clamped rather than rejected, so every
//! function here is total.

pub mod mmr;
pub mod rewards;
pub mod tier;
pub mod xp;

pub use mmr::{apply_rank_change, calculate_rank_change, STARTING_MMR};
pub use rewards::{daily_reward, next_streak, percentile, StreakCheck};
pub use tier::{Tier, TierProgress};
pub use xp::{
    combo_multiplier, diminishing_multiplier, Difficulty, QuizMode, QuizPerformance, XpBreakdown,
};
