//! Domain models for the RankMe backend.
//!
//! Plain records mirrored from the PostgreSQL tables. Enum-like columns are
//! stored as TEXT with a typed enum alongside for conversions.

pub mod audit_log;
pub mod daily_challenge;
pub mod duel;
pub mod leaderboard;
pub mod notification;
pub mod payment;
pub mod profile;
pub mod quiz_result;

// Re-export all models for convenient access
pub use audit_log::{AdminAction, AuditLogEntry};
pub use daily_challenge::{DailyChallengeEntry, DailyChallengeStanding};
pub use duel::Duel;
pub use leaderboard::{LeaderboardEntry, LeaderboardPeriod};
pub use notification::{Notification, NotificationKind};
pub use payment::{Payment, PaymentStatus};
pub use profile::{Profile, ProfileSummary};
pub use quiz_result::QuizResult;
