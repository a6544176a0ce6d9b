pub mod audit_log_repository;
pub mod daily_challenge_repository;
pub mod duel_repository;
pub mod leaderboard_repository;
pub mod notification_repository;
pub mod payment_repository;
pub mod profile_repository;
pub mod quiz_result_repository;

// Re-export all repositories for convenient access
pub use audit_log_repository::{AuditLogRepository, NewAuditEntry};
pub use daily_challenge_repository::DailyChallengeRepository;
pub use duel_repository::{DuelOutcome, DuelRepository};
pub use leaderboard_repository::LeaderboardRepository;
pub use notification_repository::NotificationRepository;
pub use payment_repository::{PaymentRepository, SettleOutcome};
pub use profile_repository::{DailyRewardClaim, PointsChange, ProfileRepository};
pub use quiz_result_repository::{QuizResultRepository, RecordedPlay};
