pub mod admin_service;
pub mod audit;
pub mod gameplay_service;
pub mod leaderboard_service;
pub mod notification_service;
pub mod payment_service;

pub use admin_service::{AdjustedPoints, AdminFlag, AdminService};
pub use audit::AuditTrailService;
pub use gameplay_service::{
    DailyRewardOutcome, DuelOutcomeView, DuelReport, GameplayService, QuizOutcome, QuizSubmission,
};
pub use leaderboard_service::{LeaderboardPage, LeaderboardService, MyRank};
pub use notification_service::NotificationService;
pub use payment_service::{InitializedPayment, PaymentService, PaymentView, WebhookAck};
