use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Privileged action recorded in the admin audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminAction {
    AdjustPoints,
    DeleteUser,
    ToggleAdmin,
    ResetLeaderboard,
    PaymentApplied,
    PaymentRejected,
}

impl AdminAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminAction::AdjustPoints => "adjust_points",
            AdminAction::DeleteUser => "delete_user",
            AdminAction::ToggleAdmin => "toggle_admin",
            AdminAction::ResetLeaderboard => "reset_leaderboard",
            AdminAction::PaymentApplied => "payment_applied",
            AdminAction::PaymentRejected => "payment_rejected",
        }
    }
}

/// Audit row. `admin_id` is empty for system actions (webhooks); neither id
/// references `profiles` so rows outlive deleted users.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub admin_id: Option<Uuid>,
    pub action: String,
    pub target_user_id: Option<Uuid>,
    pub details: serde_json::Value,
    pub created_at: NaiveDateTime,
}
