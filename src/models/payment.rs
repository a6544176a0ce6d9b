use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
    Abandoned,
}

impl PaymentStatus {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(PaymentStatus::Pending),
            "success" => Ok(PaymentStatus::Success),
            "failed" => Ok(PaymentStatus::Failed),
            "abandoned" => Ok(PaymentStatus::Abandoned),
            _ => Err(format!("Invalid payment status: {}", s)),
        }
    }

    /// Map a gateway transaction status onto ours.
    ///
    /// Anything still in flight (`ongoing`, `processing`, `queued`) stays pending.
    pub fn from_gateway(status: &str) -> Self {
        match status.to_lowercase().as_str() {
            "success" => PaymentStatus::Success,
            "failed" | "reversed" => PaymentStatus::Failed,
            "abandoned" => PaymentStatus::Abandoned,
            _ => PaymentStatus::Pending,
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Success => "success",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Abandoned => "abandoned",
        }
    }
}

impl From<String> for PaymentStatus {
    fn from(s: String) -> Self {
        Self::from_str(&s).unwrap_or(PaymentStatus::Pending)
    }
}

/// Premium subscription payment, keyed by gateway reference
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub reference: String,
    pub user_id: Uuid,
    pub plan: String,   // PremiumPlan as TEXT
    pub amount: Decimal, // Major units
    pub currency: String,
    pub status: String, // PaymentStatus as TEXT
    pub gateway_transaction_id: Option<i64>,
    pub paid_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Payment {
    pub fn status_enum(&self) -> PaymentStatus {
        PaymentStatus::from(self.status.clone())
    }
}
