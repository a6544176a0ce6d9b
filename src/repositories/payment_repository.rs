//! Repository for premium payments and their settlement

use crate::error::RepositoryError;
use crate::models::{AdminAction, Payment, PaymentStatus, Profile};
use crate::payments::{extend_premium, to_minor_units, PremiumPlan};
use crate::repositories::audit_log_repository::{insert_entry, NewAuditEntry};
use crate::repositories::profile_repository::{lock_profile, ProfileRepository};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

const PAYMENT_COLUMNS: &str = "id, reference, user_id, plan, amount, currency, status, \
     gateway_transaction_id, paid_at, created_at, updated_at";

/// What happened when a successful charge was applied
#[derive(Debug, Clone)]
pub enum SettleOutcome {
    /// Payment marked successful and premium extended
    Applied { payment: Payment, profile: Profile },
    /// Payment was already successful; nothing changed
    AlreadyApplied(Payment),
    /// Charged amount was below the plan price; payment marked failed
    Underpaid { payment: Payment, paid_minor: i64 },
    /// No payment with that reference
    UnknownReference,
}

async fn lock_payment(
    conn: &mut PgConnection,
    reference: &str,
) -> Result<Option<Payment>, RepositoryError> {
    let query = format!("SELECT {} FROM payments WHERE reference = $1 FOR UPDATE", PAYMENT_COLUMNS);
    let payment = sqlx::query_as::<_, Payment>(&query)
        .bind(reference)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(payment)
}

async fn update_status(
    conn: &mut PgConnection,
    reference: &str,
    status: PaymentStatus,
    gateway_transaction_id: Option<i64>,
    paid_at: Option<NaiveDateTime>,
) -> Result<Payment, RepositoryError> {
    let query = format!(
        r#"
        UPDATE payments
        SET status = $2,
            gateway_transaction_id = COALESCE($3, gateway_transaction_id),
            paid_at = COALESCE($4, paid_at),
            updated_at = (NOW() AT TIME ZONE 'utc')
        WHERE reference = $1
        RETURNING {}
        "#,
        PAYMENT_COLUMNS
    );
    let payment = sqlx::query_as::<_, Payment>(&query)
        .bind(reference)
        .bind(status.as_str())
        .bind(gateway_transaction_id)
        .bind(paid_at)
        .fetch_one(&mut *conn)
        .await?;

    Ok(payment)
}

/// Repository for payment rows
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a pending payment for a freshly generated reference
    pub async fn create_pending(
        &self,
        reference: &str,
        user_id: Uuid,
        plan: PremiumPlan,
        amount: Decimal,
        currency: &str,
    ) -> Result<Payment, RepositoryError> {
        let query = format!(
            r#"
            INSERT INTO payments (reference, user_id, plan, amount, currency, status)
            VALUES ($1, $2, $3, $4, $5, 'pending')
            RETURNING {}
            "#,
            PAYMENT_COLUMNS
        );
        let payment = sqlx::query_as::<_, Payment>(&query)
            .bind(reference)
            .bind(user_id)
            .bind(plan.as_str())
            .bind(amount)
            .bind(currency)
            .fetch_one(&self.pool)
            .await?;

        Ok(payment)
    }

    pub async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Payment>, RepositoryError> {
        let query = format!("SELECT {} FROM payments WHERE reference = $1", PAYMENT_COLUMNS);
        let payment = sqlx::query_as::<_, Payment>(&query)
            .bind(reference)
            .fetch_optional(&self.pool)
            .await?;

        Ok(payment)
    }

    /// Record a non-success gateway status. A payment that already
    /// succeeded keeps its status.
    pub async fn record_status(
        &self,
        reference: &str,
        status: PaymentStatus,
        gateway_transaction_id: Option<i64>,
    ) -> Result<Option<Payment>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current = match lock_payment(&mut *tx, reference).await? {
            Some(payment) => payment,
            None => return Ok(None),
        };
        if current.status_enum() == PaymentStatus::Success || current.status_enum() == status {
            return Ok(Some(current));
        }

        let payment =
            update_status(&mut *tx, reference, status, gateway_transaction_id, None).await?;

        tx.commit().await?;
        Ok(Some(payment))
    }

    /// Apply a successful charge exactly once.
    ///
    /// Locks the payment row, skips it when already successful, rejects
    /// underpayment, then marks it successful and extends the owner's
    /// premium from max(now, current expiry) by the plan duration. The
    /// audit row is part of the same transaction.
    pub async fn settle_success(
        &self,
        reference: &str,
        paid_minor: i64,
        gateway_transaction_id: Option<i64>,
        now: NaiveDateTime,
    ) -> Result<SettleOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let payment = match lock_payment(&mut *tx, reference).await? {
            Some(payment) => payment,
            None => return Ok(SettleOutcome::UnknownReference),
        };

        if payment.status_enum() == PaymentStatus::Success {
            return Ok(SettleOutcome::AlreadyApplied(payment));
        }

        let expected_minor = to_minor_units(payment.amount)
            .map_err(|e| RepositoryError::InvalidInput(e.to_string()))?;
        if paid_minor < expected_minor {
            let payment = update_status(
                &mut *tx,
                reference,
                PaymentStatus::Failed,
                gateway_transaction_id,
                None,
            )
            .await?;
            tx.commit().await?;
            return Ok(SettleOutcome::Underpaid { payment, paid_minor });
        }

        let plan = PremiumPlan::from_str(&payment.plan)
            .map_err(|e| RepositoryError::InvalidInput(e.to_string()))?;

        let owner = lock_profile(&mut *tx, payment.user_id)
            .await?
            .ok_or_else(|| {
                RepositoryError::NotFound(format!("Profile {} not found", payment.user_id))
            })?;

        let payment = update_status(
            &mut *tx,
            reference,
            PaymentStatus::Success,
            gateway_transaction_id,
            Some(now),
        )
        .await?;

        let expires_at = extend_premium(owner.premium_expires_at, now, plan);
        let profile = ProfileRepository::set_premium(&mut *tx, owner.id, expires_at).await?;

        let audit = NewAuditEntry::new(None, AdminAction::PaymentApplied, Some(owner.id))
            .with_detail("reference", reference.into())
            .with_detail("plan", plan.as_str().into())
            .with_detail("paid_minor", paid_minor.into())
            .with_detail("premium_expires_at", expires_at.to_string().into());
        insert_entry(&mut *tx, &audit).await?;

        tx.commit().await?;
        Ok(SettleOutcome::Applied { payment, profile })
    }
}
