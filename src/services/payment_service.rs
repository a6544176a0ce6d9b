use crate::auth::AuthenticatedUser;
use crate::config::PaymentConfig;
use crate::error::{AppError, AppResult};
use crate::models::{AdminAction, NotificationKind, Payment, PaymentStatus};
use crate::payments::{
    from_minor_units, to_minor_units, verify_signature, InitializeRequest, PaymentError,
    PaymentGateway, PremiumPlan, WebhookEvent,
};
use crate::repositories::{NewAuditEntry, PaymentRepository, ProfileRepository, SettleOutcome};
use crate::services::{AuditTrailService, NotificationService};
use chrono::{NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Prefix of every reference generated here
pub const REFERENCE_PREFIX: &str = "rankme_";

pub fn new_reference() -> String {
    format!("{}{}", REFERENCE_PREFIX, Uuid::new_v4().simple())
}

#[derive(Debug, Clone, Serialize)]
pub struct InitializedPayment {
    pub reference: String,
    pub authorization_url: String,
    pub access_code: String,
    pub plan: PremiumPlan,
    pub amount: Decimal,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentView {
    pub reference: String,
    pub status: PaymentStatus,
    pub plan: String,
    pub amount: Decimal,
    pub currency: String,
    pub paid_at: Option<NaiveDateTime>,
    pub is_premium: bool,
    pub premium_expires_at: Option<NaiveDateTime>,
}

/// What the webhook did with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookAck {
    Processed,
    AlreadyProcessed,
    Ignored,
    UnknownReference,
    Rejected,
}

/// Premium purchases through the payment gateway
pub struct PaymentService {
    payment_repo: Arc<PaymentRepository>,
    profile_repo: Arc<ProfileRepository>,
    gateway: Arc<dyn PaymentGateway>,
    config: PaymentConfig,
    audit: Arc<AuditTrailService>,
    notifications: Arc<NotificationService>,
}

impl PaymentService {
    pub fn new(
        payment_repo: Arc<PaymentRepository>,
        profile_repo: Arc<ProfileRepository>,
        gateway: Arc<dyn PaymentGateway>,
        config: PaymentConfig,
        audit: Arc<AuditTrailService>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            payment_repo,
            profile_repo,
            gateway,
            config,
            audit,
            notifications,
        }
    }

    /// Start a checkout for `plan`
    pub async fn initialize(
        &self,
        user: &AuthenticatedUser,
        plan: &str,
    ) -> AppResult<InitializedPayment> {
        let plan = PremiumPlan::from_str(plan)?;
        if !self.config.is_configured() {
            return Err(PaymentError::NotConfigured.into());
        }

        let profile = self
            .profile_repo
            .find_or_create(user.id, user.email.as_deref())
            .await?;
        let email = user
            .email
            .clone()
            .or(profile.email)
            .ok_or_else(|| {
                AppError::Validation("An email address is required to pay".to_string())
            })?;

        let amount = plan.price(&self.config);
        let minor = to_minor_units(amount)?;
        let reference = new_reference();

        self.payment_repo
            .create_pending(&reference, user.id, plan, amount, &self.config.currency)
            .await?;

        let request = InitializeRequest {
            email,
            amount: minor,
            currency: self.config.currency.clone(),
            reference: reference.clone(),
            callback_url: self.config.callback_url.clone(),
            metadata: serde_json::json!({
                "user_id": user.id.to_string(),
                "plan": plan.as_str(),
            }),
        };

        let initialized = match self.gateway.initialize(request).await {
            Ok(initialized) => initialized,
            Err(e) => {
                error!("Gateway initialize failed for {}: {}", reference, e);
                if let Err(mark_err) = self
                    .payment_repo
                    .record_status(&reference, PaymentStatus::Failed, None)
                    .await
                {
                    warn!("Could not mark {} failed: {}", reference, mark_err);
                }
                return Err(e.into());
            }
        };

        info!(
            "Payment {} initialized for {} ({} {} {})",
            reference,
            user.id,
            plan.as_str(),
            amount,
            self.config.currency
        );

        Ok(InitializedPayment {
            reference,
            authorization_url: initialized.authorization_url,
            access_code: initialized.access_code,
            plan,
            amount,
            currency: self.config.currency.clone(),
        })
    }

    /// Check a payment with the gateway and apply it if it succeeded
    pub async fn verify(
        &self,
        user: &AuthenticatedUser,
        reference: &str,
    ) -> AppResult<PaymentView> {
        let payment = self
            .payment_repo
            .find_by_reference(reference)
            .await?
            .filter(|p| p.user_id == user.id)
            .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;

        let payment = if payment.status_enum() == PaymentStatus::Success {
            payment
        } else {
            let transaction = self.gateway.verify(reference).await?;
            match PaymentStatus::from_gateway(&transaction.status) {
                PaymentStatus::Success => {
                    self.apply_success(reference, transaction.amount, Some(transaction.id))
                        .await?;
                    self.reload(reference).await?
                }
                status => self
                    .payment_repo
                    .record_status(reference, status, Some(transaction.id))
                    .await?
                    .unwrap_or(payment),
            }
        };

        self.view(payment).await
    }

    /// Handle a signed gateway webhook.
    ///
    /// A bad or missing signature is rejected with 401. Anything else that
    /// cannot be acted on is acknowledged so the gateway stops retrying.
    pub async fn handle_webhook(
        &self,
        body: &[u8],
        signature: Option<&str>,
    ) -> AppResult<WebhookAck> {
        let signature = signature.ok_or_else(|| {
            warn!("Webhook without signature rejected");
            AppError::Unauthorized("Missing webhook signature".to_string())
        })?;
        if !verify_signature(&self.config.secret_key, body, signature) {
            warn!("Webhook with invalid signature rejected");
            return Err(AppError::Unauthorized("Invalid webhook signature".to_string()));
        }

        let event: WebhookEvent = serde_json::from_slice(body)
            .map_err(|e| AppError::Validation(format!("Malformed webhook body: {}", e)))?;
        if !event.is_charge_success() {
            debug!("Ignoring webhook event {}", event.event);
            return Ok(WebhookAck::Ignored);
        }

        let charge = event
            .charge()
            .map_err(|e| AppError::Validation(format!("Malformed charge payload: {}", e)))?;
        if PaymentStatus::from_gateway(&charge.status) != PaymentStatus::Success {
            debug!("Ignoring charge {} with status {}", charge.reference, charge.status);
            return Ok(WebhookAck::Ignored);
        }

        self.apply_success(&charge.reference, charge.amount, charge.id).await
    }

    /// Apply a successful charge exactly once and report what happened
    async fn apply_success(
        &self,
        reference: &str,
        paid_minor: i64,
        gateway_id: Option<i64>,
    ) -> AppResult<WebhookAck> {
        let now = Utc::now().naive_utc();
        let outcome = self
            .payment_repo
            .settle_success(reference, paid_minor, gateway_id, now)
            .await?;

        let ack = match outcome {
            SettleOutcome::Applied { payment, profile } => {
                info!(
                    "Payment {} applied: {} premium until {:?}",
                    payment.reference, profile.id, profile.premium_expires_at
                );
                let body = match profile.premium_expires_at {
                    Some(expiry) => {
                        format!("Premium is active until {}", expiry.format("%Y-%m-%d"))
                    }
                    None => "Premium is active".to_string(),
                };
                self.notifications
                    .notify_best_effort(
                        profile.id,
                        NotificationKind::PremiumActivated,
                        "Premium activated",
                        &body,
                    )
                    .await;
                WebhookAck::Processed
            }
            SettleOutcome::AlreadyApplied(payment) => {
                debug!("Payment {} already applied", payment.reference);
                WebhookAck::AlreadyProcessed
            }
            SettleOutcome::Underpaid { payment, paid_minor } => {
                let paid = from_minor_units(paid_minor);
                warn!(
                    "Payment {} underpaid: {} {} for {} {}",
                    payment.reference, paid, payment.currency, payment.amount, payment.currency
                );
                let entry =
                    NewAuditEntry::new(None, AdminAction::PaymentRejected, Some(payment.user_id))
                        .with_detail("reference", payment.reference.clone().into())
                        .with_detail("paid", paid.to_string().into())
                        .with_detail("expected", payment.amount.to_string().into());
                if let Err(e) = self.audit.log(entry).await {
                    warn!("Could not audit rejected payment {}: {}", payment.reference, e);
                }
                WebhookAck::Rejected
            }
            SettleOutcome::UnknownReference => {
                warn!("Charge for unknown reference {} acknowledged", reference);
                WebhookAck::UnknownReference
            }
        };

        Ok(ack)
    }

    async fn reload(&self, reference: &str) -> AppResult<Payment> {
        self.payment_repo
            .find_by_reference(reference)
            .await?
            .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))
    }

    async fn view(&self, payment: Payment) -> AppResult<PaymentView> {
        let profile = self.profile_repo.find_by_id(payment.user_id).await?;
        let now = Utc::now().naive_utc();

        Ok(PaymentView {
            status: payment.status_enum(),
            is_premium: profile.as_ref().map_or(false, |p| p.premium_active(now)),
            premium_expires_at: profile.and_then(|p| p.premium_expires_at),
            reference: payment.reference,
            plan: payment.plan,
            amount: payment.amount,
            currency: payment.currency,
            paid_at: payment.paid_at,
        })
    }
}
