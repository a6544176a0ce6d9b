//! Payment gateway integration for premium subscriptions.
//!
//! The gateway speaks the Paystack REST shape (`{status, message, data}`
//! envelopes, bearer secret key) and signs webhooks with HMAC-SHA512.

pub mod gateway;
pub mod plan;
pub mod webhook;

pub use gateway::{
    GatewayTransaction, InitializeRequest, InitializedTransaction, PaymentGateway, PaystackClient,
};
pub use plan::{extend_premium, from_minor_units, to_minor_units, PremiumPlan};
pub use webhook::{sign_payload, verify_signature, ChargeData, WebhookEvent, SIGNATURE_HEADER};

use thiserror::Error;

/// Errors raised while talking to the payment gateway
#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Unknown plan: {0}")]
    UnknownPlan(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Payment gateway is not configured")]
    NotConfigured,

    #[error("Gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gateway rejected request: {0}")]
    Gateway(String),

    #[error("Malformed gateway payload: {0}")]
    Payload(#[from] serde_json::Error),
}
