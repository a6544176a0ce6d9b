use super::PaymentError;
use crate::config::PaymentConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Request body for `POST /transaction/initialize`
#[derive(Debug, Clone, Serialize)]
pub struct InitializeRequest {
    pub email: String,
    /// Amount in minor units
    pub amount: i64,
    pub currency: String,
    pub reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InitializedTransaction {
    pub authorization_url: String,
    pub access_code: String,
    pub reference: String,
}

/// Transaction as reported by `GET /transaction/verify/{reference}` and webhooks
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayTransaction {
    pub id: i64,
    /// `success`, `failed`, `abandoned`, `ongoing`, `pending`, ...
    pub status: String,
    pub reference: String,
    /// Paid amount in minor units
    pub amount: i64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub paid_at: Option<String>,
    #[serde(default)]
    pub gateway_response: Option<String>,
}

/// Gateway response envelope
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: bool,
    message: String,
    data: Option<T>,
}

/// Operations the payment service needs from the gateway
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initialize(
        &self,
        request: InitializeRequest,
    ) -> Result<InitializedTransaction, PaymentError>;

    async fn verify(&self, reference: &str) -> Result<GatewayTransaction, PaymentError>;
}

/// reqwest client for the Paystack REST API
pub struct PaystackClient {
    client: Client,
    base_url: String,
    secret_key: String,
}

impl PaystackClient {
    pub fn new(config: &PaymentConfig) -> Result<Self, PaymentError> {
        let client = Client::builder().timeout(Duration::from_secs(15)).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            secret_key: config.secret_key.clone(),
        })
    }

    fn ensure_configured(&self) -> Result<(), PaymentError> {
        if self.secret_key.is_empty() {
            return Err(PaymentError::NotConfigured);
        }
        Ok(())
    }

    async fn unwrap_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, PaymentError> {
        let http_status = response.status();
        let body = response.text().await?;

        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| {
            warn!("Unparseable gateway response ({}): {}", http_status, e);
            PaymentError::Gateway(format!("unexpected response with status {}", http_status))
        })?;

        if !http_status.is_success() || !envelope.status {
            return Err(PaymentError::Gateway(envelope.message));
        }

        envelope
            .data
            .ok_or_else(|| PaymentError::Gateway(format!("{} (no data)", envelope.message)))
    }
}

#[async_trait]
impl PaymentGateway for PaystackClient {
    async fn initialize(
        &self,
        request: InitializeRequest,
    ) -> Result<InitializedTransaction, PaymentError> {
        self.ensure_configured()?;
        debug!("Initializing gateway transaction {}", request.reference);

        let response = self
            .client
            .post(format!("{}/transaction/initialize", self.base_url))
            .bearer_auth(&self.secret_key)
            .json(&request)
            .send()
            .await?;

        Self::unwrap_envelope(response).await
    }

    async fn verify(&self, reference: &str) -> Result<GatewayTransaction, PaymentError> {
        self.ensure_configured()?;
        debug!("Verifying gateway transaction {}", reference);

        let response = self
            .client
            .get(format!("{}/transaction/verify/{}", self.base_url, reference))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        Self::unwrap_envelope(response).await
    }
}
