//! Payment Routes
//!
//! - POST /api/v1/payments/initialize - Start a premium checkout
//! - GET /api/v1/payments/verify/:reference - Confirm a checkout with the gateway
//! - POST /api/v1/payments/webhook - Gateway callback, authenticated by signature

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{InitializePaymentRequest, WebhookResponse};
use crate::api::error::ApiResult;
use crate::api::extract::{AuthUser, ApiJson, ApiPath};
use crate::payments::SIGNATURE_HEADER;
use crate::services::{InitializedPayment, PaymentView};
use crate::AppState;

/// POST /api/v1/payments/initialize
pub async fn initialize_payment(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    ApiJson(request): ApiJson<InitializePaymentRequest>,
) -> ApiResult<(StatusCode, Json<InitializedPayment>)> {
    let payment = state.payments.initialize(&user, &request.plan).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// GET /api/v1/payments/verify/:reference
pub async fn verify_payment(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    ApiPath(reference): ApiPath<String>,
) -> ApiResult<Json<PaymentView>> {
    let view = state.payments.verify(&user, &reference).await?;
    Ok(Json(view))
}

/// POST /api/v1/payments/webhook
///
/// The signature covers the raw body, so it is taken as bytes and parsed
/// only after verification.
pub async fn webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookResponse>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    let status = state.payments.handle_webhook(&body, signature).await?;
    Ok(Json(WebhookResponse { status }))
}
