//! Profile Routes
//!
//! - GET /api/v1/profile - Caller's profile, created on first access

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::extract::AuthUser;
use crate::models::ProfileSummary;
use crate::AppState;

/// GET /api/v1/profile
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<ProfileSummary>> {
    let summary = state.gameplay.profile(&user).await?;
    Ok(Json(summary))
}
