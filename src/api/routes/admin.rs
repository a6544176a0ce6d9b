//! Admin Routes
//!
//! Every handler checks the caller's admin flag in the database; the token
//! role claim is not trusted for this.
//!
//! - POST /api/v1/admin/users/:id/points - Adjust a player's points
//! - DELETE /api/v1/admin/users/:id - Delete a player
//! - POST /api/v1/admin/users/:id/toggle-admin - Flip the admin flag
//! - POST /api/v1/admin/leaderboard/reset - Zero weekly points
//! - GET /api/v1/admin/audit-log?target=&limit= - Recent admin actions

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::dto::{AdjustPointsRequest, AuditLogQuery, LeaderboardResetResponse};
use crate::api::error::ApiResult;
use crate::api::extract::{AuthUser, ApiJson, ApiPath, ApiQuery};
use crate::models::AuditLogEntry;
use crate::services::{AdjustedPoints, AdminFlag};
use crate::AppState;

/// POST /api/v1/admin/users/:id/points
pub async fn adjust_points(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    ApiPath(target): ApiPath<Uuid>,
    ApiJson(request): ApiJson<AdjustPointsRequest>,
) -> ApiResult<Json<AdjustedPoints>> {
    let adjusted = state
        .admin
        .adjust_points(&caller, target, request.delta, request.reason.as_deref())
        .await?;
    Ok(Json(adjusted))
}

/// DELETE /api/v1/admin/users/:id
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    ApiPath(target): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.admin.delete_user(&caller, target).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/users/:id/toggle-admin
pub async fn toggle_admin(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    ApiPath(target): ApiPath<Uuid>,
) -> ApiResult<Json<AdminFlag>> {
    let flag = state.admin.toggle_admin(&caller, target).await?;
    Ok(Json(flag))
}

/// POST /api/v1/admin/leaderboard/reset
pub async fn reset_leaderboard(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
) -> ApiResult<Json<LeaderboardResetResponse>> {
    let profiles_reset = state.admin.reset_leaderboard(&caller).await?;
    Ok(Json(LeaderboardResetResponse { profiles_reset }))
}

/// GET /api/v1/admin/audit-log
pub async fn audit_log(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    ApiQuery(query): ApiQuery<AuditLogQuery>,
) -> ApiResult<Json<Vec<AuditLogEntry>>> {
    let entries = state
        .admin
        .audit_log(&caller, query.target, query.limit)
        .await?;
    Ok(Json(entries))
}
