//! Notification Routes
//!
//! - GET /api/v1/notifications?unread_only=&limit= - Caller's notifications, newest first
//! - GET /api/v1/notifications/unread-count - Number of unread notifications
//! - POST /api/v1/notifications/:id/read - Mark one as read

use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::dto::NotificationQuery;
use crate::api::error::ApiResult;
use crate::api::extract::{AuthUser, ApiPath, ApiQuery};
use crate::models::Notification;
use crate::AppState;

/// GET /api/v1/notifications
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    ApiQuery(query): ApiQuery<NotificationQuery>,
) -> ApiResult<Json<Vec<Notification>>> {
    let notifications = state
        .notifications
        .list(user.id, query.unread_only, query.limit)
        .await?;
    Ok(Json(notifications))
}

/// GET /api/v1/notifications/unread-count
pub async fn unread_count(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Value>> {
    let unread = state.notifications.unread_count(user.id).await?;
    Ok(Json(json!({ "unread": unread })))
}

/// POST /api/v1/notifications/:id/read
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Notification>> {
    let notification = state.notifications.mark_read(user.id, id).await?;
    Ok(Json(notification))
}
