use crate::error::{AppError, AppResult};
use crate::models::{Notification, NotificationKind};
use crate::repositories::NotificationRepository;
use crate::websocket::{WebSocketServer, WsMessage};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

const DEFAULT_PAGE: i64 = 50;
const MAX_PAGE: i64 = 100;

/// Stores in-app notifications and pushes them to connected clients
pub struct NotificationService {
    notification_repo: Arc<NotificationRepository>,
    ws_server: Arc<WebSocketServer>,
}

impl NotificationService {
    pub fn new(
        notification_repo: Arc<NotificationRepository>,
        ws_server: Arc<WebSocketServer>,
    ) -> Self {
        Self {
            notification_repo,
            ws_server,
        }
    }

    /// Store a notification and push it on the user's channel
    pub async fn notify(
        &self,
        user_id: Uuid,
        kind: NotificationKind,
        title: &str,
        body: &str,
    ) -> AppResult<Notification> {
        let notification = self.notification_repo.create(user_id, kind, title, body).await?;

        self.ws_server
            .publish(WsMessage::Notification {
                user_id,
                notification_id: notification.id,
                kind: notification.kind.clone(),
                title: notification.title.clone(),
                body: notification.body.clone(),
            })
            .await;

        Ok(notification)
    }

    /// Like `notify`, for follow-ups of an already committed change:
    /// a failure is logged instead of failing the caller's request.
    pub async fn notify_best_effort(
        &self,
        user_id: Uuid,
        kind: NotificationKind,
        title: &str,
        body: &str,
    ) {
        if let Err(e) = self.notify(user_id, kind, title, body).await {
            warn!("Failed to notify {} ({}): {}", user_id, kind.as_str(), e);
        }
    }

    /// Raw realtime push without a stored notification
    pub async fn push(&self, message: WsMessage) {
        self.ws_server.publish(message).await;
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        unread_only: bool,
        limit: Option<i64>,
    ) -> AppResult<Vec<Notification>> {
        let limit = limit.unwrap_or(DEFAULT_PAGE).clamp(1, MAX_PAGE);
        let notifications = self
            .notification_repo
            .find_by_user(user_id, unread_only, limit)
            .await?;
        Ok(notifications)
    }

    /// Mark read; 404 when the notification does not belong to the caller
    pub async fn mark_read(&self, user_id: Uuid, notification_id: Uuid) -> AppResult<Notification> {
        self.notification_repo
            .mark_read(user_id, notification_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))
    }

    pub async fn unread_count(&self, user_id: Uuid) -> AppResult<i64> {
        Ok(self.notification_repo.count_unread(user_id).await?)
    }
}
