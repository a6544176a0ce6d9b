use crate::error::RepositoryError;
use crate::models::{Notification, NotificationKind};
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for in-app notifications
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        kind: NotificationKind,
        title: &str,
        body: &str,
    ) -> Result<Notification, RepositoryError> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (user_id, kind, title, body)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, kind, title, body, read, created_at
            "#,
        )
        .bind(user_id)
        .bind(kind.as_str())
        .bind(title)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;

        Ok(notification)
    }

    /// Newest first
    pub async fn find_by_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, user_id, kind, title, body, read, created_at
            FROM notifications
            WHERE user_id = $1 AND ($2 = FALSE OR read = FALSE)
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(unread_only)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    /// Mark one of the user's notifications read; `None` if it is not theirs
    pub async fn mark_read(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Notification>, RepositoryError> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET read = TRUE
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, kind, title, body, read, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }

    pub async fn count_unread(&self, user_id: Uuid) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND read = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
