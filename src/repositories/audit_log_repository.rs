use crate::error::RepositoryError;
use crate::models::{AdminAction, AuditLogEntry};
use serde_json::{Map, Value};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// Audit row waiting to be written
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub admin_id: Option<Uuid>,
    pub action: AdminAction,
    pub target_user_id: Option<Uuid>,
    pub details: Map<String, Value>,
}

impl NewAuditEntry {
    pub fn new(admin_id: Option<Uuid>, action: AdminAction, target_user_id: Option<Uuid>) -> Self {
        Self {
            admin_id,
            action,
            target_user_id,
            details: Map::new(),
        }
    }

    pub fn with_detail(mut self, key: &str, value: Value) -> Self {
        self.details.insert(key.to_string(), value);
        self
    }
}

/// Insert an audit row on an open connection or transaction
pub(crate) async fn insert_entry(
    conn: &mut PgConnection,
    entry: &NewAuditEntry,
) -> Result<AuditLogEntry, RepositoryError> {
    let row = sqlx::query_as::<_, AuditLogEntry>(
        r#"
        INSERT INTO admin_audit_log (admin_id, action, target_user_id, details)
        VALUES ($1, $2, $3, $4)
        RETURNING id, admin_id, action, target_user_id, details, created_at
        "#,
    )
    .bind(entry.admin_id)
    .bind(entry.action.as_str())
    .bind(entry.target_user_id)
    .bind(Value::Object(entry.details.clone()))
    .fetch_one(&mut *conn)
    .await?;

    Ok(row)
}

/// Repository for the admin audit log
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Write a standalone audit row
    pub async fn insert(&self, entry: &NewAuditEntry) -> Result<AuditLogEntry, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        insert_entry(&mut *conn, entry).await
    }

    /// Most recent entries mentioning `target_user_id`
    pub async fn find_by_target(
        &self,
        target_user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<AuditLogEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, AuditLogEntry>(
            r#"
            SELECT id, admin_id, action, target_user_id, details, created_at
            FROM admin_audit_log
            WHERE target_user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(target_user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Most recent entries overall
    pub async fn recent(&self, limit: i64) -> Result<Vec<AuditLogEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, AuditLogEntry>(
            r#"
            SELECT id, admin_id, action, target_user_id, details, created_at
            FROM admin_audit_log
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
