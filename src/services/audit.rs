use crate::error::AppResult;
use crate::models::{AdminAction, AuditLogEntry};
use crate::repositories::{AuditLogRepository, NewAuditEntry};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Largest page of audit rows returned at once
const MAX_AUDIT_PAGE: i64 = 200;

/// Audit trail for privileged actions.
///
/// Entries built here are handed to the repository write that they
/// describe, so the row commits or rolls back together with the change.
pub struct AuditTrailService {
    audit_repo: Arc<AuditLogRepository>,
}

impl AuditTrailService {
    pub fn new(audit_repo: Arc<AuditLogRepository>) -> Self {
        Self { audit_repo }
    }

    /// Write a standalone entry
    pub async fn log(&self, entry: NewAuditEntry) -> AppResult<AuditLogEntry> {
        let row = self.audit_repo.insert(&entry).await?;
        info!(
            "Audit: {} by {:?} on {:?}",
            row.action, row.admin_id, row.target_user_id
        );
        Ok(row)
    }

    /// Entry for a manual points adjustment
    pub fn points_adjusted(
        &self,
        admin_id: Uuid,
        target: Uuid,
        delta: i64,
        reason: Option<&str>,
    ) -> NewAuditEntry {
        NewAuditEntry::new(Some(admin_id), AdminAction::AdjustPoints, Some(target))
            .with_detail("delta", delta.into())
            .with_detail("reason", reason.map(str::to_string).into())
    }

    /// Entry for a user deletion
    pub fn user_deleted(
        &self,
        admin_id: Uuid,
        target: Uuid,
        username: &str,
        email: Option<&str>,
    ) -> NewAuditEntry {
        NewAuditEntry::new(Some(admin_id), AdminAction::DeleteUser, Some(target))
            .with_detail("username", username.into())
            .with_detail("email", email.map(str::to_string).into())
    }

    /// Entry for an admin flag change
    pub fn admin_toggled(&self, admin_id: Uuid, target: Uuid) -> NewAuditEntry {
        NewAuditEntry::new(Some(admin_id), AdminAction::ToggleAdmin, Some(target))
    }

    /// Entry for a weekly leaderboard reset
    pub fn leaderboard_reset(&self, admin_id: Uuid) -> NewAuditEntry {
        NewAuditEntry::new(Some(admin_id), AdminAction::ResetLeaderboard, None)
    }

    /// Most recent entries, optionally narrowed to one target user
    pub async fn recent(&self, target: Option<Uuid>, limit: i64) -> AppResult<Vec<AuditLogEntry>> {
        let limit = limit.clamp(1, MAX_AUDIT_PAGE);
        let rows = match target {
            Some(target) => self.audit_repo.find_by_target(target, limit).await?,
            None => self.audit_repo.recent(limit).await?,
        };
        Ok(rows)
    }
}
