use crate::auth::AuthenticatedUser;
use crate::error::{AppError, AppResult};
use crate::models::{AuditLogEntry, NotificationKind, Profile};
use crate::repositories::ProfileRepository;
use crate::scoring::Tier;
use crate::services::{AuditTrailService, NotificationService};
use crate::websocket::WsMessage;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct AdjustedPoints {
    pub user_id: Uuid,
    pub requested_delta: i64,
    pub applied_delta: i64,
    pub points: i64,
    pub weekly_points: i64,
    pub tier: Tier,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminFlag {
    pub user_id: Uuid,
    pub is_admin: bool,
}

/// Privileged operations. Every write is audited in the same transaction.
pub struct AdminService {
    profile_repo: Arc<ProfileRepository>,
    audit: Arc<AuditTrailService>,
    notifications: Arc<NotificationService>,
}

impl AdminService {
    pub fn new(
        profile_repo: Arc<ProfileRepository>,
        audit: Arc<AuditTrailService>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            profile_repo,
            audit,
            notifications,
        }
    }

    /// Caller's profile if it carries the admin flag, 403 otherwise
    pub async fn require_admin(&self, caller: &AuthenticatedUser) -> AppResult<Profile> {
        match self.profile_repo.find_by_id(caller.id).await? {
            Some(profile) if profile.is_admin => Ok(profile),
            _ => {
                warn!("Admin action refused for {}", caller.id);
                Err(AppError::Forbidden("Admin privileges required".to_string()))
            }
        }
    }

    async fn load_target(&self, target: Uuid) -> AppResult<Profile> {
        self.profile_repo
            .find_by_id(target)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", target)))
    }

    /// Add or remove points; both totals saturate at zero
    pub async fn adjust_points(
        &self,
        caller: &AuthenticatedUser,
        target: Uuid,
        delta: i64,
        reason: Option<&str>,
    ) -> AppResult<AdjustedPoints> {
        let admin = self.require_admin(caller).await?;
        if delta == 0 {
            return Err(AppError::Validation("delta must not be zero".to_string()));
        }
        self.load_target(target).await?;

        let entry = self.audit.points_adjusted(admin.id, target, delta, reason);
        let change = self.profile_repo.adjust_points_audited(target, delta, entry).await?;

        info!(
            "Admin {} adjusted points of {} by {} (applied {})",
            admin.id, target, delta, change.applied_delta
        );

        let body = match reason {
            Some(reason) => format!(
                "An admin changed your points by {:+}: {}",
                change.applied_delta, reason
            ),
            None => format!("An admin changed your points by {:+}", change.applied_delta),
        };
        self.notifications
            .notify_best_effort(target, NotificationKind::PointsAdjusted, "Points adjusted", &body)
            .await;
        if change.promoted() {
            self.notifications
                .push(WsMessage::TierPromoted {
                    user_id: target,
                    from: change.previous_tier,
                    to: change.new_tier(),
                    points: change.profile.points,
                })
                .await;
        }

        Ok(AdjustedPoints {
            user_id: target,
            requested_delta: delta,
            applied_delta: change.applied_delta,
            points: change.profile.points,
            weekly_points: change.profile.weekly_points,
            tier: change.new_tier(),
        })
    }

    /// Delete a user and all of their data
    pub async fn delete_user(&self, caller: &AuthenticatedUser, target: Uuid) -> AppResult<()> {
        let admin = self.require_admin(caller).await?;
        if target == admin.id {
            return Err(AppError::Validation("Admins cannot delete themselves".to_string()));
        }
        let profile = self.load_target(target).await?;

        let entry = self
            .audit
            .user_deleted(admin.id, target, &profile.username, profile.email.as_deref());
        self.profile_repo.delete_audited(target, entry).await?;

        info!("Admin {} deleted user {} ({})", admin.id, target, profile.username);
        Ok(())
    }

    /// Grant or revoke admin rights on another user
    pub async fn toggle_admin(
        &self,
        caller: &AuthenticatedUser,
        target: Uuid,
    ) -> AppResult<AdminFlag> {
        let admin = self.require_admin(caller).await?;
        if target == admin.id {
            return Err(AppError::Validation(
                "Admins cannot change their own admin flag".to_string(),
            ));
        }
        self.load_target(target).await?;

        let entry = self.audit.admin_toggled(admin.id, target);
        let profile = self.profile_repo.toggle_admin(target, entry).await?;

        info!("Admin {} set is_admin={} on {}", admin.id, profile.is_admin, target);
        Ok(AdminFlag {
            user_id: profile.id,
            is_admin: profile.is_admin,
        })
    }

    /// Zero all weekly points
    pub async fn reset_leaderboard(&self, caller: &AuthenticatedUser) -> AppResult<u64> {
        let admin = self.require_admin(caller).await?;

        let entry = self.audit.leaderboard_reset(admin.id);
        let reset = self.profile_repo.reset_weekly_points(entry).await?;

        info!("Admin {} reset the weekly leaderboard ({} profiles)", admin.id, reset);
        self.notifications
            .push(WsMessage::LeaderboardReset {
                profiles_reset: reset,
                timestamp: chrono::Utc::now().timestamp(),
            })
            .await;

        Ok(reset)
    }

    /// Read the audit trail
    pub async fn audit_log(
        &self,
        caller: &AuthenticatedUser,
        target: Option<Uuid>,
        limit: Option<i64>,
    ) -> AppResult<Vec<AuditLogEntry>> {
        self.require_admin(caller).await?;
        self.audit.recent(target, limit.unwrap_or(50)).await
    }
}
