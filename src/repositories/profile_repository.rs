//! Repository for player profiles and the point/tier write paths

use crate::error::RepositoryError;
use crate::models::Profile;
use crate::repositories::audit_log_repository::{insert_entry, NewAuditEntry};
use crate::scoring::{daily_reward, next_streak, StreakCheck, Tier};
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

pub(crate) const PROFILE_COLUMNS: &str = "id, username, email, points, weekly_points, tier, mmr, \
     streak_days, last_reward_date, is_admin, is_premium, premium_expires_at, \
     created_at, updated_at";

/// Result of moving a profile's points
#[derive(Debug, Clone)]
pub struct PointsChange {
    /// Profile after the write
    pub profile: Profile,
    pub previous_points: i64,
    pub previous_tier: Tier,
    /// Delta actually applied to lifetime points after saturation
    pub applied_delta: i64,
}

impl PointsChange {
    pub fn new_tier(&self) -> Tier {
        self.profile.tier_enum()
    }

    pub fn promoted(&self) -> bool {
        self.new_tier() > self.previous_tier
    }
}

/// Outcome of a daily reward claim
#[derive(Debug, Clone)]
pub struct DailyRewardClaim {
    pub streak: i64,
    pub reward: i64,
    pub change: PointsChange,
}

/// Lock a profile row for the rest of the transaction
pub(crate) async fn lock_profile(
    conn: &mut PgConnection,
    id: Uuid,
) -> Result<Option<Profile>, RepositoryError> {
    let query = format!("SELECT {} FROM profiles WHERE id = $1 FOR UPDATE", PROFILE_COLUMNS);
    let profile = sqlx::query_as::<_, Profile>(&query)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(profile)
}

/// Move lifetime and weekly points of a locked profile by `delta`,
/// saturating both at zero, and keep `tier` in step with `points`.
pub(crate) async fn apply_points(
    conn: &mut PgConnection,
    locked: &Profile,
    delta: i64,
) -> Result<PointsChange, RepositoryError> {
    let points = locked.points.saturating_add(delta).max(0);
    let weekly_points = locked.weekly_points.saturating_add(delta).max(0);
    let tier = Tier::from_points(points);

    let query = format!(
        r#"
        UPDATE profiles
        SET points = $2, weekly_points = $3, tier = $4, updated_at = (NOW() AT TIME ZONE 'utc')
        WHERE id = $1
        RETURNING {}
        "#,
        PROFILE_COLUMNS
    );
    let profile = sqlx::query_as::<_, Profile>(&query)
        .bind(locked.id)
        .bind(points)
        .bind(weekly_points)
        .bind(tier.as_str())
        .fetch_one(&mut *conn)
        .await?;

    Ok(PointsChange {
        profile,
        previous_points: locked.points,
        previous_tier: locked.tier_enum(),
        applied_delta: points - locked.points,
    })
}

/// Repository for profile data access
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    /// Create a new ProfileRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a profile by UUID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, RepositoryError> {
        let query = format!("SELECT {} FROM profiles WHERE id = $1", PROFILE_COLUMNS);
        let profile = sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    /// Find a profile, creating it on first sign-in (upsert pattern)
    pub async fn find_or_create(
        &self,
        id: Uuid,
        email: Option<&str>,
    ) -> Result<Profile, RepositoryError> {
        if let Some(profile) = self.find_by_id(id).await? {
            return Ok(profile);
        }

        let username = Profile::default_username(id, email);
        sqlx::query(
            r#"
            INSERT INTO profiles (id, username, email)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(&username)
        .bind(email)
        .execute(&self.pool)
        .await?;

        // A concurrent first request may have won the insert
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("Profile {} not found", id)))
    }

    /// Add `delta` points (negative to remove) and write the audit row in the same transaction
    pub async fn adjust_points_audited(
        &self,
        id: Uuid,
        delta: i64,
        audit: NewAuditEntry,
    ) -> Result<PointsChange, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let locked = lock_profile(&mut *tx, id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("Profile {} not found", id)))?;
        let change = apply_points(&mut *tx, &locked, delta).await?;

        let audit = audit
            .with_detail("points_before", locked.points.into())
            .with_detail("points_after", change.profile.points.into());
        insert_entry(&mut *tx, &audit).await?;

        tx.commit().await?;
        Ok(change)
    }

    /// Claim today's login reward.
    ///
    /// # Returns
    /// * `Err(RepositoryError::Duplicate)` when already claimed on `today`
    pub async fn claim_daily_reward(
        &self,
        id: Uuid,
        today: NaiveDate,
    ) -> Result<DailyRewardClaim, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let locked = lock_profile(&mut *tx, id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("Profile {} not found", id)))?;

        let streak = match next_streak(locked.last_reward_date, locked.streak_days as i64, today) {
            StreakCheck::AlreadyClaimed => {
                return Err(RepositoryError::Duplicate(
                    "Daily reward already claimed today".to_string(),
                ))
            }
            StreakCheck::Claimable(streak) => streak,
        };
        let reward = daily_reward(streak);

        sqlx::query("UPDATE profiles SET streak_days = $2, last_reward_date = $3 WHERE id = $1")
            .bind(id)
            .bind(streak.min(i32::MAX as i64) as i32)
            .bind(today)
            .execute(&mut *tx)
            .await?;

        // RETURNING picks up the streak written above
        let change = apply_points(&mut *tx, &locked, reward).await?;

        tx.commit().await?;
        Ok(DailyRewardClaim { streak, reward, change })
    }

    /// Flip `is_admin`, recording the audit row in the same transaction
    pub async fn toggle_admin(
        &self,
        id: Uuid,
        audit: NewAuditEntry,
    ) -> Result<Profile, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let query = format!(
            r#"
            UPDATE profiles
            SET is_admin = NOT is_admin, updated_at = (NOW() AT TIME ZONE 'utc')
            WHERE id = $1
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        );
        let profile = sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("Profile {} not found", id)))?;

        let audit = audit.with_detail("is_admin", profile.is_admin.into());
        insert_entry(&mut *tx, &audit).await?;

        tx.commit().await?;
        Ok(profile)
    }

    /// Delete a profile and everything that cascades from it.
    /// The audit row is inserted first and, having no foreign key, survives.
    pub async fn delete_audited(
        &self,
        id: Uuid,
        audit: NewAuditEntry,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        insert_entry(&mut *tx, &audit).await?;

        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Profile {} not found", id)));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Zero every weekly total, returning the number of profiles touched
    pub async fn reset_weekly_points(&self, audit: NewAuditEntry) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET weekly_points = 0, updated_at = (NOW() AT TIME ZONE 'utc')
            "#,
        )
        .execute(&mut *tx)
        .await?;
        let reset = result.rows_affected();

        let audit = audit.with_detail("profiles_reset", reset.into());
        insert_entry(&mut *tx, &audit).await?;

        tx.commit().await?;
        Ok(reset)
    }

    /// Extend premium for a locked profile; used by payment settlement
    pub(crate) async fn set_premium(
        conn: &mut PgConnection,
        id: Uuid,
        expires_at: NaiveDateTime,
    ) -> Result<Profile, RepositoryError> {
        let query = format!(
            r#"
            UPDATE profiles
            SET is_premium = TRUE, premium_expires_at = $2, updated_at = (NOW() AT TIME ZONE 'utc')
            WHERE id = $1
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        );
        let profile = sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .bind(expires_at)
            .fetch_one(&mut *conn)
            .await?;

        Ok(profile)
    }
}
