use crate::scoring::{Tier, TierProgress};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Player profile; `id` is the auth subject
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub points: i64,
    pub weekly_points: i64,
    pub tier: String, // Stored as TEXT, use Tier for type safety
    pub mmr: i32,
    pub streak_days: i32,
    pub last_reward_date: Option<NaiveDate>,
    pub is_admin: bool,
    pub is_premium: bool,
    pub premium_expires_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Profile {
    /// Tier as stored, falling back to the one derived from points
    pub fn tier_enum(&self) -> Tier {
        Tier::from_str(&self.tier).unwrap_or_else(|_| Tier::from_points(self.points))
    }

    pub fn tier_progress(&self) -> TierProgress {
        TierProgress::for_points(self.points)
    }

    /// Premium counts only while the expiry lies in the future
    pub fn premium_active(&self, now: NaiveDateTime) -> bool {
        self.is_premium && self.premium_expires_at.map_or(false, |expiry| expiry > now)
    }

    /// Username for a profile created on first sign-in
    pub fn default_username(id: Uuid, email: Option<&str>) -> String {
        let from_email = email
            .and_then(|e| e.split('@').next())
            .map(|local| {
                local
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '.')
                    .take(24)
                    .collect::<String>()
            })
            .filter(|name| name.len() >= 3);

        match from_email {
            Some(name) => name,
            None => {
                let simple = id.simple().to_string();
                format!("player_{}", &simple[..8])
            }
        }
    }
}

/// Profile plus derived values returned to its owner
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    #[serde(flatten)]
    pub profile: Profile,
    pub progress: TierProgress,
    pub premium_active: bool,
}

impl ProfileSummary {
    pub fn new(profile: Profile, now: NaiveDateTime) -> Self {
        Self {
            progress: profile.tier_progress(),
            premium_active: profile.premium_active(now),
            profile,
        }
    }
}
