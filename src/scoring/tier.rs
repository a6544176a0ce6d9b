use serde::{Deserialize, Serialize};

/// Rank band derived from a player's lifetime points
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
    Champion,
}

/// All tiers in ascending order
pub const TIERS: [Tier; 6] = [
    Tier::Bronze,
    Tier::Silver,
    Tier::Gold,
    Tier::Platinum,
    Tier::Diamond,
    Tier::Champion,
];

impl Tier {
    /// Map a point total to its tier.
    ///
    /// Negative totals are treated as zero, so the mapping is total and
    /// monotonic over every `i64`.
    pub fn from_points(points: i64) -> Self {
        let points = points.max(0);
        TIERS
            .iter()
            .rev()
            .find(|tier| points >= tier.min_points())
            .copied()
            .unwrap_or(Tier::Bronze)
    }

    /// Lowest point total that belongs to this tier
    pub fn min_points(&self) -> i64 {
        match self {
            Tier::Bronze => 0,
            Tier::Silver => 3_000,
            Tier::Gold => 7_500,
            Tier::Platinum => 15_000,
            Tier::Diamond => 30_000,
            Tier::Champion => 50_000,
        }
    }

    /// The tier directly above this one, `None` for champion
    pub fn next(&self) -> Option<Tier> {
        match self {
            Tier::Bronze => Some(Tier::Silver),
            Tier::Silver => Some(Tier::Gold),
            Tier::Gold => Some(Tier::Platinum),
            Tier::Platinum => Some(Tier::Diamond),
            Tier::Diamond => Some(Tier::Champion),
            Tier::Champion => None,
        }
    }

    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "bronze" => Ok(Tier::Bronze),
            "silver" => Ok(Tier::Silver),
            "gold" => Ok(Tier::Gold),
            "platinum" => Ok(Tier::Platinum),
            "diamond" => Ok(Tier::Diamond),
            "champion" => Ok(Tier::Champion),
            _ => Err(format!("Invalid tier: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Bronze => "bronze",
            Tier::Silver => "silver",
            Tier::Gold => "gold",
            Tier::Platinum => "platinum",
            Tier::Diamond => "diamond",
            Tier::Champion => "champion",
        }
    }

    /// Display name used in notifications
    pub fn display_name(&self) -> &'static str {
        match self {
            Tier::Bronze => "Bronze",
            Tier::Silver => "Silver",
            Tier::Gold => "Gold",
            Tier::Platinum => "Platinum",
            Tier::Diamond => "Diamond",
            Tier::Champion => "Champion",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a point total sits inside its tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierProgress {
    pub tier: Tier,
    pub next_tier: Option<Tier>,
    /// Points still needed to reach `next_tier` (0 at champion)
    pub points_to_next_tier: i64,
    /// 0..=100, champion is always 100
    pub progress_percent: u8,
}

impl TierProgress {
    pub fn for_points(points: i64) -> Self {
        let points = points.max(0);
        let tier = Tier::from_points(points);

        match tier.next() {
            Some(next) => {
                let span = next.min_points() - tier.min_points();
                let into = points - tier.min_points();
                let percent = (into * 100 / span).clamp(0, 100) as u8;
                Self {
                    tier,
                    next_tier: Some(next),
                    points_to_next_tier: next.min_points() - points,
                    progress_percent: percent,
                }
            }
            None => Self {
                tier,
                next_tier: None,
                points_to_next_tier: 0,
                progress_percent: 100,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(Tier::from_points(0), Tier::Bronze);
        assert_eq!(Tier::from_points(2_999), Tier::Bronze);
        assert_eq!(Tier::from_points(3_000), Tier::Silver);
        assert_eq!(Tier::from_points(7_499), Tier::Silver);
        assert_eq!(Tier::from_points(7_500), Tier::Gold);
        assert_eq!(Tier::from_points(15_000), Tier::Platinum);
        assert_eq!(Tier::from_points(30_000), Tier::Diamond);
        assert_eq!(Tier::from_points(49_999), Tier::Diamond);
        assert_eq!(Tier::from_points(50_000), Tier::Champion);
        assert_eq!(Tier::from_points(i64::MAX), Tier::Champion);
    }

    #[test]
    fn test_negative_points_clamp_to_bronze() {
        assert_eq!(Tier::from_points(-1), Tier::Bronze);
        assert_eq!(Tier::from_points(i64::MIN), Tier::Bronze);
    }

    #[test]
    fn test_tier_is_monotonic() {
        let mut previous = Tier::from_points(0);
        for points in (0..=60_000).step_by(250) {
            let current = Tier::from_points(points);
            assert!(current >= previous, "tier dropped at {} points", points);
            previous = current;
        }
    }

    #[test]
    fn test_tier_string_roundtrip() {
        for tier in TIERS {
            assert_eq!(Tier::from_str(tier.as_str()).unwrap(), tier);
        }
        assert!(Tier::from_str("mythic").is_err());
    }

    #[test]
    fn test_progress_mid_tier() {
        let progress = TierProgress::for_points(5_250);
        assert_eq!(progress.tier, Tier::Silver);
        assert_eq!(progress.next_tier, Some(Tier::Gold));
        assert_eq!(progress.points_to_next_tier, 2_250);
        assert_eq!(progress.progress_percent, 50);
    }

    #[test]
    fn test_progress_at_champion() {
        let progress = TierProgress::for_points(80_000);
        assert_eq!(progress.tier, Tier::Champion);
        assert_eq!(progress.next_tier, None);
        assert_eq!(progress.points_to_next_tier, 0);
        assert_eq!(progress.progress_percent, 100);
    }
}
