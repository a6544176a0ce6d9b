use super::PaymentError;
use crate::config::PaymentConfig;
use chrono::{Duration, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Premium subscription plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PremiumPlan {
    Monthly,
    Yearly,
}

impl PremiumPlan {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, PaymentError> {
        match s.to_lowercase().as_str() {
            "monthly" => Ok(PremiumPlan::Monthly),
            "yearly" => Ok(PremiumPlan::Yearly),
            _ => Err(PaymentError::UnknownPlan(s.to_string())),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            PremiumPlan::Monthly => "monthly",
            PremiumPlan::Yearly => "yearly",
        }
    }

    pub fn duration_days(&self) -> i64 {
        match self {
            PremiumPlan::Monthly => 30,
            PremiumPlan::Yearly => 365,
        }
    }

    /// Configured price in major currency units
    pub fn price(&self, config: &PaymentConfig) -> Decimal {
        match self {
            PremiumPlan::Monthly => config.monthly_price,
            PremiumPlan::Yearly => config.yearly_price,
        }
    }
}

/// Convert a major-unit amount (naira) to the minor units the gateway expects (kobo)
pub fn to_minor_units(amount: Decimal) -> Result<i64, PaymentError> {
    if amount <= Decimal::ZERO {
        return Err(PaymentError::InvalidAmount(format!("{} must be positive", amount)));
    }
    let minor = (amount * Decimal::from(100)).round();
    minor
        .to_i64()
        .ok_or_else(|| PaymentError::InvalidAmount(format!("{} is out of range", amount)))
}

/// Convert gateway minor units back to a major-unit amount
pub fn from_minor_units(minor: i64) -> Decimal {
    Decimal::new(minor, 2)
}

/// New premium expiry after paying for `plan`.
///
/// Time left on an active subscription is kept; an expired or missing one
/// starts from `now`.
pub fn extend_premium(
    current: Option<NaiveDateTime>,
    now: NaiveDateTime,
    plan: PremiumPlan,
) -> NaiveDateTime {
    let start = match current {
        Some(expiry) if expiry > now => expiry,
        _ => now,
    };
    start + Duration::days(plan.duration_days())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    #[test]
    fn test_plan_parsing() {
        assert_eq!(PremiumPlan::from_str("Monthly").unwrap(), PremiumPlan::Monthly);
        assert_eq!(PremiumPlan::from_str("yearly").unwrap().duration_days(), 365);
        assert!(matches!(
            PremiumPlan::from_str("lifetime"),
            Err(PaymentError::UnknownPlan(p)) if p == "lifetime"
        ));
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(to_minor_units(Decimal::from_str("2000.00").unwrap()).unwrap(), 200_000);
        assert_eq!(to_minor_units(Decimal::from_str("19.999").unwrap()).unwrap(), 2_000);
        assert!(to_minor_units(Decimal::ZERO).is_err());
        assert_eq!(from_minor_units(200_000), Decimal::from_str("2000.00").unwrap());
    }

    #[test]
    fn test_extend_from_now_when_expired() {
        let now = at(2026, 3, 1);
        assert_eq!(extend_premium(None, now, PremiumPlan::Monthly), at(2026, 3, 31));
        assert_eq!(
            extend_premium(Some(at(2026, 1, 1)), now, PremiumPlan::Monthly),
            at(2026, 3, 31)
        );
    }

    #[test]
    fn test_extend_keeps_remaining_time() {
        let now = at(2026, 3, 1);
        assert_eq!(
            extend_premium(Some(at(2026, 3, 11)), now, PremiumPlan::Monthly),
            at(2026, 4, 10)
        );
    }

    #[test]
    fn test_price_from_config() {
        let config = PaymentConfig::default();
        assert_eq!(PremiumPlan::Monthly.price(&config), config.monthly_price);
        assert_eq!(PremiumPlan::Yearly.price(&config), config.yearly_price);
    }
}
