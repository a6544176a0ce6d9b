//! Scoring Routes
//!
//! - GET /api/v1/scoring/tiers - Tier bands in ascending order

use axum::Json;

use crate::api::dto::TierInfo;
use crate::scoring::tier::TIERS;

/// GET /api/v1/scoring/tiers
pub async fn list_tiers() -> Json<Vec<TierInfo>> {
    let tiers = TIERS
        .iter()
        .map(|tier| TierInfo {
            tier: *tier,
            name: tier.display_name(),
            min_points: tier.min_points(),
        })
        .collect();

    Json(tiers)
}
