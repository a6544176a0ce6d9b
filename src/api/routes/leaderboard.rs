//! Leaderboard Routes
//!
//! - GET /api/v1/leaderboard?period=&limit= - Ranked page
//! - GET /api/v1/leaderboard/me?period= - Caller's rank

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::LeaderboardQuery;
use crate::api::error::ApiResult;
use crate::api::extract::{AuthUser, ApiQuery};
use crate::error::AppError;
use crate::models::LeaderboardPeriod;
use crate::services::{LeaderboardPage, MyRank};
use crate::AppState;

fn parse_period(period: Option<&str>) -> ApiResult<LeaderboardPeriod> {
    match period {
        None => Ok(LeaderboardPeriod::default()),
        Some(value) => LeaderboardPeriod::from_str(value).map_err(AppError::Validation),
    }
}

/// GET /api/v1/leaderboard
pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<LeaderboardQuery>,
) -> ApiResult<Json<LeaderboardPage>> {
    let period = parse_period(query.period.as_deref())?;
    let page = state.leaderboard.leaderboard(period, query.limit).await?;
    Ok(Json(page))
}

/// GET /api/v1/leaderboard/me
pub async fn get_my_rank(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    ApiQuery(query): ApiQuery<LeaderboardQuery>,
) -> ApiResult<Json<MyRank>> {
    let period = parse_period(query.period.as_deref())?;
    state.gameplay.ensure_profile(&user).await?;
    let rank = state.leaderboard.my_rank(user.id, period).await?;
    Ok(Json(rank))
}
