//! Gameplay Routes
//!
//! - POST /api/v1/quiz/results - Submit a finished quiz
//! - GET /api/v1/quiz/results - Caller's recent plays
//! - POST /api/v1/duels/ranked - Record a ranked duel result
//! - POST /api/v1/rewards/daily - Claim the daily login reward
//! - POST /api/v1/daily-challenge - Submit today's challenge attempt
//! - GET /api/v1/daily-challenge/standing - Caller's standing in today's challenge

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{DailyChallengeRequest, HistoryQuery};
use crate::api::error::ApiResult;
use crate::api::extract::{AuthUser, ApiJson, ApiQuery};
use crate::models::{DailyChallengeStanding, QuizResult};
use crate::services::{DailyRewardOutcome, DuelOutcomeView, DuelReport, QuizOutcome, QuizSubmission};
use crate::AppState;

/// POST /api/v1/quiz/results
pub async fn submit_quiz(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    ApiJson(submission): ApiJson<QuizSubmission>,
) -> ApiResult<(StatusCode, Json<QuizOutcome>)> {
    let outcome = state.gameplay.submit_quiz_result(&user, submission).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// GET /api/v1/quiz/results?limit=20
pub async fn recent_quiz_results(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    ApiQuery(query): ApiQuery<HistoryQuery>,
) -> ApiResult<Json<Vec<QuizResult>>> {
    let results = state.gameplay.recent_results(&user, query.limit).await?;
    Ok(Json(results))
}

/// POST /api/v1/duels/ranked
pub async fn record_duel(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    ApiJson(report): ApiJson<DuelReport>,
) -> ApiResult<(StatusCode, Json<DuelOutcomeView>)> {
    let outcome = state.gameplay.record_ranked_duel(&user, report).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// POST /api/v1/rewards/daily
///
/// 409 when today's reward was already claimed.
pub async fn claim_daily_reward(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<DailyRewardOutcome>> {
    let outcome = state.gameplay.claim_daily_reward(&user).await?;
    Ok(Json(outcome))
}

/// POST /api/v1/daily-challenge
pub async fn submit_daily_challenge(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    ApiJson(request): ApiJson<DailyChallengeRequest>,
) -> ApiResult<(StatusCode, Json<DailyChallengeStanding>)> {
    let standing = state
        .gameplay
        .submit_daily_challenge(&user, request.score, request.time_taken_secs)
        .await?;
    Ok((StatusCode::CREATED, Json(standing)))
}

/// GET /api/v1/daily-challenge/standing
pub async fn daily_challenge_standing(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<DailyChallengeStanding>> {
    let standing = state.gameplay.daily_challenge_standing(&user).await?;
    Ok(Json(standing))
}
