use crate::auth::AuthenticatedUser;
use crate::error::{AppError, AppResult};
use crate::models::{
    DailyChallengeStanding, Duel, NotificationKind, Profile, ProfileSummary, QuizResult,
};
use crate::repositories::{
    DailyChallengeRepository, DuelOutcome, DuelRepository, PointsChange, ProfileRepository,
    QuizResultRepository,
};
use crate::scoring::{Difficulty, QuizMode, QuizPerformance, Tier, TierProgress, XpBreakdown};
use crate::services::NotificationService;
use crate::websocket::WsMessage;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const DEFAULT_HISTORY: i64 = 20;
const MAX_HISTORY: i64 = 100;

/// A finished quiz as reported by the client
#[derive(Debug, Clone, Deserialize)]
pub struct QuizSubmission {
    pub mode: QuizMode,
    pub correct_answers: i64,
    pub total_questions: i64,
    pub time_taken_secs: i64,
    #[serde(default)]
    pub streak: i64,
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl QuizSubmission {
    fn performance(&self) -> QuizPerformance {
        QuizPerformance {
            correct: self.correct_answers,
            total: self.total_questions,
            time_taken_secs: self.time_taken_secs,
            streak: self.streak,
            difficulty: self.difficulty,
        }
    }
}

/// Where a points change left the player
#[derive(Debug, Clone, Serialize)]
pub struct StandingAfter {
    pub points: i64,
    pub weekly_points: i64,
    pub previous_tier: Tier,
    pub tier: Tier,
    pub promoted: bool,
    pub progress: TierProgress,
}

impl From<&PointsChange> for StandingAfter {
    fn from(change: &PointsChange) -> Self {
        Self {
            points: change.profile.points,
            weekly_points: change.profile.weekly_points,
            previous_tier: change.previous_tier,
            tier: change.new_tier(),
            promoted: change.promoted(),
            progress: change.profile.tier_progress(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizOutcome {
    pub result_id: Uuid,
    pub xp: XpBreakdown,
    #[serde(flatten)]
    pub standing: StandingAfter,
}

/// Ranked duel as reported by one of its players
#[derive(Debug, Clone, Deserialize)]
pub struct DuelReport {
    pub match_id: Uuid,
    pub opponent_id: Uuid,
    /// Whether the reporting player won
    pub won: bool,
    pub player_score: i64,
    pub opponent_score: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DuelOutcomeView {
    pub match_id: Uuid,
    pub winner_id: Uuid,
    pub player_mmr: i32,
    pub player_delta: i32,
    pub opponent_mmr: i32,
    pub opponent_delta: i32,
}

impl From<&Duel> for DuelOutcomeView {
    fn from(duel: &Duel) -> Self {
        Self {
            match_id: duel.id,
            winner_id: duel.winner_id,
            player_mmr: duel.player_mmr_after(),
            player_delta: duel.player_delta,
            opponent_mmr: duel.opponent_mmr_after(),
            opponent_delta: duel.opponent_delta,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyRewardOutcome {
    pub streak: i64,
    pub reward: i64,
    #[serde(flatten)]
    pub standing: StandingAfter,
}

/// UTC calendar day and its first instant
fn utc_today() -> (NaiveDate, NaiveDateTime) {
    let now = Utc::now().naive_utc();
    let today = now.date();
    (today, today.and_time(chrono::NaiveTime::MIN))
}

/// Applies the scoring rules to stored profiles
pub struct GameplayService {
    profile_repo: Arc<ProfileRepository>,
    quiz_repo: Arc<QuizResultRepository>,
    duel_repo: Arc<DuelRepository>,
    challenge_repo: Arc<DailyChallengeRepository>,
    notifications: Arc<NotificationService>,
}

impl GameplayService {
    pub fn new(
        profile_repo: Arc<ProfileRepository>,
        quiz_repo: Arc<QuizResultRepository>,
        duel_repo: Arc<DuelRepository>,
        challenge_repo: Arc<DailyChallengeRepository>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            profile_repo,
            quiz_repo,
            duel_repo,
            challenge_repo,
            notifications,
        }
    }

    /// Load the caller's profile, creating it on first access
    pub async fn ensure_profile(&self, user: &AuthenticatedUser) -> AppResult<Profile> {
        let profile = self
            .profile_repo
            .find_or_create(user.id, user.email.as_deref())
            .await?;
        Ok(profile)
    }

    /// Own profile with tier progress and premium status
    pub async fn profile(&self, user: &AuthenticatedUser) -> AppResult<ProfileSummary> {
        let profile = self.ensure_profile(user).await?;
        Ok(ProfileSummary::new(profile, Utc::now().naive_utc()))
    }

    /// Score a quiz play and credit it to the caller
    pub async fn submit_quiz_result(
        &self,
        user: &AuthenticatedUser,
        submission: QuizSubmission,
    ) -> AppResult<QuizOutcome> {
        self.ensure_profile(user).await?;

        let (_, day_start) = utc_today();
        let play = self
            .quiz_repo
            .record_play(
                user.id,
                submission.mode,
                &submission.performance(),
                day_start,
                Utc::now().naive_utc(),
            )
            .await?;

        info!(
            "Quiz result {} for {}: mode={}, play #{}, awarded {} XP",
            play.result.id,
            user.id,
            submission.mode.as_str(),
            play.breakdown.play_index,
            play.breakdown.awarded_xp
        );

        self.announce_promotion(&play.change).await;

        Ok(QuizOutcome {
            result_id: play.result.id,
            xp: play.breakdown,
            standing: StandingAfter::from(&play.change),
        })
    }

    /// Settle a ranked duel reported by the caller
    pub async fn record_ranked_duel(
        &self,
        user: &AuthenticatedUser,
        report: DuelReport,
    ) -> AppResult<DuelOutcomeView> {
        if report.opponent_id == user.id {
            return Err(AppError::Validation("A player cannot duel themselves".to_string()));
        }
        if report.player_score < 0 || report.opponent_score < 0 {
            return Err(AppError::Validation("Scores cannot be negative".to_string()));
        }
        self.ensure_profile(user).await?;

        let (_, day_start) = utc_today();
        let duel = self
            .duel_repo
            .settle(&DuelOutcome {
                match_id: report.match_id,
                player_id: user.id,
                opponent_id: report.opponent_id,
                player_won: report.won,
                player_score: report.player_score,
                opponent_score: report.opponent_score,
                day_start,
            })
            .await?;

        info!(
            "Duel {} settled: winner={}, deltas {}/{}",
            duel.id, duel.winner_id, duel.player_delta, duel.opponent_delta
        );

        for (player, delta, mmr) in [
            (duel.player_id, duel.player_delta, duel.player_mmr_after()),
            (duel.opponent_id, duel.opponent_delta, duel.opponent_mmr_after()),
        ] {
            let won = duel.winner_id == player;
            let title = if won { "Ranked duel won" } else { "Ranked duel lost" };
            let body = format!("Your rating moved by {:+} to {}", delta, mmr);
            self.notifications
                .notify_best_effort(player, NotificationKind::DuelResult, title, &body)
                .await;
            self.notifications
                .push(WsMessage::DuelResolved {
                    user_id: player,
                    match_id: duel.id,
                    won,
                    mmr_delta: delta,
                    mmr,
                })
                .await;
        }

        Ok(DuelOutcomeView::from(&duel))
    }

    /// Claim the once-per-UTC-day login reward
    pub async fn claim_daily_reward(
        &self,
        user: &AuthenticatedUser,
    ) -> AppResult<DailyRewardOutcome> {
        self.ensure_profile(user).await?;

        let (today, _) = utc_today();
        let claim = self.profile_repo.claim_daily_reward(user.id, today).await?;

        info!(
            "Daily reward for {}: day {} of streak, +{} points",
            user.id, claim.streak, claim.reward
        );

        let body = format!("Day {} streak: +{} points", claim.streak, claim.reward);
        self.notifications
            .notify_best_effort(
                user.id,
                NotificationKind::DailyReward,
                "Daily reward claimed",
                &body,
            )
            .await;
        self.announce_promotion(&claim.change).await;

        Ok(DailyRewardOutcome {
            streak: claim.streak,
            reward: claim.reward,
            standing: StandingAfter::from(&claim.change),
        })
    }

    /// Record today's daily challenge attempt and return its standing
    pub async fn submit_daily_challenge(
        &self,
        user: &AuthenticatedUser,
        score: i64,
        time_taken_secs: i64,
    ) -> AppResult<DailyChallengeStanding> {
        if score < 0 || time_taken_secs < 0 {
            return Err(AppError::Validation("Score and time cannot be negative".to_string()));
        }
        let time_taken_secs = i32::try_from(time_taken_secs)
            .map_err(|_| AppError::Validation("time_taken_secs is too large".to_string()))?;
        self.ensure_profile(user).await?;

        let (today, _) = utc_today();
        self.challenge_repo
            .insert(user.id, today, score, time_taken_secs)
            .await?;
        info!("Daily challenge {} entry for {}: score {}", today, user.id, score);

        self.standing_on(user.id, today).await
    }

    /// Caller's latest plays, newest first
    pub async fn recent_results(
        &self,
        user: &AuthenticatedUser,
        limit: Option<i64>,
    ) -> AppResult<Vec<QuizResult>> {
        let limit = limit.unwrap_or(DEFAULT_HISTORY).clamp(1, MAX_HISTORY);
        Ok(self.quiz_repo.find_recent(user.id, limit).await?)
    }

    /// Caller's standing in today's challenge
    pub async fn daily_challenge_standing(
        &self,
        user: &AuthenticatedUser,
    ) -> AppResult<DailyChallengeStanding> {
        let (today, _) = utc_today();
        self.standing_on(user.id, today).await
    }

    async fn standing_on(
        &self,
        user_id: Uuid,
        day: NaiveDate,
    ) -> AppResult<DailyChallengeStanding> {
        self.challenge_repo
            .standing(user_id, day)
            .await?
            .ok_or_else(|| AppError::NotFound("No daily challenge entry for today".to_string()))
    }

    async fn announce_promotion(&self, change: &PointsChange) {
        if !change.promoted() {
            return;
        }

        let tier = change.new_tier();
        let user_id = change.profile.id;
        info!("{} promoted {} -> {}", user_id, change.previous_tier, tier);

        let body = format!(
            "You reached {} with {} points",
            tier.display_name(),
            change.profile.points
        );
        self.notifications
            .notify_best_effort(user_id, NotificationKind::TierPromoted, "Tier promotion", &body)
            .await;
        self.notifications
            .push(WsMessage::TierPromoted {
                user_id,
                from: change.previous_tier,
                to: tier,
                points: change.profile.points,
            })
            .await;
    }
}
