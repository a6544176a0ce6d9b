//! Repository tests against a real Postgres.
//!
//! `#[sqlx::test]` creates a throwaway database per test from
//! `DATABASE_URL` and applies `./migrations` to it.

mod helpers;

use chrono::{Duration, NaiveDate, SubsecRound, Utc};
use helpers::*;
use rankme_backend::error::RepositoryError;
use rankme_backend::models::*;
use rankme_backend::payments::PremiumPlan;
use rankme_backend::repositories::*;
use rankme_backend::scoring::{QuizMode, QuizPerformance, Tier};
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};
use uuid::Uuid;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
}

// ============================================================================
// Schema
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn test_migrations_ran(pool: PgPool) {
    let tables = [
        "profiles",
        "quiz_results",
        "duels",
        "daily_challenge_entries",
        "notifications",
        "payments",
        "admin_audit_log",
    ];

    for table in tables {
        let row = sqlx::query(
            "SELECT EXISTS (SELECT FROM information_schema.tables WHERE table_name = $1)",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap();

        let exists: bool = row.get(0);
        assert!(exists, "Table {} should exist", table);
    }
}

// ============================================================================
// Profiles
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn test_find_or_create_is_idempotent(pool: PgPool) {
    let db = TestDatabase::from_pool(pool);
    let id = Uuid::new_v4();

    let first = db.profile_repo.find_or_create(id, Some("ada.lovelace@example.com")).await.unwrap();
    let second = db.profile_repo.find_or_create(id, None).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.username, "ada.lovelace");
    assert_eq!(first.points, 0);
    assert_eq!(first.tier, "bronze");
    assert_eq!(first.mmr, 1000);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn test_adjust_points_promotes_and_saturates(pool: PgPool) {
    let db = TestDatabase::from_pool(pool);
    let profile = db.create_profile("climber@example.com").await;
    let entry = || NewAuditEntry::new(None, AdminAction::AdjustPoints, Some(profile.id));

    let up = db
        .profile_repo
        .adjust_points_audited(profile.id, 3_200, entry())
        .await
        .unwrap();
    assert!(up.promoted());
    assert_eq!(up.previous_tier, Tier::Bronze);
    assert_eq!(up.new_tier(), Tier::Silver);
    assert_eq!(up.profile.weekly_points, 3_200);

    let down = db
        .profile_repo
        .adjust_points_audited(profile.id, -10_000, entry())
        .await
        .unwrap();
    assert_eq!(down.profile.points, 0);
    assert_eq!(down.profile.weekly_points, 0);
    assert_eq!(down.applied_delta, -3_200);
    assert_eq!(down.new_tier(), Tier::Bronze);

    let trail = db.audit_repo.find_by_target(profile.id, 10).await.unwrap();
    assert_eq!(trail.len(), 2);
    assert!(trail
        .iter()
        .any(|e| e.details["points_before"] == 3_200 && e.details["points_after"] == 0));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn test_adjust_missing_profile(pool: PgPool) {
    let db = TestDatabase::from_pool(pool);
    let missing = Uuid::new_v4();
    let entry = NewAuditEntry::new(None, AdminAction::AdjustPoints, Some(missing));
    let result = db.profile_repo.adjust_points_audited(missing, 10, entry).await;
    assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    assert!(db.audit_repo.find_by_target(missing, 10).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn test_daily_reward_streak(pool: PgPool) {
    let db = TestDatabase::from_pool(pool);
    let profile = db.create_profile("daily@example.com").await;

    let first = db.profile_repo.claim_daily_reward(profile.id, day(1)).await.unwrap();
    assert_eq!((first.streak, first.reward), (1, 50));

    let again = db.profile_repo.claim_daily_reward(profile.id, day(1)).await;
    assert!(matches!(again, Err(RepositoryError::Duplicate(_))));

    let second = db.profile_repo.claim_daily_reward(profile.id, day(2)).await.unwrap();
    assert_eq!((second.streak, second.reward), (2, 60));
    assert_eq!(second.change.profile.streak_days, 2);
    assert_eq!(second.change.profile.points, 110);

    // Gap resets the streak
    let later = db.profile_repo.claim_daily_reward(profile.id, day(5)).await.unwrap();
    assert_eq!((later.streak, later.reward), (1, 50));
}

// ============================================================================
// Quiz plays
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn test_play_index_drives_diminishing_returns(pool: PgPool) {
    let db = TestDatabase::from_pool(pool);
    let profile = db.create_profile("farmer@example.com").await;
    let now = Utc::now().naive_utc();
    let day_start = now - Duration::hours(1);
    let perf = QuizPerformance {
        correct: 10,
        total: 10,
        time_taken_secs: 100,
        ..Default::default()
    };

    let mut awarded = Vec::new();
    for _ in 0..4 {
        let play = db
            .quiz_repo
            .record_play(profile.id, QuizMode::Classic, &perf, day_start, now)
            .await
            .unwrap();
        awarded.push((play.result.play_index, play.breakdown.awarded_xp));
    }

    assert_eq!(awarded, vec![(1, 150), (2, 150), (3, 150), (4, 112)]);
    assert_eq!(db.quiz_repo.find_recent(profile.id, 10).await.unwrap().len(), 4);

    let refreshed = db.profile_repo.find_by_id(profile.id).await.unwrap().unwrap();
    assert_eq!(refreshed.points, 562);
}

// ============================================================================
// Ranked duels
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn test_duel_settles_once(pool: PgPool) {
    let db = TestDatabase::from_pool(pool);
    let player = db.create_profile("player@example.com").await;
    let opponent = db.create_profile("opponent@example.com").await;

    let outcome = DuelOutcome {
        match_id: Uuid::new_v4(),
        player_id: player.id,
        opponent_id: opponent.id,
        player_won: true,
        player_score: 900,
        opponent_score: 800,
        day_start: Utc::now().naive_utc() - Duration::hours(1),
    };

    let duel = db.duel_repo.settle(&outcome).await.unwrap();
    assert_eq!(duel.winner_id, player.id);
    assert_eq!(duel.player_delta, 18);
    assert_eq!(duel.opponent_delta, -18);

    let player_after = db.profile_repo.find_by_id(player.id).await.unwrap().unwrap();
    let opponent_after = db.profile_repo.find_by_id(opponent.id).await.unwrap().unwrap();
    assert_eq!(player_after.mmr, 1018);
    assert_eq!(opponent_after.mmr, 982);

    let replay = db.duel_repo.settle(&outcome).await;
    assert!(matches!(replay, Err(RepositoryError::Duplicate(_))));

    let unchanged = db.profile_repo.find_by_id(player.id).await.unwrap().unwrap();
    assert_eq!(unchanged.mmr, 1018);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn test_pair_is_rated_once_per_day(pool: PgPool) {
    let db = TestDatabase::from_pool(pool);
    let victim = db.create_profile("victim@example.com").await;
    let reporter = db.create_profile("reporter@example.com").await;
    let bystander = db.create_profile("bystander@example.com").await;
    let day_start = Utc::now().naive_utc() - Duration::hours(1);

    let report = |player_id: Uuid, opponent_id: Uuid| DuelOutcome {
        match_id: Uuid::new_v4(),
        player_id,
        opponent_id,
        player_won: true,
        player_score: 500,
        opponent_score: 0,
        day_start,
    };

    db.duel_repo.settle(&report(reporter.id, victim.id)).await.unwrap();
    let drained = db.profile_repo.find_by_id(victim.id).await.unwrap().unwrap();

    // Fresh match ids from either seat are refused for the rest of the day
    for (player, opponent) in [(reporter.id, victim.id), (victim.id, reporter.id)] {
        let again = db.duel_repo.settle(&report(player, opponent)).await;
        assert!(matches!(again, Err(RepositoryError::Duplicate(msg)) if msg.contains("today")));
    }
    let after = db.profile_repo.find_by_id(victim.id).await.unwrap().unwrap();
    assert_eq!(after.mmr, drained.mmr);

    // Other pairings are unaffected
    db.duel_repo.settle(&report(reporter.id, bystander.id)).await.unwrap();

    // A later day opens the pair again
    let tomorrow = DuelOutcome {
        day_start: day_start + Duration::days(1),
        ..report(victim.id, reporter.id)
    };
    db.duel_repo.settle(&tomorrow).await.unwrap();
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn test_duel_against_self_rejected(pool: PgPool) {
    let db = TestDatabase::from_pool(pool);
    let player = db.create_profile("solo@example.com").await;

    let result = db
        .duel_repo
        .settle(&DuelOutcome {
            match_id: Uuid::new_v4(),
            player_id: player.id,
            opponent_id: player.id,
            player_won: true,
            player_score: 1,
            opponent_score: 0,
            day_start: Utc::now().naive_utc(),
        })
        .await;

    assert!(matches!(result, Err(RepositoryError::InvalidInput(_))));
}

// ============================================================================
// Daily challenge
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn test_daily_challenge_competition_ranking(pool: PgPool) {
    let db = TestDatabase::from_pool(pool);
    let fast = db.create_profile("fast@example.com").await;
    let slow = db.create_profile("slow@example.com").await;
    let tied = db.create_profile("tied@example.com").await;
    let last = db.create_profile("last@example.com").await;

    db.challenge_repo.insert(fast.id, day(3), 900, 40).await.unwrap();
    db.challenge_repo.insert(slow.id, day(3), 900, 60).await.unwrap();
    db.challenge_repo.insert(tied.id, day(3), 900, 60).await.unwrap();
    db.challenge_repo.insert(last.id, day(3), 100, 10).await.unwrap();

    let duplicate = db.challenge_repo.insert(fast.id, day(3), 1_000, 5).await;
    assert!(matches!(duplicate, Err(RepositoryError::Duplicate(_))));

    let top = db.challenge_repo.standing(fast.id, day(3)).await.unwrap().unwrap();
    assert_eq!((top.rank, top.total), (1, 4));
    assert_eq!(top.percentile, 100.0);

    let shared_a = db.challenge_repo.standing(slow.id, day(3)).await.unwrap().unwrap();
    let shared_b = db.challenge_repo.standing(tied.id, day(3)).await.unwrap().unwrap();
    assert_eq!(shared_a.rank, 2);
    assert_eq!(shared_b.rank, 2);
    // Only `last` is strictly below the pair
    assert_eq!(shared_a.percentile, 33.33);
    assert_eq!(shared_b.percentile, 33.33);

    let bottom = db.challenge_repo.standing(last.id, day(3)).await.unwrap().unwrap();
    assert_eq!(bottom.rank, 4);
    assert_eq!(bottom.percentile, 0.0);

    assert!(db.challenge_repo.standing(fast.id, day(4)).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn test_daily_challenge_tied_last_place(pool: PgPool) {
    let db = TestDatabase::from_pool(pool);
    let winner = db.create_profile("winner@example.com").await;
    let first_loser = db.create_profile("loser.one@example.com").await;
    let second_loser = db.create_profile("loser.two@example.com").await;

    db.challenge_repo.insert(winner.id, day(5), 900, 40).await.unwrap();
    db.challenge_repo.insert(first_loser.id, day(5), 100, 60).await.unwrap();
    db.challenge_repo.insert(second_loser.id, day(5), 100, 60).await.unwrap();

    let standing = db.challenge_repo.standing(second_loser.id, day(5)).await.unwrap().unwrap();
    assert_eq!((standing.rank, standing.total), (2, 3));
    assert_eq!(standing.percentile, 0.0);

    let winner = db.challenge_repo.standing(winner.id, day(5)).await.unwrap().unwrap();
    assert_eq!(winner.percentile, 100.0);
}

// ============================================================================
// Leaderboard
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn test_leaderboard_ranks_and_weekly_reset(pool: PgPool) {
    let db = TestDatabase::from_pool(pool);
    let admin = db.create_profile("admin@example.com").await;
    let gold = db.create_profile_with_points("gold@example.com", 8_000).await;
    let silver = db.create_profile_with_points("silver@example.com", 3_500).await;

    let all_time = db.leaderboard_repo.top(LeaderboardPeriod::AllTime, 10).await.unwrap();
    assert_eq!(all_time[0].user_id, gold.id);
    assert_eq!(all_time[0].rank, 1);
    assert_eq!(all_time[0].tier, "gold");
    assert_eq!(all_time[1].user_id, silver.id);

    let reset = db
        .profile_repo
        .reset_weekly_points(NewAuditEntry::new(
            Some(admin.id),
            AdminAction::ResetLeaderboard,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(reset, 3);

    let weekly = db
        .leaderboard_repo
        .rank_of(gold.id, LeaderboardPeriod::Weekly)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(weekly.points, 0);
    assert_eq!(weekly.rank, 1);

    let kept = db
        .leaderboard_repo
        .rank_of(gold.id, LeaderboardPeriod::AllTime)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(kept.points, 8_000);

    let audit = db.audit_repo.recent(10).await.unwrap();
    assert_eq!(audit[0].action, "reset_leaderboard");
    assert_eq!(audit[0].details["profiles_reset"], 3);
}

// ============================================================================
// Notifications
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn test_notifications_are_private(pool: PgPool) {
    let db = TestDatabase::from_pool(pool);
    let owner = db.create_profile("owner@example.com").await;
    let other = db.create_profile("other@example.com").await;

    let note = db
        .notification_repo
        .create(owner.id, NotificationKind::DailyReward, "Reward", "+50 points")
        .await
        .unwrap();
    assert_eq!(db.notification_repo.count_unread(owner.id).await.unwrap(), 1);

    assert!(db.notification_repo.mark_read(other.id, note.id).await.unwrap().is_none());

    let read = db.notification_repo.mark_read(owner.id, note.id).await.unwrap().unwrap();
    assert!(read.read);
    assert_eq!(db.notification_repo.count_unread(owner.id).await.unwrap(), 0);
    assert!(db.notification_repo.find_by_user(owner.id, true, 50).await.unwrap().is_empty());
    assert_eq!(db.notification_repo.find_by_user(owner.id, false, 50).await.unwrap().len(), 1);
}

// ============================================================================
// Admin audit
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn test_delete_keeps_audit_row(pool: PgPool) {
    let db = TestDatabase::from_pool(pool);
    let admin = db.create_profile("root@example.com").await;
    let target = db.create_profile_with_points("cheater@example.com", 500).await;

    let entry = NewAuditEntry::new(Some(admin.id), AdminAction::DeleteUser, Some(target.id))
        .with_detail("username", target.username.clone().into());
    db.profile_repo.delete_audited(target.id, entry).await.unwrap();

    assert!(db.profile_repo.find_by_id(target.id).await.unwrap().is_none());
    let trail = db.audit_repo.find_by_target(target.id, 10).await.unwrap();
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].admin_id, Some(admin.id));

    let missing = db
        .profile_repo
        .delete_audited(
            target.id,
            NewAuditEntry::new(Some(admin.id), AdminAction::DeleteUser, Some(target.id)),
        )
        .await;
    assert!(matches!(missing, Err(RepositoryError::NotFound(_))));
    // The failed delete rolled its audit row back
    assert_eq!(db.audit_repo.find_by_target(target.id, 10).await.unwrap().len(), 1);
}

// ============================================================================
// Payments
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn test_payment_applies_exactly_once(pool: PgPool) {
    let db = TestDatabase::from_pool(pool);
    let buyer = db.create_profile("buyer@example.com").await;
    // Postgres keeps microseconds
    let now = Utc::now().naive_utc().trunc_subsecs(0);

    let payment = db
        .payment_repo
        .create_pending(
            "rankme_once",
            buyer.id,
            PremiumPlan::Monthly,
            Decimal::new(200_000, 2),
            "NGN",
        )
        .await
        .unwrap();
    assert_eq!(payment.status_enum(), PaymentStatus::Pending);

    let first = db
        .payment_repo
        .settle_success("rankme_once", 200_000, Some(77), now)
        .await
        .unwrap();
    let expiry = match first {
        SettleOutcome::Applied { payment, profile } => {
            assert_eq!(payment.status_enum(), PaymentStatus::Success);
            assert!(profile.is_premium);
            profile.premium_expires_at.unwrap()
        }
        other => panic!("expected Applied, got {:?}", other),
    };
    assert_eq!(expiry, now + Duration::days(30));

    let second = db
        .payment_repo
        .settle_success("rankme_once", 200_000, Some(77), now)
        .await
        .unwrap();
    assert!(matches!(second, SettleOutcome::AlreadyApplied(_)));

    let profile = db.profile_repo.find_by_id(buyer.id).await.unwrap().unwrap();
    assert_eq!(profile.premium_expires_at, Some(expiry));

    let trail = db.audit_repo.find_by_target(buyer.id, 10).await.unwrap();
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].action, "payment_applied");
    assert_eq!(trail[0].admin_id, None);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn test_underpaid_charge_is_rejected(pool: PgPool) {
    let db = TestDatabase::from_pool(pool);
    let buyer = db.create_profile("short@example.com").await;

    db.payment_repo
        .create_pending(
            "rankme_short",
            buyer.id,
            PremiumPlan::Yearly,
            Decimal::new(2_000_000, 2),
            "NGN",
        )
        .await
        .unwrap();

    let outcome = db
        .payment_repo
        .settle_success("rankme_short", 100, None, Utc::now().naive_utc())
        .await
        .unwrap();
    assert!(matches!(outcome, SettleOutcome::Underpaid { paid_minor: 100, .. }));

    let payment = db.payment_repo.find_by_reference("rankme_short").await.unwrap().unwrap();
    assert_eq!(payment.status_enum(), PaymentStatus::Failed);
    let profile = db.profile_repo.find_by_id(buyer.id).await.unwrap().unwrap();
    assert!(!profile.is_premium);

    let unknown = db
        .payment_repo
        .settle_success("rankme_missing", 100, None, Utc::now().naive_utc())
        .await
        .unwrap();
    assert!(matches!(unknown, SettleOutcome::UnknownReference));
}
