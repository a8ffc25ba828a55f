//! services/pantry/tests/progression.rs
//!
//! Progression through the service layer: per-user serialisation of
//! concurrent writes and the leaderboard over the in-memory store.

use chrono::{DateTime, TimeZone, Utc};
use futures::future::join_all;
use pantry_core::achievements::AchievementCatalog;
use pantry_core::domain::{StreakChange, UserAction};
use pantry_core::gamification::GamificationEngine;
use pantry_core::ports::{Clock, PortError};
use pantry_lib::adapters::InMemoryProgressStore;
use pantry_lib::error::ServiceError;
use pantry_lib::service::progression::ProgressionService;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// A clock the test can move forward.
struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    fn at(y: i32, m: u32, d: u32) -> Arc<Self> {
        Arc::new(Self(Mutex::new(Utc.with_ymd_and_hms(y, m, d, 8, 0, 0).unwrap())))
    }

    fn advance_days(&self, days: i64) {
        let mut now = self.0.lock().unwrap();
        *now += chrono::Duration::days(days);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

fn service(clock: Arc<ManualClock>) -> Arc<ProgressionService> {
    let engine = GamificationEngine::new(Arc::new(AchievementCatalog::embedded().unwrap()));
    Arc::new(ProgressionService::new(
        Arc::new(InMemoryProgressStore::new()),
        clock,
        engine,
        10,
    ))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_awards_for_one_user_are_not_lost() {
    let progression = service(ManualClock::at(2024, 4, 1));
    let user = Uuid::new_v4();
    progression.register(user, "Ada").await.unwrap();

    let tasks = (0..100).map(|_| {
        let progression = progression.clone();
        tokio::spawn(async move { progression.award_experience(user, 3, "batch").await })
    });
    for result in join_all(tasks).await {
        result.unwrap().unwrap();
    }

    let stats = progression.user_stats(user).await.unwrap();
    assert_eq!(stats.experience_points, 300);
    assert_eq!(stats.level, pantry_core::level_for_xp(300));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_actions_across_users() {
    let progression = service(ManualClock::at(2024, 4, 1));
    let users: Vec<Uuid> = (0..8).map(|_| Uuid::new_v4()).collect();
    for (i, user) in users.iter().enumerate() {
        progression.register(*user, &format!("user-{i}")).await.unwrap();
    }

    let tasks = users.iter().flat_map(|user| {
        (0..10).map(move |_| (*user, UserAction::ItemSaved { count: 1 }))
    });
    let futures = tasks.map(|(user, action)| {
        let progression = progression.clone();
        tokio::spawn(async move { progression.record_action(user, &action).await })
    });
    for result in join_all(futures).await {
        result.unwrap().unwrap();
    }

    for user in &users {
        let stats = progression.user_stats(*user).await.unwrap();
        assert_eq!(stats.items_saved, 10);
        // 10 x 10 XP for the items plus Waste Warrior I, unlocked exactly once.
        assert_eq!(stats.experience_points, 150);
        assert_eq!(stats.achievements.len(), 1);
    }
}

#[tokio::test]
async fn test_streak_follows_the_clock() {
    let clock = ManualClock::at(2024, 4, 1);
    let progression = service(clock.clone());
    let user = Uuid::new_v4();
    progression.register(user, "Lin").await.unwrap();

    assert_eq!(progression.update_streak(user).await.unwrap().change, StreakChange::Started);
    assert_eq!(progression.update_streak(user).await.unwrap().change, StreakChange::Unchanged);

    clock.advance_days(1);
    let update = progression.update_streak(user).await.unwrap();
    assert_eq!((update.change, update.streak), (StreakChange::Extended, 2));

    clock.advance_days(3);
    let update = progression.update_streak(user).await.unwrap();
    assert_eq!((update.change, update.streak), (StreakChange::Reset, 1));
}

#[tokio::test]
async fn test_leaderboard_and_unknown_users() {
    let progression = service(ManualClock::at(2024, 4, 1));
    let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
    for (id, name) in ids.iter().zip(["first", "second", "third"]) {
        progression.register(*id, name).await.unwrap();
    }
    progression.award_experience(ids[2], 500, "test").await.unwrap();
    progression.award_experience(ids[0], 40, "test").await.unwrap();
    progression.award_experience(ids[1], 40, "test").await.unwrap();

    let board = progression.leaderboard(None).await.unwrap();
    let names: Vec<&str> = board.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["third", "first", "second"]);
    assert_eq!(progression.leaderboard(Some(1)).await.unwrap().len(), 1);

    let missing = progression.award_experience(Uuid::new_v4(), 10, "test").await;
    assert!(matches!(missing, Err(ServiceError::Port(PortError::NotFound(_)))));

    let duplicate = progression.register(ids[0], "again").await;
    assert!(matches!(duplicate, Err(ServiceError::Port(PortError::Conflict(_)))));
}

#[tokio::test]
async fn test_failed_action_leaves_state_untouched() {
    let progression = service(ManualClock::at(2024, 4, 1));
    let user = Uuid::new_v4();
    progression.register(user, "Kim").await.unwrap();

    let bad = progression
        .record_action(user, &UserAction::Co2Saved { kg: f64::NAN })
        .await;
    assert!(matches!(bad, Err(ServiceError::Core(_))));

    let stats = progression.user_stats(user).await.unwrap();
    assert_eq!(stats.streak, 0);
    assert_eq!(stats.total_co2_saved_kg, 0.0);
}
