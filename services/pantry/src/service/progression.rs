//! services/pantry/src/service/progression.rs
//!
//! Wires the gamification engine to the progress repository.
//!
//! Every write for a user runs as lock -> load -> mutate -> save under that
//! user's own mutex, so two concurrent awards can never both start from the
//! same stale XP value. Different users never wait on each other.

use chrono::{DateTime, NaiveDate, Utc};
use pantry_core::domain::{
    AchievementFamily, ActionOutcome, LeaderboardEntry, StreakUpdate, UnlockedAchievement,
    UserAction, UserProgress, UserStats, XpAward,
};
use pantry_core::error::CoreResult;
use pantry_core::gamification::{leaderboard, GamificationEngine};
use pantry_core::ports::{Clock, PlayerState, ProgressRepository};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ServiceResult;

pub struct ProgressionService {
    repo: Arc<dyn ProgressRepository>,
    clock: Arc<dyn Clock>,
    engine: GamificationEngine,
    leaderboard_limit: usize,
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl ProgressionService {
    pub fn new(
        repo: Arc<dyn ProgressRepository>,
        clock: Arc<dyn Clock>,
        engine: GamificationEngine,
        leaderboard_limit: usize,
    ) -> Self {
        Self {
            repo,
            clock,
            engine,
            leaderboard_limit,
            locks: Mutex::new(HashMap::new()),
        }
    }

    async fn user_lock(&self, user_id: Uuid) -> Arc<Mutex<()>> {
        self.locks.lock().await.entry(user_id).or_default().clone()
    }

    /// Runs `apply` against the user's stored state while holding their lock
    /// and persists the result. Nothing is saved if `apply` fails.
    async fn with_player<T>(
        &self,
        user_id: Uuid,
        apply: impl FnOnce(&GamificationEngine, &mut PlayerState, NaiveDate, DateTime<Utc>) -> CoreResult<T>,
    ) -> ServiceResult<T> {
        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;

        let mut state = self.repo.load_player(user_id).await?;
        let now = self.clock.now();
        let out = apply(&self.engine, &mut state, self.clock.today(), now)?;
        self.repo.save_player(state).await?;
        Ok(out)
    }

    pub async fn register(&self, user_id: Uuid, name: &str) -> ServiceResult<UserProgress> {
        let state = self.repo.create_player(user_id, name).await?;
        info!(user = %user_id, name, "User registered");
        Ok(state.progress)
    }

    pub async fn award_experience(
        &self,
        user_id: Uuid,
        xp: u32,
        reason: &str,
    ) -> ServiceResult<XpAward> {
        self.with_player(user_id, |engine, state, _, _| {
            Ok(engine.award_experience(&mut state.progress, xp, reason))
        })
        .await
    }

    pub async fn track_achievement(
        &self,
        user_id: Uuid,
        family: AchievementFamily,
        value: u32,
    ) -> ServiceResult<Vec<UnlockedAchievement>> {
        self.with_player(user_id, |engine, state, _, now| {
            Ok(engine.track_achievement(&mut state.progress, &mut state.ledger, family, value, now))
        })
        .await
    }

    pub async fn update_streak(&self, user_id: Uuid) -> ServiceResult<StreakUpdate> {
        self.with_player(user_id, |engine, state, today, now| {
            Ok(engine.update_streak(&mut state.progress, &mut state.ledger, today, now))
        })
        .await
    }

    pub async fn record_action(
        &self,
        user_id: Uuid,
        action: &UserAction,
    ) -> ServiceResult<ActionOutcome> {
        debug!(user = %user_id, ?action, "Recording action");
        self.with_player(user_id, |engine, state, today, now| {
            engine.record_action(&mut state.progress, &mut state.ledger, action, today, now)
        })
        .await
    }

    pub async fn user_stats(&self, user_id: Uuid) -> ServiceResult<UserStats> {
        let state = self.repo.load_player(user_id).await?;
        Ok(self.engine.user_stats(&state.progress, &state.ledger))
    }

    /// Read-only; runs without taking any user lock.
    pub async fn leaderboard(&self, limit: Option<usize>) -> ServiceResult<Vec<LeaderboardEntry>> {
        let users = self.repo.list_players().await?;
        Ok(leaderboard(&users, Some(limit.unwrap_or(self.leaderboard_limit))))
    }
}
