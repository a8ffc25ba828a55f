//! crates/pantry_core/src/gamification.rs
//!
//! Progression for one user: the XP curve, achievement unlocks and the daily
//! streak. Every operation mutates the `UserProgress` and `AchievementLedger`
//! it is handed and nothing else; serialising concurrent writers is the
//! caller's job.
//!
//! Achievement rewards are applied in two phases. All tiers of the family are
//! evaluated first, then the XP of the tiers that just unlocked is awarded.
//! Awarding XP never re-enters achievement evaluation, and the catalog
//! refuses families driven by XP, so a single call always terminates.

use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use crate::achievements::{AchievementCatalog, AchievementLedger};
use crate::domain::{
    AchievementDefinition, AchievementFamily, ActionOutcome, LeaderboardEntry, StreakChange,
    StreakUpdate, UnlockedAchievement, UserAction, UserProgress, UserStats, XpAward,
};
use crate::error::{CoreError, CoreResult};

pub const BASE_XP_PER_LEVEL: f64 = 100.0;
pub const LEVEL_MULTIPLIER: f64 = 1.5;
/// Past this level the curve no longer fits in a u64.
pub const MAX_LEVEL: u32 = 90;

pub const XP_PER_ITEM_SAVED: u32 = 10;
pub const XP_PER_ITEM_SCANNED: u32 = 5;
pub const XP_PER_KG_CO2: u32 = 2;

pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

//=========================================================================================
// XP Curve
//=========================================================================================

/// Cumulative XP needed to reach `level`. Level 1 is free.
pub fn xp_for_level(level: u32) -> u64 {
    if level <= 1 {
        return 0;
    }
    let exponent = level.min(MAX_LEVEL + 1) - 1;
    (BASE_XP_PER_LEVEL * LEVEL_MULTIPLIER.powi(exponent as i32)) as u64
}

/// Largest level whose threshold `xp` has reached.
pub fn level_for_xp(xp: u64) -> u32 {
    let mut level = 1;
    while level < MAX_LEVEL && xp >= xp_for_level(level + 1) {
        level += 1;
    }
    level
}

//=========================================================================================
// Engine
//=========================================================================================

#[derive(Debug, Clone)]
pub struct GamificationEngine {
    catalog: Arc<AchievementCatalog>,
}

impl GamificationEngine {
    pub fn new(catalog: Arc<AchievementCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &AchievementCatalog {
        &self.catalog
    }

    /// Adds XP and recomputes the level. Never evaluates achievements.
    pub fn award_experience(&self, progress: &mut UserProgress, xp: u32, reason: &str) -> XpAward {
        let old_level = progress.level;
        progress.experience_points = progress.experience_points.saturating_add(u64::from(xp));
        progress.total_points = progress.total_points.saturating_add(u64::from(xp));
        progress.level = level_for_xp(progress.experience_points);

        let leveled_up = progress.level > old_level;
        if leveled_up {
            info!(
                user = %progress.user_id,
                old_level,
                new_level = progress.level,
                "Level up"
            );
        }
        debug!(user = %progress.user_id, xp, reason, total = progress.experience_points, "XP awarded");

        XpAward {
            old_level,
            new_level: progress.level,
            leveled_up,
            xp_gained: u64::from(xp),
            total_xp: progress.experience_points,
            reason: reason.to_string(),
        }
    }

    /// Sets the family's progress to `value` on every active tier and
    /// returns the tiers unlocked by this call, lowest first.
    pub fn track_achievement(
        &self,
        progress: &mut UserProgress,
        ledger: &mut AchievementLedger,
        family: AchievementFamily,
        value: u32,
        now: DateTime<Utc>,
    ) -> Vec<UnlockedAchievement> {
        // Phase 1: evaluate.
        let newly_unlocked: Vec<&AchievementDefinition> = self
            .catalog
            .family(family)
            .iter()
            .filter(|def| def.active)
            .filter(|def| ledger.record(def, value, now))
            .collect();

        // Phase 2: reward.
        newly_unlocked
            .into_iter()
            .map(|def| {
                info!(user = %progress.user_id, achievement = %def.name, "Achievement unlocked");
                self.award_experience(progress, def.xp_reward, &format!("Unlocked: {}", def.name));
                UnlockedAchievement {
                    name: def.name.clone(),
                    description: def.description.clone(),
                    family: def.family,
                    tier: def.tier,
                    badge: def.badge.clone(),
                    xp_reward: def.xp_reward,
                    unlocked_at: now,
                }
            })
            .collect()
    }

    /// Records activity on `today`. Repeat calls on the same day change
    /// nothing; a day after the last activity extends the streak and feeds
    /// the streak family; any other gap restarts it at 1.
    pub fn update_streak(
        &self,
        progress: &mut UserProgress,
        ledger: &mut AchievementLedger,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> StreakUpdate {
        let change = match progress.last_active {
            None => StreakChange::Started,
            Some(last) if last == today => StreakChange::Unchanged,
            Some(last) if today.pred_opt() == Some(last) => StreakChange::Extended,
            Some(_) => StreakChange::Reset,
        };

        let mut unlocked = Vec::new();
        match change {
            StreakChange::Unchanged => {}
            StreakChange::Extended => {
                let streak = progress.streak.saturating_add(1);
                progress.streak = streak;
                progress.last_active = Some(today);
                unlocked =
                    self.track_achievement(progress, ledger, AchievementFamily::Streak, streak, now);
            }
            StreakChange::Started | StreakChange::Reset => {
                progress.streak = 1;
                progress.last_active = Some(today);
            }
        }
        debug!(user = %progress.user_id, ?change, streak = progress.streak, "Streak updated");

        StreakUpdate {
            change,
            streak: progress.streak,
            unlocked,
        }
    }

    /// Applies one user action: counter, XP, the matching achievement
    /// family, then the daily streak.
    pub fn record_action(
        &self,
        progress: &mut UserProgress,
        ledger: &mut AchievementLedger,
        action: &UserAction,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> CoreResult<ActionOutcome> {
        let (xp, reason, tracked) = match *action {
            UserAction::ItemSaved { count } => {
                progress.items_saved = progress.items_saved.saturating_add(count);
                (
                    count.saturating_mul(XP_PER_ITEM_SAVED),
                    format!("Saved {count} item(s) from expiring"),
                    Some((AchievementFamily::WasteWarrior, progress.items_saved)),
                )
            }
            UserAction::ItemScanned { count } => {
                progress.items_scanned = progress.items_scanned.saturating_add(count);
                (
                    count.saturating_mul(XP_PER_ITEM_SCANNED),
                    format!("Scanned {count} item(s)"),
                    Some((AchievementFamily::ScanMaster, progress.items_scanned)),
                )
            }
            UserAction::Co2Saved { kg } => {
                if !kg.is_finite() || kg < 0.0 {
                    return Err(CoreError::InvalidInput(format!(
                        "CO2 saved must be a non-negative amount, got {kg}"
                    )));
                }
                progress.total_co2_saved_kg += kg;
                let whole_kg = kg.floor() as u32;
                (
                    whole_kg.saturating_mul(XP_PER_KG_CO2),
                    format!("Saved {kg:.1} kg of CO2"),
                    Some((
                        AchievementFamily::EcoChampion,
                        progress.total_co2_saved_kg.floor() as u32,
                    )),
                )
            }
            UserAction::DailyActivity => (0, String::new(), None),
        };

        let xp = (xp > 0).then(|| self.award_experience(progress, xp, &reason));
        let unlocked = match tracked {
            Some((family, value)) => self.track_achievement(progress, ledger, family, value, now),
            None => Vec::new(),
        };
        let streak = self.update_streak(progress, ledger, today, now);

        Ok(ActionOutcome {
            xp,
            unlocked,
            streak,
        })
    }

    pub fn user_stats(&self, progress: &UserProgress, ledger: &AchievementLedger) -> UserStats {
        let level_floor = xp_for_level(progress.level);
        let next_level = xp_for_level(progress.level + 1);
        UserStats {
            level: progress.level,
            experience_points: progress.experience_points,
            xp_progress: progress.experience_points.saturating_sub(level_floor),
            xp_needed: next_level.saturating_sub(level_floor),
            total_points: progress.total_points,
            items_saved: progress.items_saved,
            items_scanned: progress.items_scanned,
            streak: progress.streak,
            total_co2_saved_kg: progress.total_co2_saved_kg,
            achievements: ledger.unlocked().cloned().collect(),
        }
    }
}

/// Users by XP, highest first, truncated to `limit` (10 when `None`). The
/// sort is stable: users with equal XP keep their input order.
pub fn leaderboard(users: &[UserProgress], limit: Option<usize>) -> Vec<LeaderboardEntry> {
    let mut ranked: Vec<&UserProgress> = users.iter().collect();
    ranked.sort_by(|a, b| b.experience_points.cmp(&a.experience_points));
    ranked
        .into_iter()
        .take(limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT))
        .map(|user| LeaderboardEntry {
            user_id: user.user_id,
            name: user.name.clone(),
            level: user.level,
            experience_points: user.experience_points,
            items_saved: user.items_saved,
            total_co2_saved_kg: user.total_co2_saved_kg,
        })
        .collect()
}
