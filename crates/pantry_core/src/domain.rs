//! crates/pantry_core/src/domain.rs
//!
//! Defines the core data structures shared by every engine.
//! These structs carry no behaviour beyond small derived accessors and are
//! independent of any storage or transport format (serde derives are only
//! there so adapters can move them around).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

//=========================================================================================
// Knowledge Base Records
//=========================================================================================

/// Baseline shelf life and perishability of one food category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodCategoryProfile {
    pub name: String,
    pub shelf_life_days: u32,
    /// 0.0 (shelf stable) to 1.0 (spoils fast).
    pub perishability: f64,
    /// Suggestion emitted when the category is absent from the inventory.
    #[serde(default)]
    pub restock_hint: Option<String>,
}

/// Maps a storage location label onto a shelf-life multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageModifier {
    pub label: String,
    /// Lower-cased fragments that identify this location in free text.
    pub keywords: Vec<String>,
    pub multiplier: f64,
    #[serde(default)]
    pub refrigerated: bool,
    #[serde(default)]
    pub frozen: bool,
}

//=========================================================================================
// Expiration Prediction
//=========================================================================================

/// Everything the predictor needs to know about one item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionInput {
    pub item_id: Uuid,
    /// Category or item name; resolved against the knowledge base.
    pub category: String,
    #[serde(default)]
    pub storage_location: Option<String>,
    /// Mandatory. Kept optional here so a missing value is reported as
    /// invalid input instead of a deserialisation failure.
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
    #[serde(default)]
    pub labeled_expiration: Option<NaiveDate>,
    /// Average storage temperature in °C.
    #[serde(default)]
    pub temperature_avg: Option<f64>,
    /// Average relative humidity in percent.
    #[serde(default)]
    pub humidity_avg: Option<f64>,
    #[serde(default)]
    pub open_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpirationPrediction {
    pub item_id: Uuid,
    /// Name of the resolved category profile.
    pub category: String,
    pub storage_location: Option<String>,
    pub purchase_date: NaiveDate,
    pub labeled_expiration: Option<NaiveDate>,
    pub predicted_expiration: NaiveDate,
    pub confidence: f64,
    pub features: BTreeMap<String, f64>,
    pub model_version: String,
    /// Filled once ground truth is known.
    pub actual_expiration: Option<NaiveDate>,
    /// 0-100, filled together with `actual_expiration`.
    pub accuracy: Option<f64>,
}

/// Offline model-quality report over predictions with known outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPerformance {
    pub mean_absolute_error: f64,
    pub root_mean_squared_error: f64,
    /// Percentage (0-100) of predictions off by at most one day.
    pub within_one_day_pct: f64,
    pub count: usize,
    pub model_version: String,
}

//=========================================================================================
// Consumption History
//=========================================================================================

/// A single historical purchase/consumption fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    /// Item name or category name.
    pub item: String,
    pub purchase_date: NaiveDate,
    pub consumption_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionPattern {
    pub category: String,
    pub average_days: f64,
    pub predicted_days: f64,
    pub slope: f64,
    pub trend: TrendDirection,
}

//=========================================================================================
// Inventory & Recipes
//=========================================================================================

/// An item currently held by a household.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PantryItem {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    Dessert,
}

/// A recipe as owned by the external catalog. Read-only for ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeCandidate {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub meal_type: Option<MealType>,
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub rating_average: f64,
    #[serde(default)]
    pub rating_count: u32,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub prep_time_minutes: u32,
    #[serde(default)]
    pub cook_time_minutes: u32,
}

impl RecipeCandidate {
    pub fn total_time_minutes(&self) -> u32 {
        self.prep_time_minutes.saturating_add(self.cook_time_minutes)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSuggestion {
    pub recipe_id: Uuid,
    pub recipe_name: String,
    pub score: f64,
    pub matched_ingredients: Vec<String>,
    pub missing_ingredients: Vec<String>,
    pub match_percentage: f64,
    pub urgent_items_used: usize,
}

//=========================================================================================
// Progression
//=========================================================================================

/// Per-user progression state. Only the gamification engine mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProgress {
    pub user_id: Uuid,
    pub name: String,
    /// Always `level_for_xp(experience_points)`.
    pub level: u32,
    pub experience_points: u64,
    pub total_points: u64,
    pub items_saved: u32,
    pub items_scanned: u32,
    pub total_co2_saved_kg: f64,
    pub streak: u32,
    pub last_active: Option<NaiveDate>,
}

impl UserProgress {
    pub fn new(user_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
            level: 1,
            experience_points: 0,
            total_points: 0,
            items_saved: 0,
            items_scanned: 0,
            total_co2_saved_kg: 0.0,
            streak: 0,
            last_active: None,
        }
    }
}

/// Achievement families. Each family is a ladder of tiers sharing one
/// progress value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AchievementFamily {
    WasteWarrior,
    EcoChampion,
    ScanMaster,
    Streak,
    /// Driven by the experience level itself. Never valid in a catalog: its
    /// XP rewards would re-enter its own progress.
    Level,
}

impl fmt::Display for AchievementFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::WasteWarrior => "WASTE_WARRIOR",
            Self::EcoChampion => "ECO_CHAMPION",
            Self::ScanMaster => "SCAN_MASTER",
            Self::Streak => "STREAK",
            Self::Level => "LEVEL",
        };
        f.write_str(tag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AchievementTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub family: AchievementFamily,
    pub tier: AchievementTier,
    pub points_required: u32,
    pub xp_reward: u32,
    #[serde(default)]
    pub badge: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Unlock state of one tier for one user. Created lazily on the first
/// progress update of its family, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementProgress {
    pub user_id: Uuid,
    pub family: AchievementFamily,
    pub tier: AchievementTier,
    pub progress: u32,
    pub unlocked: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnlockedAchievement {
    pub name: String,
    pub description: String,
    pub family: AchievementFamily,
    pub tier: AchievementTier,
    pub badge: String,
    pub xp_reward: u32,
    pub unlocked_at: DateTime<Utc>,
}

/// Result of awarding experience points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XpAward {
    pub old_level: u32,
    pub new_level: u32,
    pub leveled_up: bool,
    pub xp_gained: u64,
    pub total_xp: u64,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakChange {
    Started,
    Unchanged,
    Extended,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakUpdate {
    pub change: StreakChange,
    pub streak: u32,
    pub unlocked: Vec<UnlockedAchievement>,
}

/// Activity reported by the surrounding application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UserAction {
    ItemSaved { count: u32 },
    ItemScanned { count: u32 },
    Co2Saved { kg: f64 },
    DailyActivity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub xp: Option<XpAward>,
    pub unlocked: Vec<UnlockedAchievement>,
    pub streak: StreakUpdate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user_id: Uuid,
    pub name: String,
    pub level: u32,
    pub experience_points: u64,
    pub items_saved: u32,
    pub total_co2_saved_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub level: u32,
    pub experience_points: u64,
    /// XP earned since reaching the current level.
    pub xp_progress: u64,
    /// XP span between the current and the next level.
    pub xp_needed: u64,
    pub total_points: u64,
    pub items_saved: u32,
    pub items_scanned: u32,
    pub streak: u32,
    pub total_co2_saved_kg: f64,
    pub achievements: Vec<AchievementProgress>,
}
