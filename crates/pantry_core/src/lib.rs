pub mod achievements;
pub mod consumption;
pub mod domain;
pub mod error;
pub mod expiration;
pub mod gamification;
pub mod knowledge;
pub mod ports;
pub mod recipes;

pub use achievements::{AchievementCatalog, AchievementLedger};
pub use consumption::{co2_saved_kg, ConsumptionAnalyzer, PatternTable, WasteRiskScorer};
pub use domain::{
    AchievementDefinition, AchievementFamily, AchievementProgress, AchievementTier, ActionOutcome,
    ConsumptionPattern, ConsumptionRecord, ExpirationPrediction, FoodCategoryProfile,
    LeaderboardEntry, MealType, ModelPerformance, PantryItem, PredictionInput, RecipeCandidate,
    RecipeSuggestion, StorageModifier, StreakChange, StreakUpdate, TrendDirection,
    UnlockedAchievement, UserAction, UserProgress, UserStats, XpAward,
};
pub use error::{CatalogError, CoreError, CoreResult};
pub use expiration::{model_performance, record_outcome, ExpirationPredictor};
pub use gamification::{leaderboard, level_for_xp, xp_for_level, GamificationEngine};
pub use knowledge::KnowledgeBase;
pub use ports::{Clock, PlayerState, PortError, PortResult, ProgressRepository};
pub use recipes::rank_recipes;
