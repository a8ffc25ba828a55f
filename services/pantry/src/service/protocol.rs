//! services/pantry/src/service/protocol.rs
//!
//! Defines the JSON-lines batch protocol: one `Request` per input line, one
//! `Response` per output line, in the same order.

use chrono::NaiveDate;
use pantry_core::consumption::PatternTable;
use pantry_core::domain::{
    AchievementFamily, ActionOutcome, ConsumptionRecord, ExpirationPrediction, LeaderboardEntry,
    MealType, ModelPerformance, PantryItem, PredictionInput, RecipeCandidate, RecipeSuggestion,
    StreakUpdate, UnlockedAchievement, UserAction, UserProgress, UserStats, XpAward,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//=========================================================================================
// Requests
//=========================================================================================

/// Represents the requests a caller can submit to the service.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    // --- Expiration ---
    PredictExpiration {
        input: PredictionInput,
    },
    EstimateExpiration {
        item_name: String,
        #[serde(default)]
        storage_location: Option<String>,
        #[serde(default)]
        declared_expiration: Option<NaiveDate>,
    },
    RecordOutcome {
        prediction: ExpirationPrediction,
        actual_expiration: NaiveDate,
    },
    ModelPerformance {
        predictions: Vec<ExpirationPrediction>,
    },

    // --- Consumption & waste ---
    AnalyzeConsumption {
        history: Vec<ConsumptionRecord>,
    },
    WasteLikelihood {
        item_name: String,
        expiration_date: NaiveDate,
        #[serde(default)]
        history: Vec<ConsumptionRecord>,
    },
    Recommendations {
        inventory: Vec<String>,
        #[serde(default)]
        history: Vec<ConsumptionRecord>,
    },
    Co2Saved {
        quantity: u32,
        expiration_date: NaiveDate,
    },

    // --- Recipes ---
    RankRecipes {
        items: Vec<PantryItem>,
        recipes: Vec<RecipeCandidate>,
        #[serde(default)]
        days_ahead: Option<u32>,
    },
    QueryRecipes {
        recipes: Vec<RecipeCandidate>,
        query: RecipeQuery,
    },
    RateRecipe {
        recipe: RecipeCandidate,
        rating: f64,
    },
    ViewRecipe {
        recipe: RecipeCandidate,
    },

    // --- Progression ---
    RegisterUser {
        #[serde(default)]
        user_id: Option<Uuid>,
        name: String,
    },
    AwardExperience {
        user_id: Uuid,
        xp: u32,
        #[serde(default)]
        reason: String,
    },
    TrackAchievement {
        user_id: Uuid,
        family: AchievementFamily,
        value: u32,
    },
    UpdateStreak {
        user_id: Uuid,
    },
    RecordAction {
        user_id: Uuid,
        action: UserAction,
    },
    UserStats {
        user_id: Uuid,
    },
    Leaderboard {
        #[serde(default)]
        limit: Option<usize>,
    },
}

/// The unscored recipe catalog queries.
#[derive(Deserialize, Debug)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum RecipeQuery {
    Search { text: String },
    MealType { meal_type: MealType },
    TopRated { limit: usize },
    Quick,
}

//=========================================================================================
// Responses
//=========================================================================================

/// Represents the responses the service writes back, one per request.
#[derive(Serialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Prediction { prediction: ExpirationPrediction },
    Estimate { expiration_date: NaiveDate },
    Performance { report: ModelPerformance },
    Patterns { patterns: PatternTable },
    WasteLikelihood { likelihood: f64 },
    Recommendations { suggestions: Vec<String> },
    Co2 { kg: f64 },
    Suggestions { suggestions: Vec<RecipeSuggestion> },
    Recipes { recipes: Vec<RecipeCandidate> },
    Recipe { recipe: RecipeCandidate, applied: bool },
    User { progress: UserProgress },
    Xp { award: XpAward },
    Unlocked { achievements: Vec<UnlockedAchievement> },
    Streak { update: StreakUpdate },
    Action { outcome: ActionOutcome },
    Stats { stats: UserStats },
    Leaderboard { entries: Vec<LeaderboardEntry> },

    /// Reports a failed request. Processing continues with the next line.
    Error { message: String },
}
