//! services/pantry/src/service/handler.rs
//!
//! Dispatches one protocol request to the matching service call.

use pantry_core::recipes;
use tracing::warn;
use uuid::Uuid;

use crate::error::ServiceResult;
use crate::service::protocol::{RecipeQuery, Request, Response};
use crate::service::state::AppState;

/// Handles a single request. Failures are turned into `Response::Error` so a
/// bad line never stops the batch.
pub async fn handle(state: &AppState, request: Request) -> Response {
    match dispatch(state, request).await {
        Ok(response) => response,
        Err(e) => {
            warn!("Request failed: {}", e);
            Response::Error {
                message: e.to_string(),
            }
        }
    }
}

/// Parses one input line and handles it.
pub async fn handle_line(state: &AppState, line: &str) -> Response {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => handle(state, request).await,
        Err(e) => {
            warn!("Malformed request: {}", e);
            Response::Error {
                message: format!("Malformed request: {}", e),
            }
        }
    }
}

async fn dispatch(state: &AppState, request: Request) -> ServiceResult<Response> {
    let inventory = &state.inventory;
    let progression = &state.progression;

    let response = match request {
        // --- Expiration ---
        Request::PredictExpiration { input } => Response::Prediction {
            prediction: inventory.predict_expiration(&input)?,
        },
        Request::EstimateExpiration {
            item_name,
            storage_location,
            declared_expiration,
        } => Response::Estimate {
            expiration_date: inventory.estimate_expiration(
                &item_name,
                storage_location.as_deref(),
                declared_expiration,
            )?,
        },
        Request::RecordOutcome {
            prediction,
            actual_expiration,
        } => Response::Prediction {
            prediction: inventory.record_outcome(prediction, actual_expiration),
        },
        Request::ModelPerformance { predictions } => Response::Performance {
            report: inventory.model_performance(&predictions),
        },

        // --- Consumption & waste ---
        Request::AnalyzeConsumption { history } => Response::Patterns {
            patterns: inventory.analyze_consumption(&history),
        },
        Request::WasteLikelihood {
            item_name,
            expiration_date,
            history,
        } => Response::WasteLikelihood {
            likelihood: inventory.waste_likelihood(&item_name, expiration_date, &history),
        },
        Request::Recommendations { inventory: items, history } => Response::Recommendations {
            suggestions: inventory.recommendations(&items, &history),
        },
        Request::Co2Saved {
            quantity,
            expiration_date,
        } => Response::Co2 {
            kg: inventory.co2_saved(quantity, expiration_date),
        },

        // --- Recipes ---
        Request::RankRecipes {
            items,
            recipes,
            days_ahead,
        } => Response::Suggestions {
            suggestions: inventory.rank_recipes(&items, &recipes, days_ahead)?,
        },
        Request::QueryRecipes { recipes: catalog, query } => {
            let found = match query {
                RecipeQuery::Search { text } => recipes::search(&catalog, &text),
                RecipeQuery::MealType { meal_type } => recipes::by_meal_type(&catalog, meal_type),
                RecipeQuery::TopRated { limit } => recipes::top_rated(&catalog, limit),
                RecipeQuery::Quick => recipes::quick_recipes(&catalog),
            };
            Response::Recipes {
                recipes: found.into_iter().cloned().collect(),
            }
        }
        Request::RateRecipe { mut recipe, rating } => {
            let applied = recipes::rate_recipe(&mut recipe, rating);
            Response::Recipe { recipe, applied }
        }
        Request::ViewRecipe { mut recipe } => {
            recipes::increment_view(&mut recipe);
            Response::Recipe {
                recipe,
                applied: true,
            }
        }

        // --- Progression ---
        Request::RegisterUser { user_id, name } => Response::User {
            progress: progression
                .register(user_id.unwrap_or_else(Uuid::new_v4), &name)
                .await?,
        },
        Request::AwardExperience {
            user_id,
            xp,
            reason,
        } => Response::Xp {
            award: progression.award_experience(user_id, xp, &reason).await?,
        },
        Request::TrackAchievement {
            user_id,
            family,
            value,
        } => Response::Unlocked {
            achievements: progression.track_achievement(user_id, family, value).await?,
        },
        Request::UpdateStreak { user_id } => Response::Streak {
            update: progression.update_streak(user_id).await?,
        },
        Request::RecordAction { user_id, action } => Response::Action {
            outcome: progression.record_action(user_id, &action).await?,
        },
        Request::UserStats { user_id } => Response::Stats {
            stats: progression.user_stats(user_id).await?,
        },
        Request::Leaderboard { limit } => Response::Leaderboard {
            entries: progression.leaderboard(limit).await?,
        },
    };
    Ok(response)
}
