//! crates/pantry_core/src/recipes.rs
//!
//! Recipe ranking against a household's soon-to-expire items, plus the
//! unscored catalog queries (search, filters, ratings, views).

use chrono::{Days, NaiveDate};
use std::cmp::Ordering;
use tracing::debug;

use crate::domain::{MealType, PantryItem, RecipeCandidate, RecipeSuggestion};
use crate::error::{CoreError, CoreResult};

pub const DEFAULT_DAYS_AHEAD: u32 = 7;
/// A matched item expiring before today + this many days is urgent.
pub const URGENT_WINDOW_DAYS: u64 = 3;

pub const URGENT_INGREDIENT_BONUS: f64 = 15.0;
pub const HIGH_MATCH_BONUS: f64 = 20.0;
pub const GOOD_MATCH_BONUS: f64 = 10.0;
pub const RATING_WEIGHT: f64 = 5.0;
pub const VIEWS_PER_POINT: f64 = 100.0;
pub const MAX_VIEW_BONUS: f64 = 10.0;
/// Missing ingredients tolerated before the penalty applies.
pub const MISSING_INGREDIENT_ALLOWANCE: usize = 5;
pub const MISSING_INGREDIENT_PENALTY: f64 = 2.0;
pub const QUICK_RECIPE_MINUTES: u32 = 30;
const MEDIUM_RECIPE_MINUTES: u32 = 60;

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 5.0;

//=========================================================================================
// Ranking
//=========================================================================================

/// An inventory item that falls inside the look-ahead window.
struct ExpiringItem {
    name: String,
    expires: NaiveDate,
}

/// Ranks the catalog against the items expiring within `days_ahead` days
/// (7 when `None`). Returns an empty list when nothing is expiring.
///
/// Only recipes that use at least one expiring item are suggested. Ties keep
/// catalog order.
pub fn rank_recipes(
    items: &[PantryItem],
    catalog: &[RecipeCandidate],
    days_ahead: Option<u32>,
    today: NaiveDate,
) -> CoreResult<Vec<RecipeSuggestion>> {
    let days_ahead = days_ahead.unwrap_or(DEFAULT_DAYS_AHEAD);
    let cutoff = shift(today, u64::from(days_ahead))?;
    let urgent_cutoff = shift(today, URGENT_WINDOW_DAYS)?;

    let mut expiring = Vec::new();
    for item in items {
        let Some(expires) = item.expiration_date.filter(|date| *date < cutoff) else {
            continue;
        };
        let name = item.name.trim().to_lowercase();
        if name.is_empty() {
            return Err(CoreError::InvalidInput(format!(
                "item {} has no name",
                item.id
            )));
        }
        expiring.push(ExpiringItem { name, expires });
    }

    if expiring.is_empty() {
        debug!(days_ahead, "No expiring items, nothing to rank");
        return Ok(Vec::new());
    }

    let mut suggestions: Vec<RecipeSuggestion> = catalog
        .iter()
        .filter_map(|recipe| score_recipe(recipe, &expiring, urgent_cutoff))
        .collect();
    // `sort_by` is stable, so equal scores stay in catalog order.
    suggestions.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    debug!(
        expiring = expiring.len(),
        suggestions = suggestions.len(),
        "Recipes ranked"
    );
    Ok(suggestions)
}

fn score_recipe(
    recipe: &RecipeCandidate,
    expiring: &[ExpiringItem],
    urgent_cutoff: NaiveDate,
) -> Option<RecipeSuggestion> {
    if recipe.ingredients.is_empty() {
        return None;
    }

    let mut matched = Vec::new();
    let mut missing = Vec::new();
    let mut urgent = 0usize;
    for ingredient in &recipe.ingredients {
        match find_item(ingredient, expiring) {
            Some(item) => {
                if item.expires < urgent_cutoff {
                    urgent += 1;
                }
                matched.push(ingredient.clone());
            }
            None => missing.push(ingredient.clone()),
        }
    }
    if matched.is_empty() {
        return None;
    }

    let match_percentage = matched.len() as f64 / recipe.ingredients.len() as f64 * 100.0;

    let mut score = urgent as f64 * URGENT_INGREDIENT_BONUS;
    score += match_percentage;
    if match_percentage >= 80.0 {
        score += HIGH_MATCH_BONUS;
    } else if match_percentage >= 60.0 {
        score += GOOD_MATCH_BONUS;
    }
    score += recipe.rating_average * RATING_WEIGHT;
    score += (recipe.view_count as f64 / VIEWS_PER_POINT).min(MAX_VIEW_BONUS);
    if missing.len() > MISSING_INGREDIENT_ALLOWANCE {
        score -= MISSING_INGREDIENT_PENALTY * (missing.len() - MISSING_INGREDIENT_ALLOWANCE) as f64;
    }
    let total_time = recipe.total_time_minutes();
    if total_time <= QUICK_RECIPE_MINUTES {
        score += 10.0;
    } else if total_time <= MEDIUM_RECIPE_MINUTES {
        score += 5.0;
    }

    Some(RecipeSuggestion {
        recipe_id: recipe.id,
        recipe_name: recipe.name.clone(),
        score: score.max(0.0),
        matched_ingredients: matched,
        missing_ingredients: missing,
        match_percentage,
        urgent_items_used: urgent,
    })
}

/// First expiring item whose name contains the ingredient or vice versa.
fn find_item<'e>(ingredient: &str, expiring: &'e [ExpiringItem]) -> Option<&'e ExpiringItem> {
    let ingredient = ingredient.trim().to_lowercase();
    if ingredient.is_empty() {
        return None;
    }
    expiring
        .iter()
        .find(|item| item.name.contains(&ingredient) || ingredient.contains(&item.name))
}

fn shift(date: NaiveDate, days: u64) -> CoreResult<NaiveDate> {
    date.checked_add_days(Days::new(days))
        .ok_or_else(|| CoreError::InvalidInput(format!("date {date} + {days} days overflows")))
}

//=========================================================================================
// Catalog Queries
//=========================================================================================

/// Case-insensitive free-text search over names and descriptions.
pub fn search<'a>(catalog: &'a [RecipeCandidate], query: &str) -> Vec<&'a RecipeCandidate> {
    let query = query.trim().to_lowercase();
    catalog
        .iter()
        .filter(|recipe| {
            recipe.name.to_lowercase().contains(&query)
                || recipe.description.to_lowercase().contains(&query)
        })
        .collect()
}

pub fn by_meal_type(catalog: &[RecipeCandidate], meal_type: MealType) -> Vec<&RecipeCandidate> {
    catalog
        .iter()
        .filter(|recipe| recipe.meal_type == Some(meal_type))
        .collect()
}

/// Sorted by rating average, then rating count, both descending.
pub fn top_rated(catalog: &[RecipeCandidate], limit: usize) -> Vec<&RecipeCandidate> {
    let mut sorted: Vec<&RecipeCandidate> = catalog.iter().collect();
    sorted.sort_by(|a, b| {
        b.rating_average
            .partial_cmp(&a.rating_average)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.rating_count.cmp(&a.rating_count))
    });
    sorted.truncate(limit);
    sorted
}

pub fn quick_recipes(catalog: &[RecipeCandidate]) -> Vec<&RecipeCandidate> {
    catalog
        .iter()
        .filter(|recipe| recipe.total_time_minutes() <= QUICK_RECIPE_MINUTES)
        .collect()
}

/// Folds a new rating into the running average. Ratings outside [1, 5] are
/// ignored and `false` is returned.
pub fn rate_recipe(recipe: &mut RecipeCandidate, rating: f64) -> bool {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        debug!(recipe = %recipe.id, rating, "Ignoring out-of-range rating");
        return false;
    }
    let count = f64::from(recipe.rating_count);
    recipe.rating_average = (recipe.rating_average * count + rating) / (count + 1.0);
    recipe.rating_count += 1;
    true
}

pub fn increment_view(recipe: &mut RecipeCandidate) {
    recipe.view_count = recipe.view_count.saturating_add(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn item(name: &str, expires: Option<NaiveDate>) -> PantryItem {
        PantryItem {
            id: Uuid::new_v4(),
            name: name.to_string(),
            expiration_date: expires,
            quantity: 1,
        }
    }

    fn recipe(name: &str, ingredients: &[&str]) -> RecipeCandidate {
        RecipeCandidate {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: String::new(),
            meal_type: None,
            ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
            rating_average: 0.0,
            rating_count: 0,
            view_count: 0,
            prep_time_minutes: 0,
            cook_time_minutes: 90,
        }
    }

    #[test]
    fn test_reference_scoring_scenario() {
        let today = date(2024, 6, 10);
        let items = vec![
            item("Spinach", Some(date(2024, 6, 11))),
            item("Whole Milk", Some(date(2024, 6, 12))),
            item("Cheddar cheese", Some(date(2024, 6, 15))),
            item("Eggs", Some(date(2024, 6, 16))),
        ];
        let mut omelette = recipe("Omelette", &["spinach", "milk", "cheese", "eggs", "chives"]);
        omelette.rating_average = 4.5;
        omelette.view_count = 150;
        omelette.prep_time_minutes = 10;
        omelette.cook_time_minutes = 15;

        let ranked = rank_recipes(&items, &[omelette], None, today).unwrap();
        assert_eq!(ranked.len(), 1);
        let s = &ranked[0];
        assert_eq!(s.urgent_items_used, 2);
        assert_eq!(s.matched_ingredients, vec!["spinach", "milk", "cheese", "eggs"]);
        assert_eq!(s.missing_ingredients, vec!["chives"]);
        assert_relative_eq!(s.match_percentage, 80.0);
        assert_relative_eq!(s.score, 164.0);
    }

    #[test]
    fn test_no_expiring_items_returns_empty() {
        let today = date(2024, 6, 10);
        let catalog = vec![recipe("Soup", &["carrot"])];
        assert!(rank_recipes(&[], &catalog, None, today).unwrap().is_empty());

        let later = vec![
            item("carrot", Some(date(2024, 6, 17))),
            item("onion", None),
        ];
        assert!(rank_recipes(&later, &catalog, None, today).unwrap().is_empty());
        // A wider window picks the carrot up.
        assert_eq!(rank_recipes(&later, &catalog, Some(8), today).unwrap().len(), 1);
    }

    #[test]
    fn test_unmatched_and_empty_recipes_are_skipped() {
        let today = date(2024, 6, 10);
        let items = vec![item("carrot", Some(date(2024, 6, 12)))];
        let catalog = vec![
            recipe("Fruit salad", &["apple", "banana"]),
            recipe("Nothing", &[]),
            recipe("Carrot cake", &["carrots", "flour"]),
        ];
        let ranked = rank_recipes(&items, &catalog, None, today).unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].recipe_name, "Carrot cake");
    }

    #[test]
    fn test_match_bonus_tiers_and_penalty() {
        let today = date(2024, 6, 10);
        let items = vec![
            item("a1", Some(date(2024, 6, 15))),
            item("a2", Some(date(2024, 6, 15))),
            item("a3", Some(date(2024, 6, 15))),
        ];
        // 3 of 5 -> 60 % + 10 bonus
        let sixty = recipe("Sixty", &["a1", "a2", "a3", "x1", "x2"]);
        // 1 of 8 -> 12.5 %, 7 missing -> -4
        let eighth = recipe("Eighth", &["a1", "x1", "x2", "x3", "x4", "x5", "x6", "x7"]);
        let ranked = rank_recipes(&items, &[eighth, sixty], None, today).unwrap();
        assert_eq!(ranked[0].recipe_name, "Sixty");
        assert_relative_eq!(ranked[0].score, 70.0);
        assert_eq!(ranked[1].recipe_name, "Eighth");
        assert_relative_eq!(ranked[1].score, 8.5);
    }

    #[test]
    fn test_score_is_never_negative() {
        let today = date(2024, 6, 10);
        let items = vec![item("a1", Some(date(2024, 6, 15)))];
        let mut ingredients = vec!["a1".to_string()];
        ingredients.extend((0..40).map(|i| format!("missing{i}")));
        let mut huge = recipe("Banquet", &[]);
        huge.ingredients = ingredients;
        let ranked = rank_recipes(&items, &[huge], None, today).unwrap();
        assert_eq!(ranked[0].score, 0.0);
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let today = date(2024, 6, 10);
        let items = vec![item("rice", Some(date(2024, 6, 15)))];
        let catalog = vec![
            recipe("First", &["rice"]),
            recipe("Second", &["rice"]),
            recipe("Third", &["rice"]),
        ];
        let ranked = rank_recipes(&items, &catalog, None, today).unwrap();
        let names: Vec<&str> = ranked.iter().map(|s| s.recipe_name.as_str()).collect();
        assert_eq!(names, ["First", "Second", "Third"]);
    }

    #[test]
    fn test_blank_item_name_is_invalid() {
        let today = date(2024, 6, 10);
        let items = vec![item("  ", Some(date(2024, 6, 11)))];
        let result = rank_recipes(&items, &[recipe("Soup", &["leek"])], None, today);
        assert!(matches!(result, Err(CoreError::InvalidInput(_))));
    }

    #[test]
    fn test_catalog_queries() {
        let mut pancakes = recipe("Pancakes", &["flour", "milk"]);
        pancakes.description = "Fluffy breakfast stack".to_string();
        pancakes.meal_type = Some(MealType::Breakfast);
        pancakes.prep_time_minutes = 10;
        pancakes.cook_time_minutes = 15;
        pancakes.rating_average = 4.5;
        pancakes.rating_count = 2;

        let mut stew = recipe("Beef stew", &["beef"]);
        stew.meal_type = Some(MealType::Dinner);
        stew.rating_average = 4.5;
        stew.rating_count = 9;

        let catalog = vec![pancakes, stew];
        assert_eq!(search(&catalog, "BREAKFAST").len(), 1);
        assert_eq!(search(&catalog, "stew")[0].name, "Beef stew");
        assert_eq!(by_meal_type(&catalog, MealType::Dinner).len(), 1);
        assert_eq!(quick_recipes(&catalog)[0].name, "Pancakes");

        let top = top_rated(&catalog, 10);
        assert_eq!(top[0].name, "Beef stew");
        assert_eq!(top_rated(&catalog, 1).len(), 1);
    }

    #[test]
    fn test_rating_submission() {
        let mut r = recipe("Toast", &["bread"]);
        r.rating_average = 4.0;
        r.rating_count = 3;
        assert!(rate_recipe(&mut r, 5.0));
        assert_relative_eq!(r.rating_average, 4.25);
        assert_eq!(r.rating_count, 4);

        assert!(!rate_recipe(&mut r, 5.5));
        assert!(!rate_recipe(&mut r, 0.0));
        assert_relative_eq!(r.rating_average, 4.25);
        assert_eq!(r.rating_count, 4);

        increment_view(&mut r);
        assert_eq!(r.view_count, 1);
    }
}
