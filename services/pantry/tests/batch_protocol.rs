//! services/pantry/tests/batch_protocol.rs
//!
//! Drives the JSON-lines protocol end to end through `handle_line`.

use approx::assert_relative_eq;
use chrono::{DateTime, TimeZone, Utc};
use pantry_core::achievements::AchievementCatalog;
use pantry_core::knowledge::KnowledgeBase;
use pantry_core::ports::Clock;
use pantry_lib::adapters::InMemoryProgressStore;
use pantry_lib::config::Config;
use pantry_lib::service::{handle_line, AppState};
use serde_json::{json, Value};
use std::sync::Arc;

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn state() -> AppState {
    let config = Config::from_lookup(|_| None).unwrap();
    AppState::new(
        Arc::new(config),
        Arc::new(KnowledgeBase::embedded().unwrap()),
        Arc::new(AchievementCatalog::embedded().unwrap()),
        Arc::new(InMemoryProgressStore::new()),
        Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 4, 10, 9, 30, 0).unwrap())),
    )
}

async fn call(state: &AppState, request: Value) -> Value {
    let response = handle_line(state, &request.to_string()).await;
    serde_json::to_value(&response).unwrap()
}

#[tokio::test]
async fn test_predict_expiration() {
    let state = state();
    let response = call(
        &state,
        json!({
            "type": "predict_expiration",
            "input": {
                "item_id": "6f1c2d9e-7c1b-4d8e-9a55-0d6f2b1b9e11",
                "category": "Milk",
                "storage_location": "Fridge",
                "purchase_date": "2024-03-01"
            }
        }),
    )
    .await;
    assert_eq!(response["type"], "prediction");
    assert_eq!(response["prediction"]["predicted_expiration"], "2024-03-12");
    assert_eq!(response["prediction"]["model_version"], "1.0.0");
    assert_relative_eq!(response["prediction"]["confidence"].as_f64().unwrap(), 0.75, epsilon = 1e-9);
}

#[tokio::test]
async fn test_missing_purchase_date_is_reported() {
    let state = state();
    let response = call(
        &state,
        json!({
            "type": "predict_expiration",
            "input": { "item_id": "6f1c2d9e-7c1b-4d8e-9a55-0d6f2b1b9e11", "category": "Milk" }
        }),
    )
    .await;
    assert_eq!(response["type"], "error");
    assert!(response["message"].as_str().unwrap().contains("purchase date"));
}

#[tokio::test]
async fn test_estimate_uses_the_clock() {
    let state = state();
    let response = call(
        &state,
        json!({ "type": "estimate_expiration", "item_name": "milk", "storage_location": "fridge" }),
    )
    .await;
    assert_eq!(response["expiration_date"], "2024-04-20");
}

#[tokio::test]
async fn test_rank_recipes_with_nothing_expiring() {
    let state = state();
    let response = call(
        &state,
        json!({
            "type": "rank_recipes",
            "items": [],
            "recipes": [{
                "id": "0b7e8a6c-1f33-4e0c-8a5e-4b1c2f9d7a10",
                "name": "Soup",
                "ingredients": ["carrot"]
            }]
        }),
    )
    .await;
    assert_eq!(response["type"], "suggestions");
    assert_eq!(response["suggestions"], json!([]));
}

#[tokio::test]
async fn test_waste_and_recommendations() {
    let state = state();
    let response = call(
        &state,
        json!({ "type": "waste_likelihood", "item_name": "mystery stew", "expiration_date": "2024-04-09" }),
    )
    .await;
    assert_relative_eq!(response["likelihood"].as_f64().unwrap(), 0.85, epsilon = 1e-9);

    let response = call(
        &state,
        json!({ "type": "recommendations", "inventory": ["milk", "apples", "steak mince", "lettuce"] }),
    )
    .await;
    assert_eq!(response["suggestions"], json!([]));
}

#[tokio::test]
async fn test_progression_round_trip() {
    let state = state();
    let user = "1d4f9c2a-3b5e-4c6d-8e7f-9a0b1c2d3e4f";
    let response = call(&state, json!({ "type": "register_user", "user_id": user, "name": "Ada" })).await;
    assert_eq!(response["type"], "user");
    assert_eq!(response["progress"]["level"], 1);

    let response = call(
        &state,
        json!({ "type": "record_action", "user_id": user, "action": { "kind": "item_scanned", "count": 10 } }),
    )
    .await;
    assert_eq!(response["type"], "action");
    assert_eq!(response["outcome"]["unlocked"][0]["name"], "Scan Master I");
    assert_eq!(response["outcome"]["streak"]["change"], "started");

    let response = call(&state, json!({ "type": "user_stats", "user_id": user })).await;
    assert_eq!(response["stats"]["experience_points"], 80);
    assert_eq!(response["stats"]["items_scanned"], 10);

    let response = call(&state, json!({ "type": "leaderboard" })).await;
    assert_eq!(response["entries"][0]["name"], "Ada");
}

#[tokio::test]
async fn test_malformed_line_does_not_panic() {
    let state = state();
    let response = handle_line(&state, "{ not json").await;
    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["type"], "error");
}
