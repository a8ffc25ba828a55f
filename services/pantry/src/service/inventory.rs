//! services/pantry/src/service/inventory.rs
//!
//! The stateless engines (expiration, consumption, waste, recipes) behind one
//! facade that supplies "today" from the clock and the configured defaults.

use chrono::NaiveDate;
use pantry_core::consumption::{co2_saved_kg, ConsumptionAnalyzer, PatternTable, WasteRiskScorer};
use pantry_core::domain::{
    ConsumptionRecord, ExpirationPrediction, ModelPerformance, PantryItem, PredictionInput,
    RecipeCandidate, RecipeSuggestion,
};
use pantry_core::expiration::{model_performance, record_outcome, ExpirationPredictor};
use pantry_core::knowledge::KnowledgeBase;
use pantry_core::ports::Clock;
use pantry_core::recipes::rank_recipes;
use std::sync::Arc;
use tracing::debug;

use crate::error::ServiceResult;

pub struct InventoryService {
    predictor: ExpirationPredictor,
    analyzer: ConsumptionAnalyzer,
    scorer: WasteRiskScorer,
    clock: Arc<dyn Clock>,
    recipe_days_ahead: u32,
}

impl InventoryService {
    pub fn new(knowledge: Arc<KnowledgeBase>, clock: Arc<dyn Clock>, recipe_days_ahead: u32) -> Self {
        Self {
            predictor: ExpirationPredictor::new(knowledge.clone()),
            analyzer: ConsumptionAnalyzer::new(knowledge.clone()),
            scorer: WasteRiskScorer::new(knowledge),
            clock,
            recipe_days_ahead,
        }
    }

    pub fn predict_expiration(&self, input: &PredictionInput) -> ServiceResult<ExpirationPrediction> {
        Ok(self.predictor.predict(input)?)
    }

    pub fn estimate_expiration(
        &self,
        item_name: &str,
        storage_location: Option<&str>,
        declared_expiration: Option<NaiveDate>,
    ) -> ServiceResult<NaiveDate> {
        let today = self.clock.today();
        Ok(self
            .predictor
            .estimate_for_new_item(item_name, storage_location, declared_expiration, today)?)
    }

    pub fn record_outcome(
        &self,
        prediction: ExpirationPrediction,
        actual_expiration: NaiveDate,
    ) -> ExpirationPrediction {
        record_outcome(prediction, actual_expiration)
    }

    pub fn model_performance(&self, predictions: &[ExpirationPrediction]) -> ModelPerformance {
        model_performance(predictions)
    }

    pub fn analyze_consumption(&self, history: &[ConsumptionRecord]) -> PatternTable {
        self.analyzer.analyze(history)
    }

    pub fn waste_likelihood(
        &self,
        item_name: &str,
        expiration_date: NaiveDate,
        history: &[ConsumptionRecord],
    ) -> f64 {
        let patterns = self.analyzer.analyze(history);
        self.scorer
            .waste_likelihood(item_name, expiration_date, self.clock.today(), &patterns)
    }

    pub fn recommendations(&self, inventory: &[String], history: &[ConsumptionRecord]) -> Vec<String> {
        let patterns = self.analyzer.analyze(history);
        self.analyzer.recommendations(inventory, &patterns)
    }

    pub fn co2_saved(&self, quantity: u32, expiration_date: NaiveDate) -> f64 {
        co2_saved_kg(quantity, expiration_date, self.clock.today())
    }

    pub fn rank_recipes(
        &self,
        items: &[PantryItem],
        catalog: &[RecipeCandidate],
        days_ahead: Option<u32>,
    ) -> ServiceResult<Vec<RecipeSuggestion>> {
        let days_ahead = days_ahead.unwrap_or(self.recipe_days_ahead);
        let suggestions = rank_recipes(items, catalog, Some(days_ahead), self.clock.today())?;
        debug!(days_ahead, count = suggestions.len(), "Recipe suggestions ready");
        Ok(suggestions)
    }
}
