//! crates/pantry_core/src/expiration.rs
//!
//! Heuristic shelf-life model. Produces a predicted expiration date with a
//! self-reported confidence and a feature snapshot, and audits predictions
//! once the real expiration date is known.
//!
//! The confidence increments and the accuracy decay below have no derivation
//! behind them; they are calibration targets, not fixed truths.

use chrono::{Datelike, Days, NaiveDate};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::domain::{ExpirationPrediction, ModelPerformance, PredictionInput};
use crate::error::{CoreError, CoreResult};
use crate::knowledge::KnowledgeBase;

pub const MODEL_VERSION: &str = "1.0.0";

/// Confidence every prediction starts from.
pub const BASE_CONFIDENCE: f64 = 0.70;
/// Added when the package carried a printed expiration date.
pub const LABELED_DATE_CONFIDENCE_BONUS: f64 = 0.15;
/// Added when both temperature and humidity telemetry were supplied.
pub const ENVIRONMENT_CONFIDENCE_BONUS: f64 = 0.10;
/// Added when the category resolved to a known profile.
pub const KNOWN_CATEGORY_CONFIDENCE_BONUS: f64 = 0.05;

/// Accuracy points lost per day between predicted and actual expiration.
pub const ACCURACY_PENALTY_PER_DAY: f64 = 5.0;

/// Optimal refrigerated storage temperature in °C.
pub const REFERENCE_TEMPERATURE_C: f64 = 4.0;
const DEFAULT_HUMIDITY_PCT: f64 = 50.0;

/// Freshness lost per container opening.
pub const OPEN_COUNT_DECAY: f64 = 0.05;
pub const MIN_OPEN_COUNT_FACTOR: f64 = 0.5;

/// A prediction never lands on the purchase day itself.
const MIN_SHELF_LIFE_DAYS: i64 = 1;

/// Weights of the quick estimate when the user declared a date.
pub const MODEL_WEIGHT: f64 = 0.7;
pub const DECLARED_WEIGHT: f64 = 0.3;
const REFRIGERATED_ADJUSTMENT_DAYS: i64 = 3;
const AMBIENT_ADJUSTMENT_DAYS: i64 = 2;

//=========================================================================================
// Environmental Factors
//=========================================================================================

/// 1.0 inside ±2 °C of the reference, degrading in steps beyond that.
pub fn temperature_factor(temperature: Option<f64>) -> f64 {
    let Some(temperature) = temperature else {
        return 1.0;
    };
    let deviation = (temperature - REFERENCE_TEMPERATURE_C).abs();
    if deviation <= 2.0 {
        1.0
    } else if deviation <= 5.0 {
        0.9
    } else if deviation <= 10.0 {
        0.7
    } else {
        0.5
    }
}

/// 1.0 for 50-70 % relative humidity, degrading in widening bands.
pub fn humidity_factor(humidity: Option<f64>) -> f64 {
    let Some(humidity) = humidity else {
        return 1.0;
    };
    if (50.0..=70.0).contains(&humidity) {
        1.0
    } else if (40.0..=80.0).contains(&humidity) {
        0.95
    } else if (30.0..=90.0).contains(&humidity) {
        0.85
    } else {
        0.7
    }
}

pub fn open_count_factor(open_count: u32) -> f64 {
    (1.0 - OPEN_COUNT_DECAY * f64::from(open_count)).max(MIN_OPEN_COUNT_FACTOR)
}

/// Summer shortens shelf life, winter extends it (northern-hemisphere months).
pub fn seasonal_factor(today: NaiveDate) -> f64 {
    match today.month() {
        6..=8 => 0.9,
        12 | 1 | 2 => 1.1,
        _ => 1.0,
    }
}

fn add_days(date: NaiveDate, days: i64) -> CoreResult<NaiveDate> {
    let shifted = if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.ok_or_else(|| {
        CoreError::InvalidInput(format!("{date} shifted by {days} days is out of range"))
    })
}

//=========================================================================================
// Predictor
//=========================================================================================

#[derive(Debug, Clone)]
pub struct ExpirationPredictor {
    knowledge: Arc<KnowledgeBase>,
}

impl ExpirationPredictor {
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        Self { knowledge }
    }

    /// Predicts when an item will expire.
    ///
    /// Fails with `InvalidInput` if the purchase date or the category is
    /// missing; unknown categories and storage labels fall back to defaults.
    pub fn predict(&self, input: &PredictionInput) -> CoreResult<ExpirationPrediction> {
        let purchase_date = input
            .purchase_date
            .ok_or_else(|| CoreError::InvalidInput("purchase date is required".to_string()))?;
        if input.category.trim().is_empty() {
            return Err(CoreError::InvalidInput("category is required".to_string()));
        }

        let resolved = self.knowledge.resolve(&input.category);
        let storage = input.storage_location.as_deref();
        let baseline = f64::from(resolved.profile.shelf_life_days);
        let storage_multiplier = self.knowledge.storage_multiplier(storage);

        let adjusted_shelf_life = baseline
            * storage_multiplier
            * temperature_factor(input.temperature_avg)
            * humidity_factor(input.humidity_avg)
            * open_count_factor(input.open_count);
        let days = (adjusted_shelf_life.round() as i64).max(MIN_SHELF_LIFE_DAYS);
        let predicted_expiration = add_days(purchase_date, days)?;

        let confidence = confidence_score(input, resolved.recognized);

        let mut features = BTreeMap::new();
        if let Some(labeled) = input.labeled_expiration {
            features.insert(
                "labeled_shelf_life".to_string(),
                (labeled - purchase_date).num_days() as f64,
            );
        }
        features.insert(
            "temperature_avg".to_string(),
            input.temperature_avg.unwrap_or(REFERENCE_TEMPERATURE_C),
        );
        features.insert(
            "humidity_avg".to_string(),
            input.humidity_avg.unwrap_or(DEFAULT_HUMIDITY_PCT),
        );
        features.insert("open_count".to_string(), f64::from(input.open_count));
        let category = resolved.profile.name.as_str();
        features.insert("is_dairy".to_string(), flag(category == "Dairy"));
        features.insert(
            "is_meat".to_string(),
            flag(category == "Meat" || category == "Fish"),
        );
        features.insert(
            "is_produce".to_string(),
            flag(category == "Fruit" || category == "Vegetable"),
        );
        features.insert(
            "is_refrigerated".to_string(),
            flag(self.knowledge.is_refrigerated(storage)),
        );
        features.insert(
            "is_frozen".to_string(),
            flag(self.knowledge.is_frozen(storage)),
        );
        features.insert("baseline_shelf_life".to_string(), baseline);
        features.insert("storage_multiplier".to_string(), storage_multiplier);
        features.insert("adjusted_shelf_life".to_string(), adjusted_shelf_life);

        debug!(
            item_id = %input.item_id,
            category,
            adjusted_shelf_life,
            confidence,
            "Expiration predicted"
        );

        Ok(ExpirationPrediction {
            item_id: input.item_id,
            category: category.to_string(),
            storage_location: input.storage_location.clone(),
            purchase_date,
            labeled_expiration: input.labeled_expiration,
            predicted_expiration,
            confidence,
            features,
            model_version: MODEL_VERSION.to_string(),
            actual_expiration: None,
            accuracy: None,
        })
    }

    /// Quick estimate used when an item is created by hand, without telemetry.
    ///
    /// With a declared date the result blends the category model (70 %) with
    /// the declared shelf life (30 %). Without one it is the category
    /// baseline plus three days for refrigerated storage, two otherwise.
    pub fn estimate_for_new_item(
        &self,
        item_name: &str,
        storage_location: Option<&str>,
        declared_expiration: Option<NaiveDate>,
        today: NaiveDate,
    ) -> CoreResult<NaiveDate> {
        if item_name.trim().is_empty() {
            return Err(CoreError::InvalidInput("item name is required".to_string()));
        }
        let profile = self.knowledge.resolve(item_name).profile;
        let baseline = f64::from(profile.shelf_life_days);

        let days = match declared_expiration {
            Some(declared) => {
                let model_days = baseline
                    * self.knowledge.storage_multiplier(storage_location)
                    * seasonal_factor(today);
                let declared_days = (declared - today).num_days() as f64;
                (model_days * MODEL_WEIGHT + declared_days * DECLARED_WEIGHT).round() as i64
            }
            None => {
                let adjustment = if self.knowledge.is_refrigerated(storage_location) {
                    REFRIGERATED_ADJUSTMENT_DAYS
                } else {
                    AMBIENT_ADJUSTMENT_DAYS
                };
                i64::from(profile.shelf_life_days) + adjustment
            }
        };
        add_days(today, days)
    }
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

fn confidence_score(input: &PredictionInput, recognized: bool) -> f64 {
    let mut confidence = BASE_CONFIDENCE;
    if input.labeled_expiration.is_some() {
        confidence += LABELED_DATE_CONFIDENCE_BONUS;
    }
    if input.temperature_avg.is_some() && input.humidity_avg.is_some() {
        confidence += ENVIRONMENT_CONFIDENCE_BONUS;
    }
    if recognized {
        confidence += KNOWN_CATEGORY_CONFIDENCE_BONUS;
    }
    confidence.clamp(0.0, 1.0)
}

//=========================================================================================
// Accuracy Auditing
//=========================================================================================

/// Stores the observed expiration date and the derived accuracy (0-100).
pub fn record_outcome(
    mut prediction: ExpirationPrediction,
    actual_expiration: NaiveDate,
) -> ExpirationPrediction {
    let days_off = (prediction.predicted_expiration - actual_expiration)
        .num_days()
        .abs() as f64;
    prediction.actual_expiration = Some(actual_expiration);
    prediction.accuracy = Some((100.0 - ACCURACY_PENALTY_PER_DAY * days_off).clamp(0.0, 100.0));
    prediction
}

/// Error statistics over the predictions whose outcome is known.
pub fn model_performance(predictions: &[ExpirationPrediction]) -> ModelPerformance {
    let errors: Vec<f64> = predictions
        .iter()
        .filter_map(|p| {
            p.actual_expiration
                .map(|actual| (actual - p.predicted_expiration).num_days() as f64)
        })
        .collect();

    if errors.is_empty() {
        return ModelPerformance {
            mean_absolute_error: 0.0,
            root_mean_squared_error: 0.0,
            within_one_day_pct: 0.0,
            count: 0,
            model_version: MODEL_VERSION.to_string(),
        };
    }

    let n = errors.len() as f64;
    let absolute: f64 = errors.iter().map(|e| e.abs()).sum();
    let squared: f64 = errors.iter().map(|e| e * e).sum();
    let within_one_day = errors.iter().filter(|e| e.abs() <= 1.0).count() as f64;

    ModelPerformance {
        mean_absolute_error: absolute / n,
        root_mean_squared_error: (squared / n).sqrt(),
        within_one_day_pct: (within_one_day / n * 100.0).clamp(0.0, 100.0),
        count: errors.len(),
        model_version: MODEL_VERSION.to_string(),
    }
}
