//! crates/pantry_core/src/consumption.rs
//!
//! Consumption-pattern analysis over historical purchase/consumption events,
//! and the waste-risk scoring and restocking hints built on top of it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::{ConsumptionPattern, ConsumptionRecord, TrendDirection};
use crate::knowledge::KnowledgeBase;

/// Fewer records than this and the fallback table is returned instead.
pub const MIN_HISTORY_RECORDS: usize = 3;
/// Days-to-consume assumed for a category with no pattern.
pub const DEFAULT_CONSUMPTION_DAYS: f64 = 7.0;
/// kg of CO2 avoided per item per week of remaining shelf life.
pub const CO2_KG_PER_ITEM_WEEK: f64 = 0.5;

//=========================================================================================
// Pattern Table
//=========================================================================================

/// Per-category consumption patterns, keyed by category name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternTable {
    patterns: BTreeMap<String, ConsumptionPattern>,
    /// False when the table is the fallback used for short histories.
    observed: bool,
}

impl PatternTable {
    pub fn get(&self, category: &str) -> Option<&ConsumptionPattern> {
        self.patterns.get(category)
    }

    /// Average days-to-consume for the category, 7.0 if unseen.
    pub fn average_days(&self, category: &str) -> f64 {
        self.get(category)
            .map_or(DEFAULT_CONSUMPTION_DAYS, |p| p.average_days)
    }

    pub fn is_observed(&self) -> bool {
        self.observed
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConsumptionPattern> {
        self.patterns.values()
    }

    fn insert(&mut self, pattern: ConsumptionPattern) {
        self.patterns.insert(pattern.category.clone(), pattern);
    }
}

//=========================================================================================
// Consumption Analyzer
//=========================================================================================

#[derive(Debug, Clone)]
pub struct ConsumptionAnalyzer {
    knowledge: Arc<KnowledgeBase>,
}

impl ConsumptionAnalyzer {
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        Self { knowledge }
    }

    /// Recomputes every category pattern from the full history.
    ///
    /// Records whose consumption precedes the purchase are skipped. Histories
    /// shorter than three usable records yield the fallback table.
    pub fn analyze(&self, history: &[ConsumptionRecord]) -> PatternTable {
        let usable: Vec<&ConsumptionRecord> = history
            .iter()
            .filter(|record| {
                let valid = record.consumption_date >= record.purchase_date;
                if !valid {
                    warn!(
                        item = %record.item,
                        purchase = %record.purchase_date,
                        consumption = %record.consumption_date,
                        "Skipping consumption record that precedes its purchase"
                    );
                }
                valid
            })
            .collect();

        if usable.len() < MIN_HISTORY_RECORDS {
            debug!(records = usable.len(), "History too short, using default patterns");
            return self.default_patterns();
        }

        // Category -> days-to-consume, in history order.
        let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for record in usable {
            let category = self.knowledge.resolve(&record.item).profile.name.clone();
            let days = (record.consumption_date - record.purchase_date).num_days() as f64;
            groups.entry(category).or_default().push(days);
        }

        let mut table = PatternTable {
            patterns: BTreeMap::new(),
            observed: true,
        };
        for (category, days) in groups {
            let average_days = days.iter().sum::<f64>() / days.len() as f64;
            let (slope, predicted_days) = fit_trend(&days);
            debug!(%category, average_days, slope, "Consumption pattern fitted");
            table.insert(ConsumptionPattern {
                category,
                average_days,
                predicted_days,
                slope,
                trend: trend_of(slope),
            });
        }
        table
    }

    /// The hard-coded table used when there is not enough history.
    pub fn default_patterns(&self) -> PatternTable {
        let mut table = PatternTable::default();
        for entry in self.knowledge.default_consumption() {
            table.insert(ConsumptionPattern {
                category: entry.category.clone(),
                average_days: entry.average_days,
                predicted_days: entry.average_days,
                slope: 0.0,
                trend: trend_of(0.0),
            });
        }
        table
    }

    /// Restocking suggestions for the current inventory.
    ///
    /// One fixed hint per staple category missing from the inventory, then
    /// one per category whose consumption is trending up, both in
    /// knowledge-base order.
    pub fn recommendations(&self, inventory: &[String], patterns: &PatternTable) -> Vec<String> {
        let present: HashSet<&str> = inventory
            .iter()
            .map(|name| self.knowledge.resolve(name).profile.name.as_str())
            .collect();

        let mut out = Vec::new();
        for profile in self.knowledge.categories() {
            if let Some(hint) = &profile.restock_hint {
                if !present.contains(profile.name.as_str()) {
                    out.push(hint.clone());
                }
            }
        }

        let every_category = self
            .knowledge
            .categories()
            .chain(std::iter::once(self.knowledge.default_profile()));
        for profile in every_category {
            let increasing = patterns
                .get(&profile.name)
                .is_some_and(|p| p.trend == TrendDirection::Increasing);
            if increasing {
                out.push(format!(
                    "Your {} consumption is increasing - consider buying more",
                    profile.name
                ));
            }
        }
        out
    }
}

/// Least-squares fit of days-to-consume against sequence index. Returns the
/// slope and the value extrapolated one step past the last record.
fn fit_trend(days: &[f64]) -> (f64, f64) {
    let n = days.len();
    if n < 2 {
        return (0.0, days.first().copied().unwrap_or(DEFAULT_CONSUMPTION_DAYS));
    }
    let n_f = n as f64;
    let mean_x = (n_f - 1.0) / 2.0;
    let mean_y = days.iter().sum::<f64>() / n_f;

    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (i, y) in days.iter().enumerate() {
        let dx = i as f64 - mean_x;
        sxy += dx * (y - mean_y);
        sxx += dx * dx;
    }
    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    (slope, intercept + slope * n_f)
}

fn trend_of(slope: f64) -> TrendDirection {
    if slope > 0.0 {
        TrendDirection::Increasing
    } else {
        TrendDirection::Decreasing
    }
}

//=========================================================================================
// Waste Risk
//=========================================================================================

#[derive(Debug, Clone)]
pub struct WasteRiskScorer {
    knowledge: Arc<KnowledgeBase>,
}

impl WasteRiskScorer {
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        Self { knowledge }
    }

    /// Probability (0-1) that the item goes unused before it spoils.
    pub fn waste_likelihood(
        &self,
        item_name: &str,
        expiration_date: NaiveDate,
        today: NaiveDate,
        patterns: &PatternTable,
    ) -> f64 {
        let profile = self.knowledge.resolve(item_name).profile;
        let days_left = (expiration_date - today).num_days() as f64;
        let average = patterns.average_days(&profile.name);

        let base = if days_left <= 0.0 {
            1.0
        } else if days_left < average * 0.5 {
            0.8
        } else if days_left < average {
            0.5
        } else if days_left < average * 1.5 {
            0.2
        } else {
            0.1
        };

        (base * (0.5 + 0.5 * profile.perishability)).clamp(0.0, 1.0)
    }
}

/// CO2 avoided by using an item before it expires; zero once expired.
pub fn co2_saved_kg(quantity: u32, expiration_date: NaiveDate, today: NaiveDate) -> f64 {
    let days_left = (expiration_date - today).num_days();
    if days_left < 0 {
        return 0.0;
    }
    (days_left as f64 / 7.0) * f64::from(quantity) * CO2_KG_PER_ITEM_WEEK
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn kb() -> Arc<KnowledgeBase> {
        Arc::new(KnowledgeBase::embedded().unwrap())
    }

    fn record(item: &str, purchased: NaiveDate, days: u64) -> ConsumptionRecord {
        ConsumptionRecord {
            item: item.to_string(),
            purchase_date: purchased,
            consumption_date: purchased + chrono::Days::new(days),
        }
    }

    #[test]
    fn test_short_history_returns_defaults() {
        let analyzer = ConsumptionAnalyzer::new(kb());
        let start = date(2024, 1, 1);
        let table = analyzer.analyze(&[record("milk", start, 3), record("apple", start, 4)]);
        assert!(!table.is_observed());
        assert_eq!(table.average_days("Dairy"), 5.0);
        assert_eq!(table.average_days("Meat"), 2.0);
        assert_eq!(table.average_days("Grain"), 14.0);
        assert_eq!(table.average_days("Fish"), DEFAULT_CONSUMPTION_DAYS);
    }

    #[test]
    fn test_groups_and_fits_trend() {
        let analyzer = ConsumptionAnalyzer::new(kb());
        let start = date(2024, 1, 1);
        let history = vec![
            record("milk", start, 2),
            record("yogurt", start, 4),
            record("cheese", start, 6),
            record("apple", start, 9),
            record("banana", start, 5),
        ];
        let table = analyzer.analyze(&history);
        assert!(table.is_observed());
        assert_eq!(table.len(), 2);

        let dairy = table.get("Dairy").unwrap();
        assert_relative_eq!(dairy.average_days, 4.0);
        assert_relative_eq!(dairy.slope, 2.0);
        assert_relative_eq!(dairy.predicted_days, 8.0);
        assert_eq!(dairy.trend, TrendDirection::Increasing);

        let fruit = table.get("Fruit").unwrap();
        assert_relative_eq!(fruit.average_days, 7.0);
        assert_relative_eq!(fruit.slope, -4.0);
        assert_relative_eq!(fruit.predicted_days, 1.0);
        assert_eq!(fruit.trend, TrendDirection::Decreasing);
    }

    #[test]
    fn test_single_record_group_is_flat() {
        let analyzer = ConsumptionAnalyzer::new(kb());
        let start = date(2024, 1, 1);
        let table = analyzer.analyze(&[
            record("milk", start, 2),
            record("milk", start, 2),
            record("bread", start, 6),
        ]);
        let grain = table.get("Grain").unwrap();
        assert_eq!(grain.slope, 0.0);
        assert_eq!(grain.predicted_days, 6.0);
        assert_eq!(grain.trend, TrendDirection::Decreasing);
    }

    #[test]
    fn test_skips_records_consumed_before_purchase() {
        let analyzer = ConsumptionAnalyzer::new(kb());
        let start = date(2024, 1, 10);
        let backwards = ConsumptionRecord {
            item: "milk".to_string(),
            purchase_date: start,
            consumption_date: date(2024, 1, 1),
        };
        let table = analyzer.analyze(&[
            record("milk", start, 1),
            record("milk", start, 2),
            backwards,
        ]);
        assert!(!table.is_observed());
    }

    #[test]
    fn test_waste_likelihood_bands() {
        let scorer = WasteRiskScorer::new(kb());
        let today = date(2024, 5, 1);
        let patterns = PatternTable::default();
        // Dairy: perishability 0.85, average 7.0 (unseen)
        let m = 0.5 + 0.5 * 0.85;
        let at = |days: u64| {
            scorer.waste_likelihood("milk", today + chrono::Days::new(days), today, &patterns)
        };
        assert_relative_eq!(at(0), m, epsilon = 1e-12);
        assert_relative_eq!(at(3), 0.8 * m, epsilon = 1e-12);
        assert_relative_eq!(at(5), 0.5 * m, epsilon = 1e-12);
        assert_relative_eq!(at(8), 0.2 * m, epsilon = 1e-12);
        assert_relative_eq!(at(30), 0.1 * m, epsilon = 1e-12);
    }

    #[test]
    fn test_expired_item_unknown_category() {
        let scorer = WasteRiskScorer::new(kb());
        let today = date(2024, 5, 1);
        let p = scorer.waste_likelihood(
            "quinzle blorp",
            date(2024, 4, 20),
            today,
            &PatternTable::default(),
        );
        assert_relative_eq!(p, 0.85, epsilon = 1e-12);
    }

    #[test]
    fn test_recommendations() {
        let analyzer = ConsumptionAnalyzer::new(kb());
        let start = date(2024, 1, 1);
        let patterns = analyzer.analyze(&[
            record("milk", start, 2),
            record("yogurt", start, 4),
            record("cheese", start, 6),
        ]);
        let inventory = vec!["Whole milk".to_string(), "carrots".to_string()];
        let recs = analyzer.recommendations(&inventory, &patterns);
        assert_eq!(
            recs,
            vec![
                "Consider adding protein sources like chicken or fish".to_string(),
                "Add some fresh fruits for a balanced diet".to_string(),
                "Your Dairy consumption is increasing - consider buying more".to_string(),
            ]
        );
    }

    #[test]
    fn test_co2_saved() {
        let today = date(2024, 5, 1);
        assert_relative_eq!(co2_saved_kg(2, date(2024, 5, 15), today), 2.0);
        assert_eq!(co2_saved_kg(3, date(2024, 4, 30), today), 0.0);
        assert_eq!(co2_saved_kg(3, today, today), 0.0);
    }
}
