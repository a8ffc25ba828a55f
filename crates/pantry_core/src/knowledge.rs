//! crates/pantry_core/src/knowledge.rs
//!
//! The shelf-life knowledge base: food category profiles, the item names that
//! map onto them, storage-location multipliers and the fallback consumption
//! table. Built once, immutable afterwards, and handed to each engine at
//! construction time.

use serde::Deserialize;
use tracing::debug;

use crate::domain::{FoodCategoryProfile, StorageModifier};
use crate::error::{CoreError, CoreResult};

const EMBEDDED_KNOWLEDGE_BASE: &str = include_str!("../data/knowledge_base.json");

/// Multiplier applied when a storage label matches nothing in the table.
pub const NEUTRAL_STORAGE_MULTIPLIER: f64 = 1.0;

//=========================================================================================
// File Format
//=========================================================================================

#[derive(Deserialize)]
struct KnowledgeBaseFile {
    default_profile: FoodCategoryProfile,
    categories: Vec<CategoryEntry>,
    storage: Vec<StorageModifier>,
    #[serde(default)]
    default_consumption: Vec<DefaultConsumption>,
}

#[derive(Debug, Clone, Deserialize)]
struct CategoryEntry {
    #[serde(flatten)]
    profile: FoodCategoryProfile,
    #[serde(default)]
    aliases: Vec<String>,
}

/// Average days-to-consume assumed for a category when there is not enough
/// history to fit a pattern.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DefaultConsumption {
    pub category: String,
    pub average_days: f64,
}

//=========================================================================================
// Knowledge Base
//=========================================================================================

/// A profile looked up by name, together with whether the lookup hit a
/// known category or fell back to the default profile.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedProfile<'a> {
    pub profile: &'a FoodCategoryProfile,
    pub recognized: bool,
}

#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    categories: Vec<CategoryEntry>,
    storage: Vec<StorageModifier>,
    default_profile: FoodCategoryProfile,
    default_consumption: Vec<DefaultConsumption>,
}

impl KnowledgeBase {
    /// Loads the tables compiled into the crate.
    pub fn embedded() -> CoreResult<Self> {
        Self::from_json(EMBEDDED_KNOWLEDGE_BASE)
    }

    /// Parses and validates a knowledge base from its JSON form.
    pub fn from_json(raw: &str) -> CoreResult<Self> {
        let file: KnowledgeBaseFile =
            serde_json::from_str(raw).map_err(|e| CoreError::KnowledgeBase(e.to_string()))?;

        let mut categories = file.categories;
        for entry in &mut categories {
            entry.aliases = entry
                .aliases
                .iter()
                .map(|alias| normalize(alias))
                .filter(|alias| !alias.is_empty())
                .collect();
        }

        let kb = Self {
            categories,
            storage: file.storage,
            default_profile: file.default_profile,
            default_consumption: file.default_consumption,
        };
        kb.validate()?;
        debug!(
            categories = kb.categories.len(),
            storage = kb.storage.len(),
            "Knowledge base loaded"
        );
        Ok(kb)
    }

    fn validate(&self) -> CoreResult<()> {
        let profiles = self
            .categories
            .iter()
            .map(|entry| &entry.profile)
            .chain(std::iter::once(&self.default_profile));

        let mut seen = Vec::new();
        for profile in profiles {
            if profile.name.trim().is_empty() {
                return Err(CoreError::KnowledgeBase("category with empty name".to_string()));
            }
            if !(0.0..=1.0).contains(&profile.perishability) {
                return Err(CoreError::KnowledgeBase(format!(
                    "perishability of '{}' must lie in [0, 1], got {}",
                    profile.name, profile.perishability
                )));
            }
            if profile.shelf_life_days == 0 {
                return Err(CoreError::KnowledgeBase(format!(
                    "shelf life of '{}' must be positive",
                    profile.name
                )));
            }
            let key = normalize(&profile.name);
            if seen.contains(&key) {
                return Err(CoreError::KnowledgeBase(format!(
                    "duplicate category '{}'",
                    profile.name
                )));
            }
            seen.push(key);
        }

        for modifier in &self.storage {
            if !(modifier.multiplier.is_finite() && modifier.multiplier > 0.0) {
                return Err(CoreError::KnowledgeBase(format!(
                    "storage multiplier of '{}' must be positive",
                    modifier.label
                )));
            }
        }
        Ok(())
    }

    /// Resolves an item or category name onto a profile.
    ///
    /// Exact matches (category name or alias) win; otherwise the first entry
    /// in table order whose name or alias contains, or is contained in, the
    /// query. Unknown names fall back to the default profile.
    pub fn resolve(&self, name: &str) -> ResolvedProfile<'_> {
        let query = normalize(name);
        if query.is_empty() {
            return self.fallback();
        }

        let exact = self.categories.iter().find(|entry| {
            normalize(&entry.profile.name) == query || entry.aliases.iter().any(|a| *a == query)
        });
        if let Some(entry) = exact {
            return ResolvedProfile {
                profile: &entry.profile,
                recognized: true,
            };
        }

        let partial = self.categories.iter().find(|entry| {
            let category = normalize(&entry.profile.name);
            overlaps(&query, &category) || entry.aliases.iter().any(|a| overlaps(&query, a))
        });
        match partial {
            Some(entry) => ResolvedProfile {
                profile: &entry.profile,
                recognized: true,
            },
            None => self.fallback(),
        }
    }

    fn fallback(&self) -> ResolvedProfile<'_> {
        ResolvedProfile {
            profile: &self.default_profile,
            recognized: false,
        }
    }

    /// Finds the storage modifier whose keywords appear in the label.
    pub fn storage(&self, label: Option<&str>) -> Option<&StorageModifier> {
        let label = normalize(label?);
        if label.is_empty() {
            return None;
        }
        self.storage.iter().find(|modifier| {
            normalize(&modifier.label) == label
                || modifier
                    .keywords
                    .iter()
                    .any(|keyword| label.contains(&normalize(keyword)))
        })
    }

    pub fn storage_multiplier(&self, label: Option<&str>) -> f64 {
        match self.storage(label) {
            Some(modifier) => modifier.multiplier,
            None => {
                if let Some(label) = label {
                    debug!(label, "Unrecognised storage location, using neutral multiplier");
                }
                NEUTRAL_STORAGE_MULTIPLIER
            }
        }
    }

    pub fn is_refrigerated(&self, label: Option<&str>) -> bool {
        self.storage(label).is_some_and(|m| m.refrigerated)
    }

    pub fn is_frozen(&self, label: Option<&str>) -> bool {
        self.storage(label).is_some_and(|m| m.frozen)
    }

    /// Category profiles in table order (the default profile excluded).
    pub fn categories(&self) -> impl Iterator<Item = &FoodCategoryProfile> {
        self.categories.iter().map(|entry| &entry.profile)
    }

    pub fn default_profile(&self) -> &FoodCategoryProfile {
        &self.default_profile
    }

    pub fn default_consumption(&self) -> &[DefaultConsumption] {
        &self.default_consumption
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

fn overlaps(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}
