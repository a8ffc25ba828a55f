//! crates/pantry_core/src/achievements.rs
//!
//! The static achievement catalog and the per-user ledger of tier progress.
//!
//! The catalog is validated once when it is loaded. Anything that could make
//! reward evaluation loop (a family driven by XP or level) is refused there,
//! so awarding never has to guard against it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;
use uuid::Uuid;

use crate::domain::{AchievementDefinition, AchievementFamily, AchievementProgress, AchievementTier};
use crate::error::{CatalogError, CoreResult};

const EMBEDDED_CATALOG: &str = include_str!("../data/achievements.json");

//=========================================================================================
// Catalog
//=========================================================================================

/// Achievement definitions grouped by family, each family ordered by
/// ascending points required.
#[derive(Debug, Clone)]
pub struct AchievementCatalog {
    families: BTreeMap<AchievementFamily, Vec<AchievementDefinition>>,
}

impl AchievementCatalog {
    pub fn embedded() -> CoreResult<Self> {
        Self::from_json(EMBEDDED_CATALOG)
    }

    pub fn from_json(raw: &str) -> CoreResult<Self> {
        let definitions: Vec<AchievementDefinition> =
            serde_json::from_str(raw).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Ok(Self::from_definitions(definitions)?)
    }

    pub fn from_definitions(definitions: Vec<AchievementDefinition>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for (position, def) in definitions.iter().enumerate() {
            if def.name.trim().is_empty() {
                return Err(CatalogError::EmptyName(position));
            }
            if def.points_required == 0 {
                return Err(CatalogError::ZeroThreshold(def.name.clone()));
            }
            if def.family == AchievementFamily::Level {
                return Err(CatalogError::RewardCycle {
                    family: def.family,
                    name: def.name.clone(),
                });
            }
            if !seen.insert((def.family, def.tier)) {
                return Err(CatalogError::DuplicateTier {
                    family: def.family,
                    tier: def.tier,
                });
            }
        }

        let mut families: BTreeMap<AchievementFamily, Vec<AchievementDefinition>> = BTreeMap::new();
        for def in definitions {
            families.entry(def.family).or_default().push(def);
        }
        for ladder in families.values_mut() {
            ladder.sort_by_key(|def| def.tier);
            for pair in ladder.windows(2) {
                if pair[1].points_required <= pair[0].points_required {
                    return Err(CatalogError::NonAscendingThreshold {
                        family: pair[1].family,
                        name: pair[1].name.clone(),
                    });
                }
            }
        }

        let catalog = Self { families };
        debug!(achievements = catalog.len(), "Achievement catalog loaded");
        Ok(catalog)
    }

    /// Definitions of one family, lowest threshold first. Inactive entries
    /// are included.
    pub fn family(&self, family: AchievementFamily) -> &[AchievementDefinition] {
        self.families.get(&family).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn definition(
        &self,
        family: AchievementFamily,
        tier: AchievementTier,
    ) -> Option<&AchievementDefinition> {
        self.family(family).iter().find(|def| def.tier == tier)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AchievementDefinition> {
        self.families.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.families.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}

//=========================================================================================
// Ledger
//=========================================================================================

/// Every tier record a user has touched. Records are created on the first
/// progress update of their family and never removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementLedger {
    pub user_id: Uuid,
    entries: Vec<AchievementProgress>,
}

impl AchievementLedger {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            entries: Vec::new(),
        }
    }

    pub fn get(&self, family: AchievementFamily, tier: AchievementTier) -> Option<&AchievementProgress> {
        self.entries
            .iter()
            .find(|entry| entry.family == family && entry.tier == tier)
    }

    /// Load-or-create.
    pub fn entry_mut(&mut self, family: AchievementFamily, tier: AchievementTier) -> &mut AchievementProgress {
        let position = self
            .entries
            .iter()
            .position(|entry| entry.family == family && entry.tier == tier);
        let index = match position {
            Some(index) => index,
            None => {
                self.entries.push(AchievementProgress {
                    user_id: self.user_id,
                    family,
                    tier,
                    progress: 0,
                    unlocked: false,
                    unlocked_at: None,
                });
                self.entries.len() - 1
            }
        };
        &mut self.entries[index]
    }

    /// Sets the family's progress on one tier. Returns true only on the
    /// call that flips it to unlocked.
    pub fn record(
        &mut self,
        def: &AchievementDefinition,
        progress: u32,
        now: DateTime<Utc>,
    ) -> bool {
        let entry = self.entry_mut(def.family, def.tier);
        entry.progress = progress;
        if entry.unlocked || progress < def.points_required {
            return false;
        }
        entry.unlocked = true;
        entry.unlocked_at = Some(now);
        true
    }

    pub fn entries(&self) -> &[AchievementProgress] {
        &self.entries
    }

    pub fn unlocked(&self) -> impl Iterator<Item = &AchievementProgress> {
        self.entries.iter().filter(|entry| entry.unlocked)
    }
}
