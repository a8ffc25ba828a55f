//! services/pantry/src/service/state.rs
//!
//! Defines the application's shared state.

use pantry_core::achievements::AchievementCatalog;
use pantry_core::gamification::GamificationEngine;
use pantry_core::knowledge::KnowledgeBase;
use pantry_core::ports::{Clock, ProgressRepository};
use std::sync::Arc;

use crate::config::Config;
use crate::service::inventory::InventoryService;
use crate::service::progression::ProgressionService;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to every handler.
pub struct AppState {
    pub config: Arc<Config>,
    pub inventory: InventoryService,
    pub progression: ProgressionService,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        knowledge: Arc<KnowledgeBase>,
        catalog: Arc<AchievementCatalog>,
        repo: Arc<dyn ProgressRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let inventory = InventoryService::new(knowledge, clock.clone(), config.recipe_days_ahead);
        let progression = ProgressionService::new(
            repo,
            clock,
            GamificationEngine::new(catalog),
            config.leaderboard_limit,
        );
        Self {
            config,
            inventory,
            progression,
        }
    }
}
