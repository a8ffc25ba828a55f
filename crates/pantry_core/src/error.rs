//! crates/pantry_core/src/error.rs
//!
//! Error types raised by the engines and by configuration loading.

use crate::domain::{AchievementFamily, AchievementTier};

/// Reasons an achievement catalog is refused at load time.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("Achievement at position {0} has an empty name")]
    EmptyName(usize),
    #[error("Achievement '{0}' requires zero points")]
    ZeroThreshold(String),
    #[error("Duplicate achievement {family} {tier:?}")]
    DuplicateTier {
        family: AchievementFamily,
        tier: AchievementTier,
    },
    #[error("Thresholds of {family} do not strictly increase with tier ('{name}')")]
    NonAscendingThreshold {
        family: AchievementFamily,
        name: String,
    },
    #[error("Achievement '{name}' in family {family} would feed its own XP reward back into evaluation")]
    RewardCycle {
        family: AchievementFamily,
        name: String,
    },
    #[error("Catalog could not be parsed: {0}")]
    Parse(String),
}

/// The primary error type for the core engines.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A mandatory field was missing or malformed. Callers are expected to
    /// validate before invoking an engine.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The knowledge base tables could not be loaded.
    #[error("Knowledge base error: {0}")]
    KnowledgeBase(String),

    #[error("Achievement catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// A convenience type alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;
