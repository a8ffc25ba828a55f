//! crates/pantry_core/src/ports.rs
//!
//! Defines the service contracts (traits) the core expects from its surroundings.
//! These traits form the boundary of the hexagonal architecture: the engines
//! never touch storage or the wall clock directly.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::UserProgress;
use crate::achievements::AchievementLedger;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., a database).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Persisted Aggregates
//=========================================================================================

/// Everything the gamification engine reads and writes for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub progress: UserProgress,
    pub ledger: AchievementLedger,
}

impl PlayerState {
    pub fn new(user_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            progress: UserProgress::new(user_id, name),
            ledger: AchievementLedger::new(user_id),
        }
    }
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Registers a new user. Fails with `Conflict` if the id is taken.
    async fn create_player(&self, user_id: Uuid, name: &str) -> PortResult<PlayerState>;

    async fn load_player(&self, user_id: Uuid) -> PortResult<PlayerState>;

    async fn save_player(&self, state: PlayerState) -> PortResult<()>;

    /// All users in storage order.
    async fn list_players(&self) -> PortResult<Vec<UserProgress>>;
}

/// Source of "today" and "now". Engines take dates as parameters; the
/// service layer asks a clock for them.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}
