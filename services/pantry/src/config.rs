//! services/pantry/src/config.rs
//!
//! Defines the service's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub log_level: Level,
    /// JSON knowledge base to use instead of the embedded one.
    pub knowledge_base_path: Option<PathBuf>,
    /// JSON achievement catalog to use instead of the embedded one.
    pub achievements_path: Option<PathBuf>,
    pub recipe_days_ahead: u32,
    pub leaderboard_limit: usize,
    /// JSON-lines request file; stdin when unset.
    pub input_path: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Data Sources ---
        let knowledge_base_path = lookup("PANTRY_KNOWLEDGE_BASE").map(PathBuf::from);
        let achievements_path = lookup("PANTRY_ACHIEVEMENTS").map(PathBuf::from);
        let input_path = lookup("PANTRY_INPUT").map(PathBuf::from);

        // --- Load Engine Settings ---
        let recipe_days_ahead = positive(&lookup, "PANTRY_RECIPE_DAYS_AHEAD", 7)?;
        let leaderboard_limit = positive(&lookup, "PANTRY_LEADERBOARD_LIMIT", 10)?;

        Ok(Self {
            log_level,
            knowledge_base_path,
            achievements_path,
            recipe_days_ahead: recipe_days_ahead as u32,
            leaderboard_limit,
            input_path,
        })
    }
}

fn positive(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
    default: usize,
) -> Result<usize, ConfigError> {
    let Some(raw) = lookup(var) else {
        return Ok(default);
    };
    match raw.trim().parse::<u32>() {
        Ok(value) if value > 0 => Ok(value as usize),
        _ => Err(ConfigError::InvalidValue(
            var.to_string(),
            format!("'{}' is not a positive integer", raw),
        )),
    }
}
