//! services/pantry/src/error.rs
//!
//! Defines the primary error type for the entire pantry service.

use crate::config::ConfigError;
use pantry_core::error::CoreError;
use pantry_core::ports::PortError;

/// The primary error type for the `pantry` service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents a rejected input or a broken knowledge base / catalog.
    #[error("Engine Error: {0}")]
    Core(#[from] CoreError),

    /// Represents a standard Input/Output error (e.g., reading the request file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Represents a malformed request or data file.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// A convenience type alias for `Result<T, ServiceError>`.
pub type ServiceResult<T> = Result<T, ServiceError>;
