//! Simulation errors
//!
//! Only hard failures live here: input validation and safety guards.
//! A stage that is merely unavailable reports `StageStatus::NotApplied`
//! instead of failing the turn.

use crate::core::EdgeKeyError;
use crate::models::FactionId;
use crate::orchestrator::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    // ===== Input validation =====
    #[error(transparent)]
    InvalidEdgeId(#[from] EdgeKeyError),

    #[error("Invalid scenario script: {0}")]
    InvalidScript(String),

    #[error("Unsupported save schema_version: {found} (expected {expected})")]
    UnsupportedSchemaVersion { found: u32, expected: u32 },

    #[error("Unknown faction: {0}")]
    UnknownFaction(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    #[error("State validation failed: {0}")]
    InvalidState(String),

    #[error("I/O error on {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ===== Safety guards =====
    /// Collapse gating was requested with uncalibrated constants
    #[error("{stage} constants are unverified; refusing to run with placeholder values")]
    UnverifiedConstants { stage: &'static str },

    // ===== Capital operations =====
    #[error("Faction not found: {0}")]
    FactionNotFound(FactionId),

    #[error("Insufficient capital: requested {requested}, available {available}")]
    InsufficientCapital { requested: u32, available: u32 },
}
