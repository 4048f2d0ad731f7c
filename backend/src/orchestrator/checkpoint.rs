//! Checkpoint - Save/Load Game State
//!
//! Saves are versioned JSON. Loading checks the version before anything
//! else is parsed, then validates cross-references that serde cannot.
//!
//! # Critical Invariants
//!
//! - **Version gate**: only `schema_version == SAVE_SCHEMA_VERSION` loads
//! - **Backward compatibility**: missing optional subtrees load as empty
//! - **Single control**: no settlement is in two areas of responsibility
//! - **Determinism**: [`state_digest`] is stable across runs and key order

use crate::models::{GameState, SAVE_SCHEMA_VERSION};
use crate::orchestrator::error::SimulationError;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::debug;

// ============================================================================
// Loading
// ============================================================================

/// Parse and validate a save from a JSON string
pub fn load_state_from_str(json: &str) -> Result<GameState, SimulationError> {
    let value: Value = serde_json::from_str(json)?;
    let found = value
        .get("schema_version")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    if found != u64::from(SAVE_SCHEMA_VERSION) {
        return Err(SimulationError::UnsupportedSchemaVersion {
            found: u32::try_from(found).unwrap_or(u32::MAX),
            expected: SAVE_SCHEMA_VERSION,
        });
    }

    let state: GameState = serde_json::from_value(value)?;
    validate_state(&state)?;
    Ok(state)
}

pub fn load_state(path: &Path) -> Result<GameState, SimulationError> {
    let contents = fs::read_to_string(path).map_err(|source| SimulationError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let state = load_state_from_str(&contents)?;
    debug!(path = %path.display(), turn = state.turn(), "save loaded");
    Ok(state)
}

// ============================================================================
// Saving
// ============================================================================

/// Pretty JSON with a trailing newline
pub fn state_to_json(state: &GameState) -> Result<String, SimulationError> {
    let mut json = serde_json::to_string_pretty(state)?;
    json.push('\n');
    Ok(json)
}

pub fn save_state(state: &GameState, path: &Path) -> Result<(), SimulationError> {
    let json = state_to_json(state)?;
    fs::write(path, json).map_err(|source| SimulationError::Io {
        path: path.display().to_string(),
        source,
    })?;
    debug!(path = %path.display(), turn = state.turn(), "save written");
    Ok(())
}

// ============================================================================
// Digest
// ============================================================================

/// SHA-256 (hex) of the canonical JSON of any serializable value
///
/// Object keys are sorted recursively before hashing, so the digest does
/// not depend on field or insertion order.
pub fn canonical_digest<T: Serialize>(value: &T) -> Result<String, SimulationError> {
    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let canonical = canonicalize(serde_json::to_value(value)?);
    let json = serde_json::to_string(&canonical)?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

pub fn state_digest(state: &GameState) -> Result<String, SimulationError> {
    canonical_digest(state)
}

// ============================================================================
// Validation
// ============================================================================

pub fn validate_state(state: &GameState) -> Result<(), SimulationError> {
    // 1. Single control
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for (id, faction) in &state.factions {
        for sid in &faction.areas_of_responsibility {
            if !seen.insert(sid.as_str()) {
                return Err(SimulationError::InvalidState(format!(
                    "settlement {} controlled by more than one faction (including {})",
                    sid, id
                )));
            }
        }
    }

    // 2. Strain is a finite non-negative number
    for (sid, strain) in &state.local_strain {
        if !strain.is_finite() || *strain < 0.0 {
            return Err(SimulationError::InvalidState(format!(
                "local strain for {} is {}",
                sid, strain
            )));
        }
    }

    // 3. Exhaustion is finite
    for (id, faction) in &state.factions {
        if !faction.profile.exhaustion.is_finite() {
            return Err(SimulationError::InvalidState(format!(
                "exhaustion of {} is not finite",
                id
            )));
        }
    }

    Ok(())
}
