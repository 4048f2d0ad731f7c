//! Formations and militia pools
//!
//! These are owned by other subsystems. The turn pipeline only reads them:
//! formation fatigue feeds the cohesion coherence gate, supplied active
//! formations feed the supply-viability capital component, and both are
//! aggregated into the scenario summary.

use crate::core::EdgeKey;
use crate::models::faction::FactionId;
use serde::{Deserialize, Serialize};

/// Readiness state of a formation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormationStatus {
    #[default]
    Forming,
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Formation {
    pub faction: FactionId,
    #[serde(default)]
    pub status: FormationStatus,
    #[serde(default)]
    pub fatigue: f64,
    #[serde(default)]
    pub supplied: bool,
    /// Front edge the formation is committed to
    #[serde(default)]
    pub assignment: Option<EdgeKey>,
}

impl Formation {
    pub fn new(faction: FactionId, status: FormationStatus) -> Self {
        Self {
            faction,
            status,
            fatigue: 0.0,
            supplied: false,
            assignment: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == FormationStatus::Active
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MilitiaPool {
    pub faction: Option<FactionId>,
    pub available: u32,
    pub committed: u32,
    pub exhausted: u32,
    pub fatigue: f64,
}
