//! Per-turn report types shared by the gated stages

use crate::core::round6;
use crate::models::GameState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a gated stage did not run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotAppliedReason {
    /// The stage's own flag is off
    FeatureDisabled,
    /// Collapse gating is downstream of exhaustion, which is off
    ExhaustionDisabled,
    NoFactions,
    NegotiationDisabled,
}

impl NotAppliedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotAppliedReason::FeatureDisabled => "feature_disabled",
            NotAppliedReason::ExhaustionDisabled => "exhaustion_disabled",
            NotAppliedReason::NoFactions => "no_factions",
            NotAppliedReason::NegotiationDisabled => "negotiation_disabled",
        }
    }
}

impl fmt::Display for NotAppliedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a gated stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageStatus {
    Applied,
    NotApplied { reason: NotAppliedReason },
}

impl StageStatus {
    pub fn not_applied(reason: NotAppliedReason) -> Self {
        StageStatus::NotApplied { reason }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, StageStatus::Applied)
    }

    pub fn reason(&self) -> Option<NotAppliedReason> {
        match self {
            StageStatus::Applied => None,
            StageStatus::NotApplied { reason } => Some(*reason),
        }
    }
}

/// Formation pass-through aggregates
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormationStats {
    pub total: u32,
    pub active: u32,
    pub supplied_active: u32,
    pub assigned: u32,
    /// Mean fatigue of active formations
    pub mean_active_fatigue: f64,
}

impl FormationStats {
    pub fn from_state(state: &GameState) -> Self {
        let mut stats = FormationStats::default();
        let mut fatigue = 0.0;
        for formation in state.formations.values() {
            stats.total += 1;
            if formation.assignment.is_some() {
                stats.assigned += 1;
            }
            if formation.is_active() {
                stats.active += 1;
                fatigue += formation.fatigue;
                if formation.supplied {
                    stats.supplied_active += 1;
                }
            }
        }
        if stats.active > 0 {
            stats.mean_active_fatigue = round6(fatigue / f64::from(stats.active));
        }
        stats
    }
}

/// Militia pool pass-through aggregates
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MilitiaStats {
    pub pools: u32,
    pub available: u64,
    pub committed: u64,
    pub exhausted: u64,
    pub mean_fatigue: f64,
}

impl MilitiaStats {
    pub fn from_state(state: &GameState) -> Self {
        let mut stats = MilitiaStats::default();
        let mut fatigue = 0.0;
        for pool in state.militia_pools.values() {
            stats.pools += 1;
            stats.available += u64::from(pool.available);
            stats.committed += u64::from(pool.committed);
            stats.exhausted += u64::from(pool.exhausted);
            fatigue += pool.fatigue;
        }
        if stats.pools > 0 {
            stats.mean_fatigue = round6(fatigue / f64::from(stats.pools));
        }
        stats
    }
}
