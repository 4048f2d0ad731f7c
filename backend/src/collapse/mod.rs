//! Collapse Eligibility Gate
//!
//! Two tiers of persistent eligibility, run in order each turn:
//!
//! - **Tier-0** ([`tier0`]): per faction and domain, exhaustion above the
//!   domain threshold for enough consecutive turns, corroborated by a
//!   [`coherence`] check.
//! - **Tier-1** ([`tier1`]): per settlement, local strain above the Tier-1
//!   threshold for enough consecutive turns, only while the controlling
//!   faction is Tier-0 eligible in the same domain.
//!
//! # Guards
//!
//! Checked in this order before anything is evaluated:
//!
//! 1. gating disabled → not applied (`feature_disabled`)
//! 2. constants not verified → [`SimulationError::UnverifiedConstants`]
//! 3. exhaustion disabled → not applied (`exhaustion_disabled`)
//! 4. no factions → not applied (`no_factions`)

pub mod coherence;
pub mod tier0;
pub mod tier1;

use crate::models::{Domain, Event, GameState};
use crate::orchestrator::config::TurnConfig;
use crate::orchestrator::error::SimulationError;
use crate::orchestrator::report::{NotAppliedReason, StageStatus};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

pub use tier0::{evaluate_tier0, Tier0Stats};
pub use tier1::{accumulate_strain, evaluate_tier1, top_exposure, ExposureEntry, Tier1Stats};

/// A count per collapse domain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DomainCounts {
    pub authority: u32,
    pub cohesion: u32,
    pub spatial: u32,
}

impl DomainCounts {
    pub fn get(&self, domain: Domain) -> u32 {
        match domain {
            Domain::Authority => self.authority,
            Domain::Cohesion => self.cohesion,
            Domain::Spatial => self.spatial,
        }
    }

    fn slot(&mut self, domain: Domain) -> &mut u32 {
        match domain {
            Domain::Authority => &mut self.authority,
            Domain::Cohesion => &mut self.cohesion,
            Domain::Spatial => &mut self.spatial,
        }
    }

    pub fn bump(&mut self, domain: Domain) {
        *self.slot(domain) += 1;
    }

    pub fn raise_to(&mut self, domain: Domain, value: u32) {
        let slot = self.slot(domain);
        *slot = (*slot).max(value);
    }

    pub fn total(&self) -> u32 {
        self.authority + self.cohesion + self.spatial
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollapseGatingStats {
    pub tier0: Tier0Stats,
    pub tier1: Tier1Stats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollapseGatingResult {
    pub status: StageStatus,
    pub stats: CollapseGatingStats,
    #[serde(skip)]
    pub events: Vec<Event>,
}

impl CollapseGatingResult {
    fn not_applied(reason: NotAppliedReason) -> Self {
        debug!(%reason, "collapse gating not applied");
        Self {
            status: StageStatus::not_applied(reason),
            stats: CollapseGatingStats::default(),
            events: Vec::new(),
        }
    }
}

/// Run Tier-0 then Tier-1 gating against this turn's exposure
pub fn apply_collapse_gating(
    state: &mut GameState,
    exposure: &BTreeMap<String, f64>,
    config: &TurnConfig,
    turn: u32,
) -> Result<CollapseGatingResult, SimulationError> {
    if !config.stages.collapse_gating {
        return Ok(CollapseGatingResult::not_applied(
            NotAppliedReason::FeatureDisabled,
        ));
    }
    if !config.collapse.constants_verified {
        return Err(SimulationError::UnverifiedConstants {
            stage: "collapse_gating",
        });
    }
    if !config.stages.exhaustion {
        return Ok(CollapseGatingResult::not_applied(
            NotAppliedReason::ExhaustionDisabled,
        ));
    }
    if state.factions.is_empty() {
        return Ok(CollapseGatingResult::not_applied(NotAppliedReason::NoFactions));
    }

    let (tier0, mut events) = evaluate_tier0(state, &config.collapse, turn);
    let (tier1, tier1_events) = evaluate_tier1(state, exposure, &config.collapse, turn);
    events.extend(tier1_events);

    debug!(
        factions = tier0.entities_evaluated,
        eligible = tier0.eligible.total(),
        settlements = tier1.entities_evaluated,
        settlements_eligible = tier1.eligible.total(),
        "collapse gating applied"
    );

    Ok(CollapseGatingResult {
        status: StageStatus::Applied,
        stats: CollapseGatingStats { tier0, tier1 },
        events,
    })
}
