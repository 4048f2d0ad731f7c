//! Coherence-degradation checks
//!
//! Each domain has an independent corroborating signal that must hold, next
//! to sustained exhaustion or strain, before eligibility is granted. The
//! same checks serve both tiers; Tier-1 evaluates them against the
//! settlement's controlling faction.

use crate::models::{Domain, FactionId, GameState};
use crate::orchestrator::config::CollapseConfig;

pub fn is_degraded(
    state: &GameState,
    faction: FactionId,
    domain: Domain,
    config: &CollapseConfig,
) -> bool {
    match domain {
        Domain::Authority => authority_degraded(state, faction, config),
        Domain::Cohesion => cohesion_degraded(state, faction, config),
        Domain::Spatial => spatial_degraded(state, faction, config),
    }
}

/// Faction authority below the degradation threshold
pub fn authority_degraded(state: &GameState, faction: FactionId, config: &CollapseConfig) -> bool {
    state
        .factions
        .get(&faction)
        .is_some_and(|f| f.profile.authority < config.authority_degradation)
}

/// Any active formation of the faction above the fatigue threshold
///
/// A faction with no active formations is not degraded.
pub fn cohesion_degraded(state: &GameState, faction: FactionId, config: &CollapseConfig) -> bool {
    state
        .active_formations(faction)
        .any(|f| f.fatigue > config.fatigue_degradation)
}

/// Coarse supply proxy: `sources / max(1, controlled)` below the threshold
///
/// This is a ratio of declared sources, not a reachability computation.
/// No controlled settlements means nothing to degrade; controlled
/// settlements with no declared sources are always degraded.
pub fn spatial_degraded(state: &GameState, faction: FactionId, config: &CollapseConfig) -> bool {
    let Some(f) = state.factions.get(&faction) else {
        return false;
    };
    let controlled = f.areas_of_responsibility.len();
    if controlled == 0 {
        return false;
    }
    let sources = f.supply_sources.len();
    if sources == 0 {
        return true;
    }
    (sources as f64 / controlled.max(1) as f64) < config.supply_ratio_degradation
}
