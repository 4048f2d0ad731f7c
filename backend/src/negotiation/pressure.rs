//! Negotiation pressure
//!
//! ```text
//! increment = per_domain × eligible_tier0_domains
//!           + min(sustained_sieges, siege_cap)
//!           + floor(exhaustion increase)
//!           + min(breach_candidates, breach_cap)
//!           + floor(unsupplied_active_formations / formations_divisor)
//!           + floor(unsupplied_militia_pools / militia_divisor)
//! ```
//!
//! A positive increment is added; otherwise pressure decays by the quiet-turn
//! amount, never below zero.

use crate::exhaustion::ExhaustionChange;
use crate::front::BreachCandidate;
use crate::models::{Event, FactionId, GameState};
use crate::orchestrator::config::NegotiationConfig;
use crate::supply::{sustained_sieges, SupplyReport};
use serde::Serialize;
use std::collections::BTreeMap;

/// This turn's raw pressure inputs for one faction, before caps and divisors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PressureDrivers {
    /// Whole points of exhaustion gained this turn
    pub exhaustion_increase: u32,
    /// Breach candidates on edges where the faction is a side
    pub breach_candidates: u32,
    pub unsupplied_formations: u32,
    pub unsupplied_militia_pools: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PressureChange {
    pub before: u32,
    pub after: u32,
    pub eligible_domains: u32,
    pub sustained_sieges: u32,
    pub exhaustion_increment: u32,
    pub instability_increment: u32,
    pub supply_formations_increment: u32,
    pub supply_militia_increment: u32,
}

impl PressureChange {
    pub fn delta(&self) -> i64 {
        i64::from(self.after) - i64::from(self.before)
    }
}

/// Collect per-faction drivers from this turn's stage results
///
/// A militia pool is unsupplied when its settlement is not reachable from its
/// faction's supply sources. Pools without a faction are ignored.
pub fn pressure_drivers(
    state: &GameState,
    exhaustion: &BTreeMap<FactionId, ExhaustionChange>,
    breaches: &[BreachCandidate],
    supply: &SupplyReport,
) -> BTreeMap<FactionId, PressureDrivers> {
    let mut drivers: BTreeMap<FactionId, PressureDrivers> = state
        .factions
        .keys()
        .map(|id| (*id, PressureDrivers::default()))
        .collect();

    for (id, change) in exhaustion {
        if let Some(d) = drivers.get_mut(id) {
            let gained = (change.after - change.before).max(0.0).floor();
            d.exhaustion_increase = gained as u32;
        }
    }

    for breach in breaches {
        for side in [breach.winner, breach.loser] {
            if let Some(d) = drivers.get_mut(&side) {
                d.breach_candidates += 1;
            }
        }
    }

    for formation in state.formations.values() {
        if formation.is_active() && !formation.supplied {
            if let Some(d) = drivers.get_mut(&formation.faction) {
                d.unsupplied_formations += 1;
            }
        }
    }

    for (sid, pool) in &state.militia_pools {
        let Some(faction) = pool.faction else {
            continue;
        };
        if supply.is_reachable(faction, sid) {
            continue;
        }
        if let Some(d) = drivers.get_mut(&faction) {
            d.unsupplied_militia_pools += 1;
        }
    }

    drivers
}

pub fn update_negotiation_pressure(
    state: &mut GameState,
    drivers: &BTreeMap<FactionId, PressureDrivers>,
    config: &NegotiationConfig,
    turn: u32,
) -> (BTreeMap<FactionId, PressureChange>, Vec<Event>) {
    let view: &GameState = state;
    let inputs: Vec<(FactionId, PressureChange)> = view
        .factions
        .iter()
        .map(|(id, faction)| {
            let d = drivers.get(id).copied().unwrap_or_default();
            let change = PressureChange {
                before: faction.negotiation.pressure,
                after: faction.negotiation.pressure,
                eligible_domains: view
                    .collapse_eligibility
                    .get(id)
                    .map_or(0, |r| r.domains.eligible_count()),
                sustained_sieges: sustained_sieges(view, *id, config.sustained_siege_turns),
                exhaustion_increment: d.exhaustion_increase,
                instability_increment: d.breach_candidates.min(config.breach_cap),
                supply_formations_increment: d.unsupplied_formations
                    / config.unsupplied_formations_divisor,
                supply_militia_increment: d.unsupplied_militia_pools
                    / config.unsupplied_militia_divisor,
            };
            (*id, change)
        })
        .collect();

    let mut changes = BTreeMap::new();
    let mut events = Vec::new();

    for (faction_id, mut change) in inputs {
        let Some(faction) = state.factions.get_mut(&faction_id) else {
            continue;
        };
        let record = &mut faction.negotiation;
        let increment = config
            .pressure_per_eligible_domain
            .saturating_mul(change.eligible_domains)
            .saturating_add(change.sustained_sieges.min(config.siege_cap))
            .saturating_add(change.exhaustion_increment)
            .saturating_add(change.instability_increment)
            .saturating_add(change.supply_formations_increment)
            .saturating_add(change.supply_militia_increment);
        change.after = if increment > 0 {
            change.before.saturating_add(increment)
        } else {
            change.before.saturating_sub(config.decay_per_quiet_turn)
        };

        if change.after != change.before {
            record.pressure = change.after;
            record.last_change_turn = Some(turn);
            events.push(Event::NegotiationPressureChanged {
                turn,
                faction: faction_id,
                before: change.before,
                after: change.after,
            });
        }
        changes.insert(faction_id, change);
    }

    (changes, events)
}
