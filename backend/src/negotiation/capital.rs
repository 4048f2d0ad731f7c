//! Negotiation capital
//!
//! Capital is a spendable balance drawn down by treaty evaluation. Every
//! change goes through the append-only ledger, one entry per change.

use crate::models::{Event, FactionId, GameState, LedgerEntry, LedgerKind};
use crate::negotiation::pressure::PressureChange;
use crate::orchestrator::config::NegotiationConfig;
use crate::orchestrator::error::SimulationError;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CapitalChange {
    pub before: u32,
    pub after: u32,
    pub pressure_gain: u32,
    pub supply_viability: u32,
}

fn supplied_active_formations(state: &GameState, faction: FactionId) -> u32 {
    state
        .active_formations(faction)
        .filter(|f| f.supplied)
        .count() as u32
}

/// Credit this turn's capital gains
///
/// Components are capped jointly at `max_capital_gain_per_turn`, pressure
/// gain first. Each nonzero component appends one ledger entry.
pub fn update_capital(
    state: &mut GameState,
    pressure: &BTreeMap<FactionId, PressureChange>,
    config: &NegotiationConfig,
    turn: u32,
) -> (BTreeMap<FactionId, CapitalChange>, Vec<Event>) {
    let mut changes = BTreeMap::new();
    let mut events = Vec::new();
    let ids: Vec<FactionId> = state.factions.keys().copied().collect();

    for faction_id in ids {
        let pressure_delta = pressure
            .get(&faction_id)
            .map_or(0, |p| p.delta().max(0) as u32);
        let cap = config.max_capital_gain_per_turn;
        let pressure_gain = (pressure_delta / config.capital_pressure_divisor).min(cap);
        let supply_viability = (supplied_active_formations(state, faction_id)
            / config.supplied_formations_divisor)
            .min(cap - pressure_gain);

        let Some(faction) = state.factions.get_mut(&faction_id) else {
            continue;
        };
        let before = faction.negotiation.capital;
        faction.negotiation.capital = before + pressure_gain + supply_viability;
        let after = faction.negotiation.capital;

        for (kind, amount) in [
            (LedgerKind::PressureGain, pressure_gain),
            (LedgerKind::SupplyViability, supply_viability),
        ] {
            if amount == 0 {
                continue;
            }
            let entry = state.negotiation_ledger.record(
                turn,
                faction_id,
                kind,
                i64::from(amount),
                kind.as_str(),
            );
            events.push(Event::CapitalChanged {
                turn,
                faction: faction_id,
                delta: entry.delta(),
                ledger_id: entry.id().to_string(),
            });
        }

        changes.insert(
            faction_id,
            CapitalChange {
                before,
                after,
                pressure_gain,
                supply_viability,
            },
        );
    }

    (changes, events)
}

/// Spend capital on behalf of a faction
///
/// Fails without touching state if the faction is unknown or the balance is
/// short. A zero amount is a no-op and records nothing.
pub fn spend_capital(
    state: &mut GameState,
    faction_id: FactionId,
    amount: u32,
    reason: &str,
) -> Result<Option<LedgerEntry>, SimulationError> {
    let turn = state.turn();
    let faction = state
        .factions
        .get_mut(&faction_id)
        .ok_or(SimulationError::FactionNotFound(faction_id))?;

    if amount > faction.negotiation.capital {
        return Err(SimulationError::InsufficientCapital {
            requested: amount,
            available: faction.negotiation.capital,
        });
    }
    if amount == 0 {
        return Ok(None);
    }

    faction.negotiation.capital -= amount;
    faction.negotiation.spent_total += amount;
    debug!(faction = %faction_id, amount, reason, "capital spent");

    let entry = state.negotiation_ledger.record(
        turn,
        faction_id,
        LedgerKind::Spend,
        -i64::from(amount),
        reason,
    );
    Ok(Some(entry.clone()))
}
