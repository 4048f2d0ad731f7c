//! Negotiation Pressure & Capital Ledger
//!
//! Converts collapse eligibility, sustained sieges, exhaustion gains, breach
//! instability and supply shortfalls into per-faction negotiation pressure, and pressure gains plus supply viability into
//! spendable capital. Capital only ever changes through the append-only
//! [`NegotiationLedger`](crate::models::NegotiationLedger).

pub mod capital;
pub mod pressure;

use crate::models::{Event, FactionId, GameState};
use crate::orchestrator::config::TurnConfig;
use crate::orchestrator::report::{NotAppliedReason, StageStatus};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

pub use capital::{spend_capital, update_capital, CapitalChange};
pub use pressure::{
    pressure_drivers, update_negotiation_pressure, PressureChange, PressureDrivers,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FactionNegotiationReport {
    pub pressure_before: u32,
    pub pressure_after: u32,
    pub pressure_delta: i64,
    pub capital_before: u32,
    pub capital_after: u32,
    pub spent_total: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NegotiationOutcome {
    pub status: StageStatus,
    pub by_faction: BTreeMap<FactionId, FactionNegotiationReport>,
    pub ledger_len: usize,
    #[serde(skip)]
    pub events: Vec<Event>,
}

pub fn apply_negotiation(
    state: &mut GameState,
    drivers: &BTreeMap<FactionId, PressureDrivers>,
    config: &TurnConfig,
    turn: u32,
) -> NegotiationOutcome {
    if !config.stages.negotiation {
        debug!("negotiation not applied");
        return NegotiationOutcome {
            status: StageStatus::not_applied(NotAppliedReason::NegotiationDisabled),
            by_faction: BTreeMap::new(),
            ledger_len: state.negotiation_ledger.len(),
            events: Vec::new(),
        };
    }
    if state.factions.is_empty() {
        return NegotiationOutcome {
            status: StageStatus::not_applied(NotAppliedReason::NoFactions),
            by_faction: BTreeMap::new(),
            ledger_len: state.negotiation_ledger.len(),
            events: Vec::new(),
        };
    }

    let (pressure, mut events) =
        update_negotiation_pressure(state, drivers, &config.negotiation, turn);
    let (capital, capital_events) = update_capital(state, &pressure, &config.negotiation, turn);
    events.extend(capital_events);

    let by_faction = state
        .factions
        .iter()
        .map(|(id, faction)| {
            let p = pressure.get(id).cloned().unwrap_or_default();
            let c = capital.get(id).cloned().unwrap_or_default();
            (
                *id,
                FactionNegotiationReport {
                    pressure_before: p.before,
                    pressure_after: p.after,
                    pressure_delta: p.delta(),
                    capital_before: c.before,
                    capital_after: c.after,
                    spent_total: faction.negotiation.spent_total,
                },
            )
        })
        .collect();

    debug!(ledger_len = state.negotiation_ledger.len(), "negotiation applied");
    NegotiationOutcome {
        status: StageStatus::Applied,
        by_faction,
        ledger_len: state.negotiation_ledger.len(),
        events,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Faction;

    #[test]
    fn test_disabled_stage_leaves_state_untouched() {
        let mut state = GameState::new("s").with_faction(FactionId::Rs, Faction::with_areas(["A"]));
        state.unsupplied_streak.insert("A".to_string(), 10);
        let mut config = TurnConfig::default();
        config.stages.negotiation = false;

        let before = state.clone();
        let outcome = apply_negotiation(&mut state, &BTreeMap::new(), &config, 1);
        assert_eq!(
            outcome.status.reason(),
            Some(NotAppliedReason::NegotiationDisabled)
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_siege_pressure_flows_into_capital() {
        let mut state = GameState::new("s").with_faction(
            FactionId::Rs,
            Faction::with_areas(["A", "B", "C"]),
        );
        for sid in ["A", "B", "C"] {
            state.unsupplied_streak.insert(sid.to_string(), 3);
        }
        let outcome = apply_negotiation(&mut state, &BTreeMap::new(), &TurnConfig::default(), 4);
        let report = &outcome.by_faction[&FactionId::Rs];
        assert_eq!(report.pressure_after, 3);
        // floor(3 / 2)
        assert_eq!(report.capital_after, 1);
        assert_eq!(outcome.ledger_len, 1);
    }

    #[test]
    fn test_breach_instability_adds_pressure() {
        let mut state = GameState::new("s").with_faction(FactionId::Rs, Faction::with_areas(["A"]));
        let mut drivers = BTreeMap::new();
        drivers.insert(
            FactionId::Rs,
            PressureDrivers {
                breach_candidates: 2,
                ..PressureDrivers::default()
            },
        );
        let outcome = apply_negotiation(&mut state, &drivers, &TurnConfig::default(), 2);
        assert_eq!(outcome.by_faction[&FactionId::Rs].pressure_after, 2);
        assert_eq!(outcome.by_faction[&FactionId::Rs].capital_after, 1);
    }
}
