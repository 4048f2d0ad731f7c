//! Negotiation Ledger Tests - pressure, capital and the append-only ledger
//!
//! Critical invariants tested:
//! - One ledger entry per nonzero capital change, never more
//! - Existing entries are never rewritten by later turns or spends
//! - A failed spend leaves balances and ledger untouched

use frontline_core::models::LedgerKind;
use frontline_core::{
    Faction, FactionId, GameState, LedgerEntry, Orchestrator, SimulationError, TurnConfig,
};

// ============================================================================
// Test Helpers
// ============================================================================

/// RS holds four settlements with no supply source, so all are besieged
fn besieged_state() -> GameState {
    GameState::new("negotiation")
        .with_faction(FactionId::Rs, Faction::with_areas(["A", "B", "C", "D"]))
        .with_faction(FactionId::Rbih, Faction::with_areas(["X"]))
}

fn capital(orchestrator: &Orchestrator, faction: FactionId) -> u32 {
    orchestrator.state().factions[&faction].negotiation.capital
}

// ============================================================================
// Pressure and Capital
// ============================================================================

#[test]
fn test_sieges_build_pressure_after_sustained_turns() {
    let mut orchestrator = Orchestrator::new(besieged_state(), TurnConfig::default()).unwrap();

    for _ in 0..2 {
        orchestrator.step().unwrap();
    }
    assert_eq!(orchestrator.state().factions[&FactionId::Rs].negotiation.pressure, 0);
    assert!(orchestrator.state().negotiation_ledger.is_empty());

    let report = orchestrator.step().unwrap();
    let rs = &report.negotiation.by_faction[&FactionId::Rs];
    // four besieged settlements, capped at three
    assert_eq!(rs.pressure_delta, 3);
    assert_eq!(rs.capital_after, 1);
    assert_eq!(
        orchestrator.state().factions[&FactionId::Rs].negotiation.last_change_turn,
        Some(3)
    );

    let entries = orchestrator.state().negotiation_ledger.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id(), "NLED_3_RS_pressure_gain_0");
    assert_eq!(entries[0].kind(), LedgerKind::PressureGain);
    assert_eq!(entries[0].delta(), 1);
}

#[test]
fn test_ledger_length_matches_capital_changes() {
    let mut orchestrator = Orchestrator::new(besieged_state(), TurnConfig::default()).unwrap();
    let mut capital_changes = 0;

    for _ in 0..6 {
        let report = orchestrator.step().unwrap();
        capital_changes += report
            .negotiation
            .by_faction
            .values()
            .filter(|r| r.capital_after != r.capital_before)
            .count();
    }
    assert_eq!(orchestrator.state().negotiation_ledger.len(), capital_changes);

    orchestrator
        .spend_capital(FactionId::Rs, 2, "ceasefire_offer")
        .unwrap();
    capital_changes += 1;
    assert_eq!(orchestrator.state().negotiation_ledger.len(), capital_changes);
    assert_eq!(
        orchestrator
            .event_log()
            .events_of_type("CapitalChanged")
            .len(),
        capital_changes - 1
    );
}

#[test]
fn test_entries_are_never_rewritten() {
    let mut orchestrator = Orchestrator::new(besieged_state(), TurnConfig::default()).unwrap();
    for _ in 0..3 {
        orchestrator.step().unwrap();
    }
    let snapshot: Vec<LedgerEntry> = orchestrator.state().negotiation_ledger.entries().to_vec();
    assert!(!snapshot.is_empty());

    for _ in 0..3 {
        orchestrator.step().unwrap();
    }
    orchestrator.spend_capital(FactionId::Rs, 1, "talks").unwrap();

    let entries = orchestrator.state().negotiation_ledger.entries();
    assert_eq!(&entries[..snapshot.len()], snapshot.as_slice());
}

// ============================================================================
// Spending
// ============================================================================

#[test]
fn test_spend_records_negative_entry() {
    let mut orchestrator = Orchestrator::new(besieged_state(), TurnConfig::default()).unwrap();
    for _ in 0..5 {
        orchestrator.step().unwrap();
    }
    let before = capital(&orchestrator, FactionId::Rs);
    assert_eq!(before, 3);

    let entry = orchestrator
        .spend_capital(FactionId::Rs, 2, "prisoner_exchange")
        .unwrap()
        .unwrap();
    assert_eq!(entry.kind(), LedgerKind::Spend);
    assert_eq!(entry.delta(), -2);
    assert_eq!(entry.reason(), "prisoner_exchange");
    assert_eq!(entry.id(), "NLED_5_RS_spend_0");

    let rs = &orchestrator.state().factions[&FactionId::Rs].negotiation;
    assert_eq!(rs.capital, 1);
    assert_eq!(rs.spent_total, 2);
}

#[test]
fn test_overdraft_is_rejected_without_side_effects() {
    let mut orchestrator = Orchestrator::new(besieged_state(), TurnConfig::default()).unwrap();
    for _ in 0..3 {
        orchestrator.step().unwrap();
    }
    let ledger_len = orchestrator.state().negotiation_ledger.len();

    let err = orchestrator
        .spend_capital(FactionId::Rs, 50, "too_much")
        .unwrap_err();
    assert!(matches!(
        err,
        SimulationError::InsufficientCapital {
            requested: 50,
            available: 1
        }
    ));
    assert_eq!(orchestrator.state().negotiation_ledger.len(), ledger_len);
    assert_eq!(capital(&orchestrator, FactionId::Rs), 1);
}

#[test]
fn test_zero_spend_records_nothing() {
    let mut orchestrator = Orchestrator::new(besieged_state(), TurnConfig::default()).unwrap();
    let entry = orchestrator.spend_capital(FactionId::Rs, 0, "noop").unwrap();
    assert!(entry.is_none());
    assert!(orchestrator.state().negotiation_ledger.is_empty());
}

#[test]
fn test_spend_for_absent_faction_fails() {
    let mut orchestrator = Orchestrator::new(besieged_state(), TurnConfig::default()).unwrap();
    let err = orchestrator
        .spend_capital(FactionId::Hrhb, 1, "x")
        .unwrap_err();
    assert!(matches!(err, SimulationError::FactionNotFound(FactionId::Hrhb)));
}
