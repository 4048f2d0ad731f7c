//! Append-only negotiation capital ledger
//!
//! Every change to a faction's negotiation capital is recorded here as one
//! immutable [`LedgerEntry`]. Entries can only be added through
//! [`NegotiationLedger::record`]; there is no API to edit or remove them, and
//! the entry fields are private with read-only accessors.

use crate::models::faction::FactionId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What caused a capital change
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    PressureGain,
    Spend,
    SupplyViability,
}

impl LedgerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerKind::PressureGain => "pressure_gain",
            LedgerKind::Spend => "spend",
            LedgerKind::SupplyViability => "supply_viability",
        }
    }
}

impl fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One capital change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    id: String,
    turn: u32,
    faction: FactionId,
    kind: LedgerKind,
    delta: i64,
    reason: String,
}

impl LedgerEntry {
    /// Stable id `NLED_<turn>_<faction>_<kind>_<seq>`
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn faction(&self) -> FactionId {
        self.faction
    }

    pub fn kind(&self) -> LedgerKind {
        self.kind
    }

    /// Signed capital change
    pub fn delta(&self) -> i64 {
        self.delta
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NegotiationLedger {
    entries: Vec<LedgerEntry>,
}

impl NegotiationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry and return it
    ///
    /// `seq` counts earlier entries with the same turn, faction and kind, so
    /// ids stay unique when a kind is recorded more than once in a turn.
    pub fn record(
        &mut self,
        turn: u32,
        faction: FactionId,
        kind: LedgerKind,
        delta: i64,
        reason: impl Into<String>,
    ) -> &LedgerEntry {
        let seq = self
            .entries
            .iter()
            .filter(|e| e.turn == turn && e.faction == faction && e.kind == kind)
            .count();
        let entry = LedgerEntry {
            id: format!("NLED_{}_{}_{}_{}", turn, faction, kind, seq),
            turn,
            faction,
            kind,
            delta,
            reason: reason.into(),
        };
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn entries_for_faction(&self, faction: FactionId) -> Vec<&LedgerEntry> {
        self.entries.iter().filter(|e| e.faction == faction).collect()
    }

    pub fn entries_at_turn(&self, turn: u32) -> Vec<&LedgerEntry> {
        self.entries.iter().filter(|e| e.turn == turn).collect()
    }
}
