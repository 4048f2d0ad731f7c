//! Event logging for turn auditing.
//!
//! The orchestrator records significant state changes as [`Event`]s. The log
//! is an audit trail alongside the per-turn report; nothing in the pipeline
//! reads it back.
//!
//! # Example
//!
//! ```rust
//! use frontline_core::models::{Domain, Event, EventLog, FactionId};
//!
//! let mut log = EventLog::new();
//! log.log(Event::CollapseEligible {
//!     turn: 3,
//!     tier: 0,
//!     actor: FactionId::Rs.to_string(),
//!     domain: Domain::Authority,
//! });
//!
//! assert_eq!(log.events_at_turn(3).len(), 1);
//! assert_eq!(log.events()[0].event_type(), "CollapseEligible");
//! ```

use crate::models::collapse::Domain;
use crate::models::faction::FactionId;
use serde::Serialize;

/// Turn event capturing a state change.
///
/// All events include the turn they occurred on. Within a turn, events are
/// logged in pipeline stage order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// An actor became collapse-eligible in a domain (edge-triggered)
    CollapseEligible {
        turn: u32,
        /// 0 = faction, 1 = settlement
        tier: u8,
        actor: String,
        domain: Domain,
    },

    /// A settlement's local strain hit the ceiling for the first time
    StrainCeilingReached { turn: u32, settlement: String },

    NegotiationPressureChanged {
        turn: u32,
        faction: FactionId,
        before: u32,
        after: u32,
    },

    CapitalChanged {
        turn: u32,
        faction: FactionId,
        delta: i64,
        ledger_id: String,
    },

    /// A settlement changed hands after a breach
    ControlFlip {
        turn: u32,
        settlement: String,
        from: FactionId,
        to: FactionId,
        edge_id: String,
    },
}

impl Event {
    /// Get the turn when this event occurred
    pub fn turn(&self) -> u32 {
        match self {
            Event::CollapseEligible { turn, .. } => *turn,
            Event::StrainCeilingReached { turn, .. } => *turn,
            Event::NegotiationPressureChanged { turn, .. } => *turn,
            Event::CapitalChanged { turn, .. } => *turn,
            Event::ControlFlip { turn, .. } => *turn,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Event::CollapseEligible { .. } => "CollapseEligible",
            Event::StrainCeilingReached { .. } => "StrainCeilingReached",
            Event::NegotiationPressureChanged { .. } => "NegotiationPressureChanged",
            Event::CapitalChanged { .. } => "CapitalChanged",
            Event::ControlFlip { .. } => "ControlFlip",
        }
    }

    /// Faction the event is about, if it concerns exactly one
    pub fn faction(&self) -> Option<FactionId> {
        match self {
            Event::NegotiationPressureChanged { faction, .. } => Some(*faction),
            Event::CapitalChanged { faction, .. } => Some(*faction),
            Event::ControlFlip { to, .. } => Some(*to),
            Event::CollapseEligible { .. } | Event::StrainCeilingReached { .. } => None,
        }
    }
}

/// Append-only log of events
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = Event>) {
        self.events.extend(events);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn events_at_turn(&self, turn: u32) -> Vec<&Event> {
        self.events.iter().filter(|e| e.turn() == turn).collect()
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    pub fn events_for_faction(&self, faction: FactionId) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.faction() == Some(faction))
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
