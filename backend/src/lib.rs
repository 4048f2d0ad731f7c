//! Frontline Core - Rust Engine
//!
//! Deterministic turn engine for a front-line war simulation: front edges
//! and pressure, supply reachability, exhaustion, two-tier collapse gating
//! and negotiation pressure/capital with an append-only ledger.
//!
//! # Architecture
//!
//! - **core**: Turn clock, canonical edge ids, 6-decimal rounding
//! - **models**: Domain types (Faction, FrontSegment, GameState, events)
//! - **front**: Front edge derivation, segments, posture commitment, breaches
//! - **supply**: Reachability from supply sources and siege streaks
//! - **pressure**: Per-settlement exposure
//! - **exhaustion**: Exhaustion accumulation
//! - **collapse**: Tier-0 (faction) and Tier-1 (settlement) eligibility
//! - **negotiation**: Negotiation pressure, capital and ledger
//! - **orchestrator**: Turn pipeline, config, save files
//! - **scenario**: Scripted multi-turn runs and summaries
//!
//! # Critical Invariants
//!
//! 1. Same input state, config and script produce byte-identical output
//! 2. Every keyed collection iterates in sorted order (BTreeMap/BTreeSet)
//! 3. Every persisted float is rounded to 6 decimals
//! 4. Eligibility only ever comes from the turn pipeline, never from input
//!
//! # Example
//!
//! ```rust
//! use frontline_core::models::{Event, EventLog, FactionId};
//!
//! let mut log = EventLog::new();
//! log.log(Event::StrainCeilingReached {
//!     turn: 3,
//!     settlement: "S1".to_string(),
//! });
//! assert_eq!(log.events_at_turn(3).len(), 1);
//! assert!(log.events_for_faction(FactionId::Rs).is_empty());
//! ```

// Module declarations
pub mod collapse;
pub mod core;
pub mod exhaustion;
pub mod front;
pub mod models;
pub mod negotiation;
pub mod orchestrator;
pub mod pressure;
pub mod scenario;
pub mod supply;

// Re-exports for convenience
pub use core::{round6, EdgeKey, EdgeKeyError, TurnClock};
pub use front::{AdjacencyFrontDeriver, FrontEdgeDeriver, StaticFrontDeriver};
pub use models::{
    Domain, Event, EventLog, Faction, FactionId, GameState, LedgerEntry, LedgerKind, Posture,
    PostureAssignment,
};
pub use orchestrator::{
    load_state, save_state, state_digest, run_turn, BreachOutcome, Orchestrator, SimulationError,
    StageStatus, TurnConfig, TurnReport,
};
pub use scenario::{run_scenario, ScenarioOutcome, ScenarioScript, ScenarioSummary};
