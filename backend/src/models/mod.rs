//! Domain models for the frontline simulation

pub mod collapse;
pub mod event;
pub mod faction;
pub mod formation;
pub mod front;
pub mod ledger;
pub mod state;

// Re-exports
pub use collapse::{
    CollapseOverrides, Domain, DomainGate, DomainGates, EntityEligibility, FactionEligibility,
};
pub use event::{Event, EventLog};
pub use faction::{AuthorityProfile, Faction, FactionId, NegotiationRecord, UnknownFactionId};
pub use formation::{Formation, FormationStatus, MilitiaPool};
pub use front::{
    CeasefireEntry, FrontEdge, FrontPressure, FrontSegment, NegotiationStatus, Posture,
    PostureAssignment,
};
pub use ledger::{LedgerEntry, LedgerKind, NegotiationLedger};
pub use state::{GameState, GraphEdge, SettlementGraph, SAVE_SCHEMA_VERSION};
