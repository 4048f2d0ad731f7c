//! Orchestrator - per-turn pipeline
//!
//! See `engine.rs` for the stage sequence.

pub mod checkpoint;
pub mod config;
pub mod engine;
pub mod error;
pub mod report;

pub use checkpoint::{
    canonical_digest, load_state, load_state_from_str, save_state, state_digest, state_to_json,
    validate_state,
};
pub use config::{
    BreachConfig, CollapseConfig, ConfigError, ExhaustionConfig, NegotiationConfig,
    PressureConfig, StageFlags, TurnConfig,
};
pub use engine::{run_turn, BreachOutcome, ExhaustionOutcome, FrontReport, Orchestrator, TurnReport};
pub use error::SimulationError;
pub use report::{FormationStats, MilitiaStats, NotAppliedReason, StageStatus};
