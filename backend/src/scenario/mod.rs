//! Scenario scripts and the deterministic multi-turn runner

pub mod runner;
pub mod script;
pub mod summary;

pub use runner::{run_scenario, ScenarioOutcome};
pub use script::{ScenarioScript, ScriptEntry, SCRIPT_SCHEMA_VERSION};
pub use summary::{ScenarioSummary, TurnSummary, SUMMARY_SCHEMA_VERSION};
