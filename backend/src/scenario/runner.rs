//! Deterministic multi-turn scenario runner

use crate::models::{EventLog, GameState};
use crate::orchestrator::{Orchestrator, SimulationError, TurnConfig};
use crate::scenario::script::ScenarioScript;
use crate::scenario::summary::{ScenarioSummary, TurnSummary};
use tracing::info;

#[derive(Debug)]
pub struct ScenarioOutcome {
    pub final_state: GameState,
    pub summary: ScenarioSummary,
    pub event_log: EventLog,
}

/// Run `turns` turns from `state`
///
/// For each run index `i` in `1..=turns`: apply the scripted postures for
/// `i`, run the turn, resolve breaches (flipping control only when
/// `apply_breaches` is set), then record the summary. The first error stops
/// the run.
pub fn run_scenario(
    state: GameState,
    script: &ScenarioScript,
    config: TurnConfig,
    turns: u32,
) -> Result<ScenarioOutcome, SimulationError> {
    let mut orchestrator = Orchestrator::new(state, config)?;
    let mut summary = ScenarioSummary::default();

    for index in 1..=turns {
        for entry in script.entries_for(index) {
            orchestrator.set_posture(entry.faction, entry.edge_id.clone(), entry.assignment())?;
        }

        let report = orchestrator.step()?;
        let breach = orchestrator.resolve_breaches(&report.front_edges);
        summary
            .turns
            .push(TurnSummary::build(&report, &breach, orchestrator.state()));
    }

    info!(
        turns,
        final_turn = orchestrator.current_turn(),
        events = orchestrator.event_log().len(),
        "scenario complete"
    );

    let event_log = orchestrator.event_log().clone();
    Ok(ScenarioOutcome {
        final_state: orchestrator.into_state(),
        summary,
        event_log,
    })
}
