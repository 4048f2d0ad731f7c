//! Turn Engine
//!
//! Sequences the pipeline once per turn, in a fixed order:
//!
//! 1. **Front update**: derive edges, sync segments, supply reachability and
//!    siege streaks, posture commitment, front pressure
//! 2. **Exposure**: per-settlement pressure exposure
//! 3. **Exhaustion** (gated)
//! 4. **Collapse gating** (gated): Tier-0 then Tier-1
//! 5. **Negotiation** (gated): pressure drivers from this turn's results,
//!    then pressure, capital, ledger
//! 6. **Report**
//!
//! [`run_turn`] never mutates its input: it works on a copy and hands back
//! the new state, so a failed turn leaves the previous state intact.

use crate::collapse::{apply_collapse_gating, CollapseGatingResult};
use crate::exhaustion::{update_exhaustion, ExhaustionChange};
use crate::front::{
    accumulate_front_pressure, apply_control_flips, breach_candidates, compute_commitment,
    sync_segments, AdjacencyFrontDeriver, ControlFlip, FrontEdgeDeriver, FrontPressureStats,
    SegmentStats,
};
use crate::core::EdgeKey;
use crate::models::{EventLog, FactionId, FrontEdge, GameState, LedgerEntry, PostureAssignment};
use crate::negotiation::{
    apply_negotiation, pressure_drivers, spend_capital, NegotiationOutcome,
};
use crate::orchestrator::checkpoint::validate_state;
use crate::orchestrator::config::TurnConfig;
use crate::orchestrator::error::SimulationError;
use crate::orchestrator::report::{FormationStats, MilitiaStats, NotAppliedReason, StageStatus};
use crate::pressure::{exposure_by_entity, ExposureStats};
use crate::supply::{compute_reachability, update_siege_streaks, SupplyReport};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, info_span};

// ============================================================================
// Report Types
// ============================================================================

/// Front stage summary
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrontReport {
    pub edges: u32,
    pub segments: SegmentStats,
    pub pressure: FrontPressureStats,
    pub frozen_edges: u32,
    /// Effective committed weight per faction
    pub committed: BTreeMap<FactionId, f64>,
    pub capacity_limited: Vec<FactionId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExhaustionOutcome {
    pub status: StageStatus,
    pub by_faction: BTreeMap<FactionId, ExhaustionChange>,
}

/// Structured result of one turn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnReport {
    pub turn: u32,
    pub front: FrontReport,
    pub supply: SupplyReport,
    pub exposure: ExposureStats,
    pub exhaustion: ExhaustionOutcome,
    pub collapse: CollapseGatingResult,
    pub negotiation: NegotiationOutcome,
    pub formations: FormationStats,
    pub militia: MilitiaStats,
    /// This turn's front edges, in edge order
    #[serde(skip)]
    pub front_edges: Vec<FrontEdge>,
}

/// Breach resolution after a turn
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BreachOutcome {
    pub candidates: u32,
    pub applied: bool,
    pub flips: Vec<ControlFlip>,
}

// ============================================================================
// Turn Function
// ============================================================================

/// Run one full turn and return the next state with its report
pub fn run_turn(
    previous: &GameState,
    config: &TurnConfig,
    deriver: &dyn FrontEdgeDeriver,
) -> Result<(GameState, TurnReport), SimulationError> {
    config.validate()?;

    let mut state = previous.clone();
    let turn = state.meta.advance();
    let span = info_span!("turn", turn);
    let _enter = span.enter();

    // STEP 1: FRONT UPDATE
    let edges = deriver.derive(&state);
    let segments = sync_segments(&mut state, &edges, turn);
    let supply = compute_reachability(&state);
    update_siege_streaks(&mut state, &supply);
    let commitment = compute_commitment(&state, &edges, &config.pressure);
    let pressure = accumulate_front_pressure(
        &mut state,
        &edges,
        &commitment,
        &supply,
        &config.pressure,
        turn,
    );
    let front = FrontReport {
        edges: edges.len() as u32,
        frozen_edges: commitment.frozen_edges().len() as u32,
        committed: commitment
            .by_faction
            .iter()
            .map(|(id, c)| (*id, c.effective_total))
            .collect(),
        capacity_limited: commitment
            .by_faction
            .iter()
            .filter(|(_, c)| c.capacity_applied)
            .map(|(id, _)| *id)
            .collect(),
        segments,
        pressure,
    };
    debug!(
        edges = front.edges,
        active = front.segments.active,
        max_abs_pressure = front.pressure.max_abs_pressure,
        "front updated"
    );

    // STEP 2: EXPOSURE
    let exposure = exposure_by_entity(&state, &edges, &commitment, &config.pressure);
    let exposure_stats = ExposureStats::from_map(&exposure);
    debug!(
        entities = exposure_stats.nonzero_entities,
        max = exposure_stats.max_exposure,
        "exposure computed"
    );

    // STEP 3: EXHAUSTION
    let exhaustion = if !config.stages.exhaustion {
        ExhaustionOutcome {
            status: StageStatus::not_applied(NotAppliedReason::FeatureDisabled),
            by_faction: BTreeMap::new(),
        }
    } else if state.factions.is_empty() {
        ExhaustionOutcome {
            status: StageStatus::not_applied(NotAppliedReason::NoFactions),
            by_faction: BTreeMap::new(),
        }
    } else {
        ExhaustionOutcome {
            status: StageStatus::Applied,
            by_faction: update_exhaustion(
                &mut state,
                &exposure,
                &supply,
                &commitment,
                &config.exhaustion,
            ),
        }
    };

    // STEP 4: COLLAPSE GATING
    let collapse = apply_collapse_gating(&mut state, &exposure, config, turn)?;
    for event in &collapse.events {
        debug!(event = event.event_type(), "collapse event");
    }

    // STEP 5: NEGOTIATION
    let breaches = breach_candidates(&state, &edges, config.breach.threshold);
    let drivers = pressure_drivers(&state, &exhaustion.by_faction, &breaches, &supply);
    let negotiation = apply_negotiation(&mut state, &drivers, config, turn);

    // STEP 6: REPORT
    let report = TurnReport {
        turn,
        front,
        supply,
        exposure: exposure_stats,
        exhaustion,
        collapse,
        negotiation,
        formations: FormationStats::from_state(&state),
        militia: MilitiaStats::from_state(&state),
        front_edges: edges,
    };
    info!(
        collapse_eligible = report.collapse.stats.tier0.eligible.total(),
        ledger_len = report.negotiation.ledger_len,
        "turn complete"
    );

    Ok((state, report))
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Owns the game state across turns
///
/// Wraps [`run_turn`] with an event log and the post-turn operations a
/// scenario needs (scripted postures, breach resolution, capital spending).
pub struct Orchestrator {
    state: GameState,
    config: TurnConfig,
    deriver: Box<dyn FrontEdgeDeriver>,
    event_log: EventLog,
}

impl Orchestrator {
    /// Create an orchestrator using the adjacency-graph front deriver
    ///
    /// # Example
    ///
    /// ```rust
    /// use frontline_core::{Faction, FactionId, GameState, Orchestrator, TurnConfig};
    ///
    /// let state = GameState::new("seed")
    ///     .with_faction(FactionId::Rbih, Faction::with_areas(["A"]))
    ///     .with_faction(FactionId::Rs, Faction::with_areas(["B"]))
    ///     .with_adjacency("A", "B");
    ///
    /// let mut orchestrator = Orchestrator::new(state, TurnConfig::default()).unwrap();
    /// let report = orchestrator.step().unwrap();
    /// assert_eq!(report.turn, 1);
    /// assert_eq!(report.front.edges, 1);
    /// ```
    pub fn new(state: GameState, config: TurnConfig) -> Result<Self, SimulationError> {
        Self::with_deriver(state, config, Box::new(AdjacencyFrontDeriver))
    }

    pub fn with_deriver(
        state: GameState,
        config: TurnConfig,
        deriver: Box<dyn FrontEdgeDeriver>,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        validate_state(&state)?;
        Ok(Self {
            state,
            config,
            deriver,
            event_log: EventLog::new(),
        })
    }

    /// Run one turn; on error the state is left as it was
    pub fn step(&mut self) -> Result<TurnReport, SimulationError> {
        let (next, mut report) = run_turn(&self.state, &self.config, self.deriver.as_ref())?;
        self.state = next;
        self.event_log
            .extend(std::mem::take(&mut report.collapse.events));
        self.event_log
            .extend(std::mem::take(&mut report.negotiation.events));
        Ok(report)
    }

    /// Set a faction's base posture on an edge (takes effect next turn)
    pub fn set_posture(
        &mut self,
        faction: FactionId,
        edge_id: EdgeKey,
        assignment: PostureAssignment,
    ) -> Result<(), SimulationError> {
        if !self.state.factions.contains_key(&faction) {
            return Err(SimulationError::FactionNotFound(faction));
        }
        self.state
            .front_posture
            .entry(faction)
            .or_default()
            .insert(edge_id, assignment);
        Ok(())
    }

    /// Find breach candidates on `edges` and, when enabled, flip control
    pub fn resolve_breaches(&mut self, edges: &[FrontEdge]) -> BreachOutcome {
        let candidates = breach_candidates(&self.state, edges, self.config.breach.threshold);
        let mut outcome = BreachOutcome {
            candidates: candidates.len() as u32,
            applied: self.config.stages.apply_breaches,
            flips: Vec::new(),
        };
        if outcome.applied {
            outcome.flips = apply_control_flips(&mut self.state, &candidates);
            let turn = self.state.turn();
            self.event_log
                .extend(outcome.flips.iter().map(|f| f.to_event(turn)));
        }
        outcome
    }

    pub fn spend_capital(
        &mut self,
        faction: FactionId,
        amount: u32,
        reason: &str,
    ) -> Result<Option<LedgerEntry>, SimulationError> {
        spend_capital(&mut self.state, faction, amount, reason)
    }

    pub fn current_turn(&self) -> u32 {
        self.state.turn()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &TurnConfig {
        &self.config
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    pub fn into_state(self) -> GameState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Faction, Posture};

    fn two_sided() -> GameState {
        let mut rbih = Faction::with_areas(["A"]);
        rbih.supply_sources.insert("A".to_string());
        let mut rs = Faction::with_areas(["B"]);
        rs.supply_sources.insert("B".to_string());
        GameState::new("s")
            .with_faction(FactionId::Rbih, rbih)
            .with_faction(FactionId::Rs, rs)
            .with_adjacency("A", "B")
    }

    #[test]
    fn test_run_turn_does_not_touch_previous_state() {
        let state = two_sided();
        let (next, report) =
            run_turn(&state, &TurnConfig::default(), &AdjacencyFrontDeriver).unwrap();
        assert_eq!(state.turn(), 0);
        assert!(state.front_segments.is_empty());
        assert_eq!(next.turn(), 1);
        assert_eq!(report.front.segments.active, 1);
    }

    #[test]
    fn test_failed_turn_keeps_state() {
        let mut config = TurnConfig::default();
        config.stages.collapse_gating = true;
        let mut orchestrator = Orchestrator::new(two_sided(), config).unwrap();
        let err = orchestrator.step().unwrap_err();
        assert!(matches!(err, SimulationError::UnverifiedConstants { .. }));
        assert_eq!(orchestrator.current_turn(), 0);
    }

    #[test]
    fn test_sustained_push_breaches_and_flips() {
        let mut config = TurnConfig::default();
        config.stages.apply_breaches = true;
        let mut orchestrator = Orchestrator::new(two_sided(), config).unwrap();
        orchestrator
            .set_posture(
                FactionId::Rbih,
                EdgeKey::from_endpoints("A", "B"),
                PostureAssignment {
                    posture: Posture::Push,
                    weight: 10,
                },
            )
            .unwrap();

        let mut flips = Vec::new();
        for _ in 0..5 {
            let report = orchestrator.step().unwrap();
            let outcome = orchestrator.resolve_breaches(&report.front_edges);
            flips.extend(outcome.flips);
        }
        assert_eq!(flips.len(), 1);
        assert_eq!(flips[0].settlement, "B");
        assert_eq!(orchestrator.state().controller_of("B"), Some(FactionId::Rbih));
        assert_eq!(orchestrator.event_log().events_of_type("ControlFlip").len(), 1);
    }

    #[test]
    fn test_breach_candidates_drive_negotiation_pressure() {
        let mut config = TurnConfig::default();
        config.stages.exhaustion = false;
        let mut orchestrator = Orchestrator::new(two_sided(), config).unwrap();
        orchestrator
            .set_posture(
                FactionId::Rbih,
                EdgeKey::from_endpoints("A", "B"),
                PostureAssignment {
                    posture: Posture::Push,
                    weight: 10,
                },
            )
            .unwrap();

        let mut turns_with_candidates = 0;
        for _ in 0..4 {
            let report = orchestrator.step().unwrap();
            let outcome = orchestrator.resolve_breaches(&report.front_edges);
            let expected = i64::from(outcome.candidates.min(3));
            if expected > 0 {
                turns_with_candidates += 1;
            }
            for faction in [FactionId::Rbih, FactionId::Rs] {
                assert_eq!(report.negotiation.by_faction[&faction].pressure_delta, expected);
            }
        }
        assert!(turns_with_candidates > 0);
    }

    #[test]
    fn test_set_posture_rejects_absent_faction() {
        let mut orchestrator = Orchestrator::new(two_sided(), TurnConfig::default()).unwrap();
        let err = orchestrator
            .set_posture(
                FactionId::Hrhb,
                EdgeKey::from_endpoints("A", "B"),
                PostureAssignment {
                    posture: Posture::Hold,
                    weight: 1,
                },
            )
            .unwrap_err();
        assert!(matches!(err, SimulationError::FactionNotFound(FactionId::Hrhb)));
    }
}
