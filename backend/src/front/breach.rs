//! Breaches and control flips
//!
//! A breach candidate is an active, unfrozen front edge whose absolute
//! pressure reached the breach threshold. Resolving a breach hands the
//! disadvantaged endpoint to the advantaged side. This runs after a turn
//! completes, never inside the turn pipeline.

use crate::core::EdgeKey;
use crate::models::{Event, FactionId, FrontEdge, GameState};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreachCandidate {
    pub edge_id: EdgeKey,
    pub pressure: i64,
    pub winner: FactionId,
    pub loser: FactionId,
    /// Endpoint held by the loser
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlFlip {
    pub settlement: String,
    pub from: FactionId,
    pub to: FactionId,
    pub edge_id: EdgeKey,
}

impl ControlFlip {
    pub fn to_event(&self, turn: u32) -> Event {
        Event::ControlFlip {
            turn,
            settlement: self.settlement.clone(),
            from: self.from,
            to: self.to,
            edge_id: self.edge_id.to_string(),
        }
    }
}

/// Breach candidates in edge order
pub fn breach_candidates(
    state: &GameState,
    edges: &[FrontEdge],
    threshold: i64,
) -> Vec<BreachCandidate> {
    edges
        .iter()
        .filter(|e| {
            state
                .front_segments
                .get(&e.edge_id)
                .is_some_and(|s| s.active)
                && !state.is_edge_frozen(&e.edge_id)
        })
        .filter_map(|e| {
            let pressure = state.front_pressure.get(&e.edge_id)?.value;
            if pressure == 0 || pressure.abs() < threshold {
                return None;
            }
            let (winner, loser, target) = if pressure > 0 {
                (e.side_a, e.side_b, e.edge_id.b())
            } else {
                (e.side_b, e.side_a, e.edge_id.a())
            };
            Some(BreachCandidate {
                edge_id: e.edge_id.clone(),
                pressure,
                winner,
                loser,
                target: target.to_string(),
            })
        })
        .collect()
}

/// Resolve candidates into control changes
///
/// Candidates are applied in order. A settlement flips at most once, and only
/// while the loser still holds it.
pub fn apply_control_flips(
    state: &mut GameState,
    candidates: &[BreachCandidate],
) -> Vec<ControlFlip> {
    let mut flipped: BTreeSet<String> = BTreeSet::new();
    let mut flips = Vec::new();

    for candidate in candidates {
        if flipped.contains(&candidate.target)
            || state.controller_of(&candidate.target) != Some(candidate.loser)
            || !state.factions.contains_key(&candidate.winner)
        {
            continue;
        }

        if let Some(loser) = state.factions.get_mut(&candidate.loser) {
            loser.areas_of_responsibility.remove(&candidate.target);
            loser.supply_sources.remove(&candidate.target);
        }
        if let Some(winner) = state.factions.get_mut(&candidate.winner) {
            winner
                .areas_of_responsibility
                .insert(candidate.target.clone());
        }

        info!(
            settlement = %candidate.target,
            from = %candidate.loser,
            to = %candidate.winner,
            edge_id = %candidate.edge_id,
            "control flip"
        );
        flipped.insert(candidate.target.clone());
        flips.push(ControlFlip {
            settlement: candidate.target.clone(),
            from: candidate.loser,
            to: candidate.winner,
            edge_id: candidate.edge_id.clone(),
        });
    }

    flips
}
