//! Posture commitment
//!
//! Turns each faction's base posture assignments into effective weights:
//!
//! ```text
//! effective = base_weight × friction_factor(edge) × capacity_factor(faction)
//! ```
//!
//! Only assignments on current front edges where the faction is one of the
//! sides count toward demand. Edges under a ceasefire keep their demand but
//! commit zero effective weight.

use crate::core::{round6, EdgeKey};
use crate::models::{FactionId, FrontEdge, GameState, Posture};
use crate::orchestrator::config::PressureConfig;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeCommitment {
    pub posture: Posture,
    pub base_weight: u32,
    pub friction_factor: f64,
    pub frozen: bool,
    pub effective_weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FactionCommitment {
    /// Sum of base weights on the front
    pub demand: u64,
    pub effective_total: f64,
    pub command_capacity: u32,
    pub capacity_applied: bool,
    pub capacity_factor: f64,
    pub edges: BTreeMap<EdgeKey, EdgeCommitment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommitmentReport {
    pub by_faction: BTreeMap<FactionId, FactionCommitment>,
}

impl CommitmentReport {
    pub fn edge(&self, faction: FactionId, edge_id: &EdgeKey) -> Option<&EdgeCommitment> {
        self.by_faction.get(&faction)?.edges.get(edge_id)
    }

    /// Effective weight, 0 when the faction has nothing committed there
    pub fn effective_weight(&self, faction: FactionId, edge_id: &EdgeKey) -> f64 {
        self.edge(faction, edge_id)
            .map_or(0.0, |c| c.effective_weight)
    }

    pub fn frozen_edges(&self) -> BTreeSet<&EdgeKey> {
        self.by_faction
            .values()
            .flat_map(|f| f.edges.iter())
            .filter(|(_, c)| c.frozen)
            .map(|(k, _)| k)
            .collect()
    }
}

/// Effective commitments for every faction on the given front edges
pub fn compute_commitment(
    state: &GameState,
    edges: &[FrontEdge],
    config: &PressureConfig,
) -> CommitmentReport {
    let mut report = CommitmentReport::default();

    for (faction_id, faction) in &state.factions {
        let Some(assignments) = state.front_posture.get(faction_id) else {
            continue;
        };

        let on_front: Vec<(&FrontEdge, Posture, u32)> = edges
            .iter()
            .filter(|e| e.involves(*faction_id))
            .filter_map(|e| {
                assignments
                    .get(&e.edge_id)
                    .map(|a| (e, a.posture, a.weight))
            })
            .collect();
        if on_front.is_empty() {
            continue;
        }

        let demand: u64 = on_front.iter().map(|(_, _, w)| u64::from(*w)).sum();
        let capacity = faction.command_capacity;
        let (capacity_applied, capacity_factor) =
            if capacity > 0 && demand > u64::from(capacity) {
                (true, f64::from(capacity) / demand as f64)
            } else {
                (false, 1.0)
            };

        let mut totals = FactionCommitment {
            demand,
            command_capacity: capacity,
            capacity_applied,
            capacity_factor: round6(capacity_factor),
            ..FactionCommitment::default()
        };

        for (edge, posture, weight) in on_front {
            let friction = state
                .front_segments
                .get(&edge.edge_id)
                .map_or(0, |s| s.friction);
            let friction_factor = config.friction_factor(friction);
            let frozen = state.is_edge_frozen(&edge.edge_id);
            let effective_weight = if frozen {
                0.0
            } else {
                round6(f64::from(weight) * friction_factor * capacity_factor)
            };
            totals.effective_total += effective_weight;
            totals.edges.insert(
                edge.edge_id.clone(),
                EdgeCommitment {
                    posture,
                    base_weight: weight,
                    friction_factor: round6(friction_factor),
                    frozen,
                    effective_weight,
                },
            );
        }
        totals.effective_total = round6(totals.effective_total);
        report.by_faction.insert(*faction_id, totals);
    }

    report
}
