//! Front lines
//!
//! Everything that happens on the contact line before exposure is computed:
//! deriving the front edges, syncing their persistent segment records,
//! turning base postures into effective commitments, and accumulating
//! per-edge pressure. Breach resolution lives here too but runs outside the
//! turn pipeline.

pub mod breach;
pub mod commitment;
pub mod pressure;
pub mod segments;

use crate::core::EdgeKey;
use crate::models::{FrontEdge, GameState};
use tracing::warn;

pub use breach::{apply_control_flips, breach_candidates, BreachCandidate, ControlFlip};
pub use commitment::{compute_commitment, CommitmentReport, EdgeCommitment, FactionCommitment};
pub use pressure::{accumulate_front_pressure, FrontPressureStats};
pub use segments::{sync_segments, SegmentStats};

/// Source of the current front edges
///
/// Front derivation depends on the map data pipeline; the turn pipeline only
/// needs the resulting edge list. Implementations must return edges sorted by
/// `edge_id` with no duplicates.
pub trait FrontEdgeDeriver {
    fn derive(&self, state: &GameState) -> Vec<FrontEdge>;
}

/// Derives front edges from the save's settlement adjacency graph
///
/// An adjacency is a front edge when both endpoints have a controller and
/// the controllers differ. Adjacencies touching an uncontrolled settlement
/// are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdjacencyFrontDeriver;

impl FrontEdgeDeriver for AdjacencyFrontDeriver {
    fn derive(&self, state: &GameState) -> Vec<FrontEdge> {
        let controllers = state.controller_index();
        let mut edges: Vec<FrontEdge> = Vec::new();

        for adjacency in &state.settlement_graph.edges {
            if adjacency.a == adjacency.b {
                continue;
            }
            let key = EdgeKey::from_endpoints(&adjacency.a, &adjacency.b);
            let (Some(side_a), Some(side_b)) = (
                controllers.get(key.a()).copied(),
                controllers.get(key.b()).copied(),
            ) else {
                warn!(edge_id = %key, "skipping adjacency with uncontrolled endpoint");
                continue;
            };
            if side_a != side_b {
                edges.push(FrontEdge {
                    edge_id: key,
                    side_a,
                    side_b,
                });
            }
        }

        edges.sort();
        edges.dedup_by(|x, y| x.edge_id == y.edge_id);
        edges
    }
}

/// Fixed edge list, for callers that derive fronts elsewhere
#[derive(Debug, Clone, Default)]
pub struct StaticFrontDeriver {
    edges: Vec<FrontEdge>,
}

impl StaticFrontDeriver {
    pub fn new(mut edges: Vec<FrontEdge>) -> Self {
        edges.sort();
        edges.dedup_by(|x, y| x.edge_id == y.edge_id);
        Self { edges }
    }
}

impl FrontEdgeDeriver for StaticFrontDeriver {
    fn derive(&self, _state: &GameState) -> Vec<FrontEdge> {
        self.edges.clone()
    }
}
