//! Front pressure accumulation
//!
//! Each active, unfrozen front edge moves by the difference of the two
//! sides' integer intents:
//!
//! ```text
//! intent_x = effective_weight_x × intent_multiplier(posture_x)   (halved if unsupplied)
//! delta    = clamp(floor(intent_a) − floor(intent_b), −max, max)
//! ```
//!
//! Positive pressure is an advantage for side a.

use crate::front::commitment::CommitmentReport;
use crate::models::{FactionId, FrontEdge, FrontPressure, GameState};
use crate::orchestrator::config::PressureConfig;
use crate::supply::SupplyReport;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrontPressureStats {
    pub edges_updated: u32,
    pub edges_frozen: u32,
    pub total_abs_pressure: i64,
    pub max_abs_pressure: i64,
}

fn side_intent(
    edge: &FrontEdge,
    side: FactionId,
    commitment: &CommitmentReport,
    supply: &SupplyReport,
    config: &PressureConfig,
) -> i64 {
    let Some(committed) = commitment.edge(side, &edge.edge_id) else {
        return 0;
    };
    let mut intent = committed.effective_weight * config.intent_multiplier(committed.posture);
    if config.halve_unsupplied_intent
        && !edge
            .endpoints_of(side)
            .iter()
            .any(|sid| supply.is_reachable(side, sid))
    {
        intent *= 0.5;
    }
    intent.floor() as i64
}

/// Apply one turn of pressure change to every active front edge
pub fn accumulate_front_pressure(
    state: &mut GameState,
    edges: &[FrontEdge],
    commitment: &CommitmentReport,
    supply: &SupplyReport,
    config: &PressureConfig,
    turn: u32,
) -> FrontPressureStats {
    let mut stats = FrontPressureStats::default();

    for edge in edges {
        let active = state
            .front_segments
            .get(&edge.edge_id)
            .is_some_and(|s| s.active);
        if !active {
            continue;
        }
        if state.is_edge_frozen(&edge.edge_id) {
            stats.edges_frozen += 1;
            continue;
        }

        let intent_a = side_intent(edge, edge.side_a, commitment, supply, config);
        let intent_b = side_intent(edge, edge.side_b, commitment, supply, config);
        let max = config.max_delta_per_turn;
        let delta = (intent_a - intent_b).clamp(-max, max);

        let record = state
            .front_pressure
            .entry(edge.edge_id.clone())
            .or_insert_with(FrontPressure::default);
        record.value += delta;
        record.max_abs = record.max_abs.max(record.value.abs());
        record.last_updated_turn = turn;
        stats.edges_updated += 1;
    }

    for edge in edges {
        if let Some(record) = state.front_pressure.get(&edge.edge_id) {
            stats.total_abs_pressure += record.value.abs();
            stats.max_abs_pressure = stats.max_abs_pressure.max(record.value.abs());
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EdgeKey;
    use crate::front::commitment::compute_commitment;
    use crate::front::segments::sync_segments;
    use crate::models::{Faction, Posture, PostureAssignment};
    use crate::supply::compute_reachability;
    use std::collections::BTreeMap;

    fn contested(rbih_supplied: bool) -> (GameState, Vec<FrontEdge>) {
        let mut rbih = Faction::with_areas(["A"]);
        if rbih_supplied {
            rbih.supply_sources.insert("A".to_string());
        }
        let mut state = GameState::new("s")
            .with_faction(FactionId::Rbih, rbih)
            .with_faction(FactionId::Rs, Faction::with_areas(["B"]))
            .with_adjacency("A", "B");
        let key = EdgeKey::from_endpoints("A", "B");
        let mut posture = BTreeMap::new();
        posture.insert(
            key.clone(),
            PostureAssignment {
                posture: Posture::Push,
                weight: 20,
            },
        );
        state.front_posture.insert(FactionId::Rbih, posture);
        let edges = vec![FrontEdge {
            edge_id: key,
            side_a: FactionId::Rbih,
            side_b: FactionId::Rs,
        }];
        (state, edges)
    }

    fn step(state: &mut GameState, edges: &[FrontEdge], turn: u32) -> FrontPressureStats {
        let config = PressureConfig::default();
        sync_segments(state, edges, turn);
        let commitment = compute_commitment(state, edges, &config);
        let supply = compute_reachability(state);
        accumulate_front_pressure(state, edges, &commitment, &supply, &config, turn)
    }

    #[test]
    fn test_delta_is_clamped() {
        let (mut state, edges) = contested(true);
        // 20 × 0.95 × 2 = 38, clamped to 10
        step(&mut state, &edges, 1);
        let record = &state.front_pressure[&edges[0].edge_id];
        assert_eq!(record.value, 10);
        assert_eq!(record.max_abs, 10);
        assert_eq!(record.last_updated_turn, 1);
    }

    #[test]
    fn test_unsupplied_side_pushes_at_half_intent() {
        let (mut state, edges) = contested(false);
        if let Some(assignments) = state.front_posture.get_mut(&FactionId::Rbih) {
            if let Some(a) = assignments.get_mut(&edges[0].edge_id) {
                a.weight = 4;
            }
        }
        // 4 × 0.95 × 2 = 7.6, halved 3.8, floor 3
        let stats = step(&mut state, &edges, 1);
        assert_eq!(state.front_pressure[&edges[0].edge_id].value, 3);
        assert_eq!(stats.max_abs_pressure, 3);
    }

    #[test]
    fn test_global_ceasefire_freezes_pressure() {
        let (mut state, edges) = contested(true);
        state.negotiation_status.ceasefire_active = true;
        let stats = step(&mut state, &edges, 1);
        assert_eq!(stats.edges_frozen, 1);
        assert!(state.front_pressure.is_empty());
    }
}
