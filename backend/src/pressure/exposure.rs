//! Per-settlement pressure exposure
//!
//! For every active front edge, each endpoint accrues
//!
//! ```text
//! |pressure(edge)| × effective_weight(controller, edge) × exposure_multiplier(posture)
//! ```
//!
//! The computation is a pure function of its inputs. The result covers every
//! endpoint of an active edge, including those with zero exposure.

use crate::core::round6;
use crate::front::CommitmentReport;
use crate::models::{FrontEdge, GameState};
use crate::orchestrator::config::PressureConfig;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExposureStats {
    pub entities: u32,
    pub nonzero_entities: u32,
    pub total_exposure: f64,
    pub max_exposure: f64,
}

impl ExposureStats {
    pub fn from_map(exposure: &BTreeMap<String, f64>) -> Self {
        let nonzero: Vec<f64> = exposure.values().copied().filter(|v| *v > 0.0).collect();
        Self {
            entities: exposure.len() as u32,
            nonzero_entities: nonzero.len() as u32,
            total_exposure: round6(nonzero.iter().sum()),
            max_exposure: nonzero.iter().copied().fold(0.0, f64::max),
        }
    }
}

pub fn exposure_by_entity(
    state: &GameState,
    active_front_edges: &[FrontEdge],
    commitment: &CommitmentReport,
    config: &PressureConfig,
) -> BTreeMap<String, f64> {
    let mut exposure: BTreeMap<String, f64> = BTreeMap::new();

    for edge in active_front_edges {
        let active = state
            .front_segments
            .get(&edge.edge_id)
            .is_some_and(|s| s.active);
        if !active {
            continue;
        }
        let magnitude = state
            .front_pressure
            .get(&edge.edge_id)
            .map_or(0, |p| p.value.abs()) as f64;

        for (sid, side) in [
            (edge.edge_id.a(), edge.side_a),
            (edge.edge_id.b(), edge.side_b),
        ] {
            let contribution = commitment.edge(side, &edge.edge_id).map_or(0.0, |c| {
                magnitude * c.effective_weight * config.exposure_multiplier(c.posture)
            });
            *exposure.entry(sid.to_string()).or_insert(0.0) += contribution;
        }
    }

    for value in exposure.values_mut() {
        *value = round6(value.max(0.0));
    }
    exposure
}
