//! Per-turn scenario summary records
//!
//! Every float in a summary has already been rounded to 6 decimals, and every
//! per-faction list is in faction-id order, so identical runs serialize to
//! identical bytes.

use crate::core::round6;
use crate::models::{FactionId, GameState};
use crate::orchestrator::{
    BreachOutcome, FormationStats, MilitiaStats, StageStatus, TurnReport,
};
use serde::Serialize;
use std::collections::BTreeMap;

pub const SUMMARY_SCHEMA_VERSION: u32 = 1;
const TOP_PRESSURE_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSummary {
    pub schema: u32,
    pub turns: Vec<TurnSummary>,
}

impl Default for ScenarioSummary {
    fn default() -> Self {
        Self {
            schema: SUMMARY_SCHEMA_VERSION,
            turns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PressureEntry {
    pub edge_id: String,
    pub value: i64,
    pub abs: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExhaustionSummary {
    pub faction_id: FactionId,
    pub before: f64,
    pub after: f64,
    pub delta: f64,
    pub work_supplied: f64,
    pub work_unsupplied: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplySummary {
    pub faction_id: FactionId,
    pub controlled: u32,
    pub reachable: u32,
    pub isolated: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitmentSummary {
    pub faction_id: FactionId,
    pub effective_total: f64,
    pub capacity_limited: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NegotiationSummary {
    pub faction_id: FactionId,
    pub pressure: u32,
    pub pressure_delta: i64,
    pub capital: u32,
    pub spent_total: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CeasefireSummary {
    pub ceasefire_active: bool,
    pub frozen_edges_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollapseSummary {
    pub status: StageStatus,
    pub eligible_factions: u32,
    pub eligible_settlements: u32,
    pub max_exposure: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnSummary {
    pub turn: u32,
    pub front_edges: u32,
    pub front_segments_active: u32,
    pub formations: FormationStats,
    pub militia_pools: MilitiaStats,
    pub breach_candidates: u32,
    pub control_flips: u32,
    pub highest_abs_pressure: i64,
    pub top_pressures: Vec<PressureEntry>,
    pub exhaustion: Vec<ExhaustionSummary>,
    pub supply: Vec<SupplySummary>,
    pub commitment: Vec<CommitmentSummary>,
    pub collapse: CollapseSummary,
    pub negotiation: Vec<NegotiationSummary>,
    pub ledger_entries_total: usize,
    pub ceasefire: CeasefireSummary,
}

/// Highest absolute pressures on this turn's front edges, edge id breaking ties
pub fn top_pressures(state: &GameState, report: &TurnReport, limit: usize) -> Vec<PressureEntry> {
    let mut entries: Vec<PressureEntry> = report
        .front_edges
        .iter()
        .map(|edge| {
            let value = state
                .front_pressure
                .get(&edge.edge_id)
                .map_or(0, |p| p.value);
            PressureEntry {
                edge_id: edge.edge_id.to_string(),
                value,
                abs: value.abs(),
            }
        })
        .collect();
    entries.sort_by(|a, b| b.abs.cmp(&a.abs).then_with(|| a.edge_id.cmp(&b.edge_id)));
    entries.truncate(limit);
    entries
}

impl TurnSummary {
    /// Build from the turn report and the state after breaches were resolved
    pub fn build(report: &TurnReport, breach: &BreachOutcome, state: &GameState) -> Self {
        let top = top_pressures(state, report, TOP_PRESSURE_LIMIT);

        let exhaustion = report
            .exhaustion
            .by_faction
            .iter()
            .map(|(id, change)| ExhaustionSummary {
                faction_id: *id,
                before: change.before,
                after: change.after,
                delta: round6(change.after - change.before),
                work_supplied: change.supplied_work,
                work_unsupplied: change.unsupplied_work,
            })
            .collect();

        let supply = report
            .supply
            .by_faction
            .iter()
            .map(|(id, s)| SupplySummary {
                faction_id: *id,
                controlled: s.controlled,
                reachable: s.reachable.len() as u32,
                isolated: s.isolated.len() as u32,
            })
            .collect();

        let commitment = report
            .front
            .committed
            .iter()
            .map(|(id, total)| CommitmentSummary {
                faction_id: *id,
                effective_total: *total,
                capacity_limited: report.front.capacity_limited.contains(id),
            })
            .collect();

        let deltas: BTreeMap<FactionId, i64> = report
            .negotiation
            .by_faction
            .iter()
            .map(|(id, r)| (*id, r.pressure_delta))
            .collect();
        let negotiation = state
            .factions
            .iter()
            .map(|(id, f)| NegotiationSummary {
                faction_id: *id,
                pressure: f.negotiation.pressure,
                pressure_delta: deltas.get(id).copied().unwrap_or(0),
                capital: f.negotiation.capital,
                spent_total: f.negotiation.spent_total,
            })
            .collect();

        let stats = &report.collapse.stats;
        TurnSummary {
            turn: report.turn,
            front_edges: report.front.edges,
            front_segments_active: report.front.segments.active,
            formations: report.formations.clone(),
            militia_pools: report.militia.clone(),
            breach_candidates: breach.candidates,
            control_flips: breach.flips.len() as u32,
            highest_abs_pressure: top.first().map_or(0, |p| p.abs),
            top_pressures: top,
            exhaustion,
            supply,
            commitment,
            collapse: CollapseSummary {
                status: report.collapse.status,
                eligible_factions: stats.tier0.eligible.total(),
                eligible_settlements: stats.tier1.eligible.total(),
                max_exposure: report.exposure.max_exposure,
            },
            negotiation,
            ledger_entries_total: state.negotiation_ledger.len(),
            ceasefire: CeasefireSummary {
                ceasefire_active: state.negotiation_status.ceasefire_active,
                frozen_edges_count: report.front.frozen_edges,
            },
        }
    }
}
