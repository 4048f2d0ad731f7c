//! Exhaustion Accumulator
//!
//! Once per turn, each faction's exhaustion moves by
//!
//! ```text
//! delta = supplied_rate × supplied_work
//!       + unsupplied_rate × unsupplied_work
//!       + commitment_rate × effective_commitment
//! ```
//!
//! where the work terms are the exposure of the faction's settlements split
//! by supply reachability. A faction with no work at all recovers by the
//! configured quiet-turn amount. The result is clamped to `0..=ceiling`.

use crate::core::round6;
use crate::front::CommitmentReport;
use crate::models::{FactionId, GameState};
use crate::orchestrator::config::ExhaustionConfig;
use crate::supply::SupplyReport;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExhaustionChange {
    pub before: f64,
    pub after: f64,
    pub supplied_work: f64,
    pub unsupplied_work: f64,
    pub commitment: f64,
}

pub fn update_exhaustion(
    state: &mut GameState,
    exposure: &BTreeMap<String, f64>,
    supply: &SupplyReport,
    commitment: &CommitmentReport,
    config: &ExhaustionConfig,
) -> BTreeMap<FactionId, ExhaustionChange> {
    let mut work: BTreeMap<FactionId, (f64, f64)> = BTreeMap::new();
    {
        let controllers = state.controller_index();
        for (sid, value) in exposure {
            let Some(faction) = controllers.get(sid.as_str()).copied() else {
                continue;
            };
            let entry = work.entry(faction).or_insert((0.0, 0.0));
            if supply.is_reachable(faction, sid) {
                entry.0 += value;
            } else {
                entry.1 += value;
            }
        }
    }

    let mut changes = BTreeMap::new();
    for (faction_id, faction) in state.factions.iter_mut() {
        let (supplied_work, unsupplied_work) = work.get(faction_id).copied().unwrap_or((0.0, 0.0));
        let committed = commitment
            .by_faction
            .get(faction_id)
            .map_or(0.0, |c| c.effective_total);

        let mut delta = config.supplied_rate * supplied_work
            + config.unsupplied_rate * unsupplied_work
            + config.commitment_rate * committed;
        if supplied_work + unsupplied_work == 0.0 && committed == 0.0 {
            delta -= config.recovery_per_quiet_turn;
        }

        let before = faction.profile.exhaustion;
        let after = round6((before + round6(delta)).clamp(0.0, config.ceiling));
        faction.profile.exhaustion = after;

        debug!(faction = %faction_id, before, after, "exhaustion updated");
        changes.insert(
            *faction_id,
            ExhaustionChange {
                before,
                after,
                supplied_work: round6(supplied_work),
                unsupplied_work: round6(unsupplied_work),
                commitment: committed,
            },
        );
    }
    changes
}
