//! Supply reachability and siege tracking
//!
//! A settlement is supplied when a path of settlements controlled by the
//! same faction connects it to one of that faction's declared supply
//! sources. Isolated settlements accumulate an unsupplied streak; a long
//! enough streak is a sustained siege for negotiation purposes.

use crate::models::{FactionId, GameState};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FactionSupply {
    pub controlled: u32,
    pub reachable: BTreeSet<String>,
    pub isolated: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SupplyReport {
    pub by_faction: BTreeMap<FactionId, FactionSupply>,
}

impl SupplyReport {
    pub fn is_reachable(&self, faction: FactionId, sid: &str) -> bool {
        self.by_faction
            .get(&faction)
            .is_some_and(|s| s.reachable.contains(sid))
    }

    pub fn isolated_total(&self) -> u32 {
        self.by_faction.values().map(|s| s.isolated.len() as u32).sum()
    }
}

/// Breadth-first reachability from each faction's controlled supply sources
pub fn compute_reachability(state: &GameState) -> SupplyReport {
    let adjacency = state.settlement_graph.adjacency();
    let mut report = SupplyReport::default();

    for (faction_id, faction) in &state.factions {
        let controlled = &faction.areas_of_responsibility;
        let mut reachable: BTreeSet<String> = BTreeSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();

        for source in faction.supply_sources.iter().filter(|s| controlled.contains(*s)) {
            if reachable.insert(source.clone()) {
                queue.push_back(source.as_str());
            }
        }

        while let Some(current) = queue.pop_front() {
            let Some(neighbours) = adjacency.get(current) else {
                continue;
            };
            for next in neighbours {
                if controlled.contains(*next) && reachable.insert((*next).to_string()) {
                    queue.push_back(*next);
                }
            }
        }

        let isolated: BTreeSet<String> = controlled
            .iter()
            .filter(|sid| !reachable.contains(*sid))
            .cloned()
            .collect();

        debug!(
            faction = %faction_id,
            controlled = controlled.len(),
            reachable = reachable.len(),
            isolated = isolated.len(),
            "supply reachability"
        );

        report.by_faction.insert(
            *faction_id,
            FactionSupply {
                controlled: controlled.len() as u32,
                reachable,
                isolated,
            },
        );
    }

    report
}

/// Advance unsupplied streaks from this turn's reachability
///
/// Settlements no longer controlled by anyone drop out of the map.
pub fn update_siege_streaks(state: &mut GameState, report: &SupplyReport) {
    let mut next: BTreeMap<String, u32> = BTreeMap::new();
    for supply in report.by_faction.values() {
        for sid in &supply.isolated {
            let streak = state.unsupplied_streak.get(sid).copied().unwrap_or(0);
            next.insert(sid.clone(), streak + 1);
        }
    }
    state.unsupplied_streak = next;
}

/// Controlled settlements of `faction` isolated for at least `min_turns`
pub fn sustained_sieges(state: &GameState, faction: FactionId, min_turns: u32) -> u32 {
    let Some(f) = state.factions.get(&faction) else {
        return 0;
    };
    f.areas_of_responsibility
        .iter()
        .filter(|sid| {
            state
                .unsupplied_streak
                .get(*sid)
                .is_some_and(|streak| *streak >= min_turns)
        })
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Faction;

    fn corridor() -> GameState {
        let mut rbih = Faction::with_areas(["A", "B", "D"]);
        rbih.supply_sources.insert("A".to_string());
        GameState::new("s")
            .with_faction(FactionId::Rbih, rbih)
            .with_faction(FactionId::Rs, Faction::with_areas(["C"]))
            .with_adjacency("A", "B")
            .with_adjacency("B", "C")
            .with_adjacency("C", "D")
    }

    #[test]
    fn test_enemy_settlement_blocks_supply() {
        let report = compute_reachability(&corridor());
        let rbih = &report.by_faction[&FactionId::Rbih];
        assert_eq!(rbih.controlled, 3);
        assert!(rbih.reachable.contains("B"));
        assert_eq!(rbih.isolated.iter().collect::<Vec<_>>(), vec!["D"]);

        // RS declared no sources
        assert_eq!(report.by_faction[&FactionId::Rs].isolated.len(), 1);
    }

    #[test]
    fn test_uncontrolled_source_is_ignored() {
        let mut state = corridor();
        if let Some(rs) = state.factions.get_mut(&FactionId::Rs) {
            rs.supply_sources.insert("A".to_string());
        }
        let report = compute_reachability(&state);
        assert!(report.by_faction[&FactionId::Rs].reachable.is_empty());
    }

    #[test]
    fn test_siege_streak_accumulates_and_resets() {
        let mut state = corridor();
        for _ in 0..3 {
            let report = compute_reachability(&state);
            update_siege_streaks(&mut state, &report);
        }
        assert_eq!(state.unsupplied_streak["D"], 3);
        assert_eq!(sustained_sieges(&state, FactionId::Rbih, 3), 1);

        state.settlement_graph.edges.clear();
        let mut state = state.with_adjacency("A", "D");
        let report = compute_reachability(&state);
        update_siege_streaks(&mut state, &report);
        assert!(!state.unsupplied_streak.contains_key("D"));
    }
}
