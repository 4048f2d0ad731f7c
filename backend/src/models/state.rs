//! Game State
//!
//! The single source of truth for one scenario run. A turn takes the
//! previous `GameState`, mutates a working copy stage by stage and returns it.
//!
//! # Critical Invariants
//!
//! 1. **Sorted iteration**: every map is a `BTreeMap`/`BTreeSet`, so any fold
//!    or report over it visits keys in id order
//! 2. **Single controller lookup**: a settlement's controller is derived from
//!    the faction areas of responsibility, never stored a second time
//! 3. **Backward-compatible saves**: every subtree except `meta` and
//!    `factions` defaults to empty when missing

use crate::core::{EdgeKey, TurnClock};
use crate::models::collapse::{CollapseOverrides, EntityEligibility, FactionEligibility};
use crate::models::faction::{Faction, FactionId};
use crate::models::formation::{Formation, MilitiaPool};
use crate::models::front::{
    CeasefireEntry, FrontPressure, FrontSegment, NegotiationStatus, PostureAssignment,
};
use crate::models::ledger::NegotiationLedger;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Save format version understood by this build
pub const SAVE_SCHEMA_VERSION: u32 = 1;

/// One undirected settlement adjacency
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GraphEdge {
    pub a: String,
    pub b: String,
}

/// Pre-computed settlement adjacency graph
///
/// Produced offline by the map data pipeline; the core only reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementGraph {
    pub edges: Vec<GraphEdge>,
}

impl SettlementGraph {
    /// Sorted neighbour lists
    pub fn adjacency(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut adj: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for edge in &self.edges {
            if edge.a == edge.b {
                continue;
            }
            adj.entry(edge.a.as_str()).or_default().push(edge.b.as_str());
            adj.entry(edge.b.as_str()).or_default().push(edge.a.as_str());
        }
        for neighbours in adj.values_mut() {
            neighbours.sort_unstable();
            neighbours.dedup();
        }
        adj
    }
}

/// Complete simulation state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub schema_version: u32,
    pub meta: TurnClock,
    pub factions: BTreeMap<FactionId, Faction>,

    #[serde(default)]
    pub settlement_graph: SettlementGraph,

    #[serde(default)]
    pub front_segments: BTreeMap<EdgeKey, FrontSegment>,
    #[serde(default)]
    pub front_pressure: BTreeMap<EdgeKey, FrontPressure>,
    /// Base posture per faction per edge, as set by scripts or players
    #[serde(default)]
    pub front_posture: BTreeMap<FactionId, BTreeMap<EdgeKey, PostureAssignment>>,

    #[serde(default)]
    pub formations: BTreeMap<String, Formation>,
    #[serde(default)]
    pub militia_pools: BTreeMap<String, MilitiaPool>,

    /// Consecutive turns each settlement has been cut off from supply
    #[serde(default)]
    pub unsupplied_streak: BTreeMap<String, u32>,

    #[serde(default)]
    pub collapse_eligibility: BTreeMap<FactionId, FactionEligibility>,
    #[serde(default)]
    pub collapse_eligibility_tier1: BTreeMap<String, EntityEligibility>,
    #[serde(default)]
    pub local_strain: BTreeMap<String, f64>,
    #[serde(default)]
    pub collapse_overrides: CollapseOverrides,

    #[serde(default)]
    pub negotiation_ledger: NegotiationLedger,
    #[serde(default)]
    pub ceasefire: BTreeMap<EdgeKey, CeasefireEntry>,
    #[serde(default)]
    pub negotiation_status: NegotiationStatus,
}

impl GameState {
    /// Empty state at turn 0
    ///
    /// # Example
    ///
    /// ```rust
    /// use frontline_core::{Faction, FactionId, GameState};
    ///
    /// let state = GameState::new("seed")
    ///     .with_faction(FactionId::Rbih, Faction::with_areas(["S1", "S2"]))
    ///     .with_faction(FactionId::Rs, Faction::with_areas(["S3"]));
    ///
    /// assert_eq!(state.controller_of("S3"), Some(FactionId::Rs));
    /// assert_eq!(state.controller_of("S9"), None);
    /// ```
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            schema_version: SAVE_SCHEMA_VERSION,
            meta: TurnClock::new(seed),
            factions: BTreeMap::new(),
            settlement_graph: SettlementGraph::default(),
            front_segments: BTreeMap::new(),
            front_pressure: BTreeMap::new(),
            front_posture: BTreeMap::new(),
            formations: BTreeMap::new(),
            militia_pools: BTreeMap::new(),
            unsupplied_streak: BTreeMap::new(),
            collapse_eligibility: BTreeMap::new(),
            collapse_eligibility_tier1: BTreeMap::new(),
            local_strain: BTreeMap::new(),
            collapse_overrides: CollapseOverrides::default(),
            negotiation_ledger: NegotiationLedger::new(),
            ceasefire: BTreeMap::new(),
            negotiation_status: NegotiationStatus::default(),
        }
    }

    pub fn with_faction(mut self, id: FactionId, faction: Faction) -> Self {
        self.factions.insert(id, faction);
        self
    }

    /// Add an undirected adjacency to the settlement graph
    pub fn with_adjacency(mut self, a: &str, b: &str) -> Self {
        self.settlement_graph.edges.push(GraphEdge {
            a: a.to_string(),
            b: b.to_string(),
        });
        self
    }

    pub fn turn(&self) -> u32 {
        self.meta.turn()
    }

    /// Settlement → controlling faction, built from areas of responsibility
    ///
    /// If two factions list the same settlement, the first faction in id
    /// order wins.
    pub fn controller_index(&self) -> BTreeMap<&str, FactionId> {
        let mut index = BTreeMap::new();
        for (id, faction) in &self.factions {
            for sid in &faction.areas_of_responsibility {
                index.entry(sid.as_str()).or_insert(*id);
            }
        }
        index
    }

    pub fn controller_of(&self, sid: &str) -> Option<FactionId> {
        self.factions
            .iter()
            .find(|(_, f)| f.controls(sid))
            .map(|(id, _)| *id)
    }

    /// Whether posture on this edge is frozen by a ceasefire this turn
    pub fn is_edge_frozen(&self, edge_id: &EdgeKey) -> bool {
        self.negotiation_status.ceasefire_active
            || self
                .ceasefire
                .get(edge_id)
                .is_some_and(|c| c.is_in_force(self.turn()))
    }

    /// Current strain of a settlement (0 when never strained)
    pub fn strain_of(&self, sid: &str) -> f64 {
        self.local_strain.get(sid).copied().unwrap_or(0.0)
    }

    /// Active formations of a faction, in formation-id order
    pub fn active_formations(&self, faction: FactionId) -> impl Iterator<Item = &Formation> {
        self.formations
            .values()
            .filter(move |f| f.faction == faction && f.is_active())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_save_defaults_optional_subtrees() {
        let json = r#"{
            "schema_version": 1,
            "meta": {"turn": 2, "seed": "x"},
            "factions": {"RS": {"areas_of_responsibility": ["S1"]}}
        }"#;
        let state: GameState = serde_json::from_str(json).unwrap();
        assert_eq!(state.turn(), 2);
        assert!(state.collapse_eligibility.is_empty());
        assert!(state.local_strain.is_empty());
        assert!(state.negotiation_ledger.is_empty());
        assert!(state.ceasefire.is_empty());
        assert_eq!(state.controller_of("S1"), Some(FactionId::Rs));
    }

    #[test]
    fn test_adjacency_is_symmetric_and_sorted() {
        let state = GameState::new("s")
            .with_adjacency("B", "A")
            .with_adjacency("A", "C")
            .with_adjacency("A", "B");
        let adj = state.settlement_graph.adjacency();
        assert_eq!(adj["A"], vec!["B", "C"]);
        assert_eq!(adj["B"], vec!["A"]);
    }

    #[test]
    fn test_controller_index_prefers_first_faction() {
        let state = GameState::new("s")
            .with_faction(FactionId::Rs, Faction::with_areas(["S1"]))
            .with_faction(FactionId::Hrhb, Faction::with_areas(["S1"]));
        assert_eq!(state.controller_index()["S1"], FactionId::Hrhb);
        assert_eq!(state.controller_of("S1"), Some(FactionId::Hrhb));
    }
}
