//! Front records
//!
//! Front edges are recomputed every turn. The records in this module are
//! the persistent per-edge state that survives that recomputation, keyed by
//! the canonical [`EdgeKey`].

use crate::core::EdgeKey;
use crate::models::faction::FactionId;
use serde::{Deserialize, Serialize};

/// A derived front edge: two adjacent settlements with different controllers
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FrontEdge {
    pub edge_id: EdgeKey,
    /// Controller of `edge_id.a()`
    pub side_a: FactionId,
    /// Controller of `edge_id.b()`
    pub side_b: FactionId,
}

impl FrontEdge {
    /// Controller of the given endpoint, if it is one
    pub fn side_of(&self, sid: &str) -> Option<FactionId> {
        if self.edge_id.a() == sid {
            Some(self.side_a)
        } else if self.edge_id.b() == sid {
            Some(self.side_b)
        } else {
            None
        }
    }

    pub fn involves(&self, faction: FactionId) -> bool {
        self.side_a == faction || self.side_b == faction
    }

    /// Endpoints held by `faction` on this edge
    pub fn endpoints_of(&self, faction: FactionId) -> Vec<&str> {
        let mut out = Vec::with_capacity(2);
        if self.side_a == faction {
            out.push(self.edge_id.a());
        }
        if self.side_b == faction {
            out.push(self.edge_id.b());
        }
        out
    }
}

/// Persistent activity record of a front segment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontSegment {
    pub active: bool,
    pub created_turn: u32,
    pub since_turn: u32,
    pub last_active_turn: u32,
    pub active_streak: u32,
    pub max_active_streak: u32,
    pub friction: u32,
    pub max_friction: u32,
}

/// Persistent pressure record of a front edge
///
/// Positive `value` is an advantage for side a (the lexicographically
/// smaller settlement's controller).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontPressure {
    pub value: i64,
    pub max_abs: i64,
    pub last_updated_turn: u32,
}

/// Operational posture a faction assigns to a front edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Posture {
    Hold,
    Probe,
    Push,
}

impl Posture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Posture::Hold => "hold",
            Posture::Probe => "probe",
            Posture::Push => "push",
        }
    }
}

/// Base posture assignment (before friction and capacity)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostureAssignment {
    pub posture: Posture,
    pub weight: u32,
}

/// A ceasefire freezing one front edge
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CeasefireEntry {
    pub since_turn: u32,
    #[serde(default)]
    pub until_turn: Option<u32>,
}

impl CeasefireEntry {
    /// Whether the freeze holds on `turn`
    pub fn is_in_force(&self, turn: u32) -> bool {
        turn >= self.since_turn && self.until_turn.map_or(true, |until| turn <= until)
    }
}

/// Global negotiation status flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NegotiationStatus {
    pub ceasefire_active: bool,
    pub ceasefire_since_turn: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ceasefire_window_is_inclusive() {
        let entry = CeasefireEntry {
            since_turn: 3,
            until_turn: Some(5),
        };
        assert!(!entry.is_in_force(2));
        assert!(entry.is_in_force(3));
        assert!(entry.is_in_force(5));
        assert!(!entry.is_in_force(6));
    }

    #[test]
    fn test_open_ended_ceasefire() {
        let entry = CeasefireEntry {
            since_turn: 1,
            until_turn: None,
        };
        assert!(entry.is_in_force(1_000));
    }

    #[test]
    fn test_side_lookup() {
        let edge = FrontEdge {
            edge_id: EdgeKey::from_endpoints("S1", "S2"),
            side_a: FactionId::Rbih,
            side_b: FactionId::Rs,
        };
        assert_eq!(edge.side_of("S2"), Some(FactionId::Rs));
        assert_eq!(edge.side_of("S3"), None);
        assert_eq!(edge.endpoints_of(FactionId::Rbih), vec!["S1"]);
    }
}
