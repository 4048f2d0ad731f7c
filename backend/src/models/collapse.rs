//! Collapse eligibility records
//!
//! Each (actor, domain) pair is a small state machine:
//!
//! ```text
//! BelowThreshold ──qualifying──▶ Persisting{turns} ──turns ≥ required
//!        ▲                              │            && coherent──▶ Eligible{turns}
//!        └────────── not qualifying ────┴──────────────────────────────┘
//! ```
//!
//! Eligibility is only reachable through [`DomainGate::advance`], which
//! checks the persistence requirement, so an `Eligible` state always carries
//! a counter that reached the requirement.

use crate::models::faction::FactionId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Collapse domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Authority,
    Cohesion,
    Spatial,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Authority, Domain::Cohesion, Domain::Spatial];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Authority => "authority",
            Domain::Cohesion => "cohesion",
            Domain::Spatial => "spatial",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-domain gate state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DomainGate {
    #[default]
    BelowThreshold,
    Persisting {
        turns: u32,
    },
    Eligible {
        turns: u32,
    },
}

impl DomainGate {
    /// Consecutive qualifying turns counted so far
    pub fn persistence(&self) -> u32 {
        match self {
            DomainGate::BelowThreshold => 0,
            DomainGate::Persisting { turns } | DomainGate::Eligible { turns } => *turns,
        }
    }

    pub fn is_eligible(&self) -> bool {
        matches!(self, DomainGate::Eligible { .. })
    }

    /// One turn of the gate state machine
    ///
    /// * `qualifying` - the upstream signal (exhaustion or strain, plus any
    ///   tier prerequisite) is above threshold this turn
    /// * `suppressed` - the increment is paused; the eligibility check still
    ///   runs on the current counter
    /// * `coherent` - corroborating degradation check, evaluated only once
    ///   the counter meets `required`
    pub fn advance(
        self,
        qualifying: bool,
        suppressed: bool,
        required: u32,
        coherent: impl FnOnce() -> bool,
    ) -> DomainGate {
        if !qualifying {
            return DomainGate::BelowThreshold;
        }

        let turns = if suppressed {
            self.persistence()
        } else {
            self.persistence().saturating_add(1)
        };

        if turns >= required && coherent() {
            DomainGate::Eligible { turns }
        } else if turns == 0 {
            DomainGate::BelowThreshold
        } else {
            DomainGate::Persisting { turns }
        }
    }
}

/// The three domain gates of one actor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainGates {
    pub authority: DomainGate,
    pub cohesion: DomainGate,
    pub spatial: DomainGate,
}

impl DomainGates {
    pub fn get(&self, domain: Domain) -> DomainGate {
        match domain {
            Domain::Authority => self.authority,
            Domain::Cohesion => self.cohesion,
            Domain::Spatial => self.spatial,
        }
    }

    pub fn set(&mut self, domain: Domain, gate: DomainGate) {
        match domain {
            Domain::Authority => self.authority = gate,
            Domain::Cohesion => self.cohesion = gate,
            Domain::Spatial => self.spatial = gate,
        }
    }

    pub fn any_eligible(&self) -> bool {
        Domain::ALL.iter().any(|d| self.get(*d).is_eligible())
    }

    pub fn eligible_count(&self) -> u32 {
        Domain::ALL
            .iter()
            .filter(|d| self.get(**d).is_eligible())
            .count() as u32
    }
}

/// Tier-0 (faction-level) eligibility record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactionEligibility {
    pub domains: DomainGates,
    pub suppressed: bool,
    pub immune: bool,
    pub last_updated_turn: u32,
}

/// Tier-1 (settlement-level) eligibility record
///
/// Faction affiliation is not stored; it is re-derived every turn from the
/// current areas of responsibility.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityEligibility {
    pub domains: DomainGates,
    pub suppressed: bool,
    pub immune: bool,
}

/// Externally managed suppression and immunity sets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollapseOverrides {
    pub suppressed_factions: BTreeSet<FactionId>,
    pub immune_factions: BTreeSet<FactionId>,
    pub suppressed_entities: BTreeSet<String>,
    pub immune_entities: BTreeSet<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_reaches_eligibility_on_required_turn() {
        let mut gate = DomainGate::BelowThreshold;
        for expected in 1..=2 {
            gate = gate.advance(true, false, 3, || true);
            assert_eq!(gate, DomainGate::Persisting { turns: expected });
        }
        gate = gate.advance(true, false, 3, || true);
        assert_eq!(gate, DomainGate::Eligible { turns: 3 });
    }

    #[test]
    fn test_gate_resets_when_not_qualifying() {
        let gate = DomainGate::Eligible { turns: 5 };
        assert_eq!(
            gate.advance(false, true, 3, || true),
            DomainGate::BelowThreshold
        );
    }

    #[test]
    fn test_coherence_blocks_eligibility_but_keeps_counting() {
        let gate = DomainGate::Persisting { turns: 4 };
        assert_eq!(
            gate.advance(true, false, 3, || false),
            DomainGate::Persisting { turns: 5 }
        );
    }

    #[test]
    fn test_coherence_not_evaluated_before_requirement() {
        let gate = DomainGate::BelowThreshold.advance(true, false, 3, || {
            panic!("coherence must not be evaluated early")
        });
        assert_eq!(gate, DomainGate::Persisting { turns: 1 });
    }

    #[test]
    fn test_suppression_freezes_counter_but_allows_eligibility() {
        let frozen = DomainGate::Persisting { turns: 2 }.advance(true, true, 3, || true);
        assert_eq!(frozen, DomainGate::Persisting { turns: 2 });

        let standing = DomainGate::Persisting { turns: 3 }.advance(true, true, 3, || true);
        assert_eq!(standing, DomainGate::Eligible { turns: 3 });
    }

    #[test]
    fn test_gate_serializes_tagged() {
        let json = serde_json::to_string(&DomainGate::Eligible { turns: 3 }).unwrap();
        assert_eq!(json, r#"{"state":"eligible","turns":3}"#);
        let below: DomainGate = serde_json::from_str(r#"{"state":"below_threshold"}"#).unwrap();
        assert_eq!(below, DomainGate::BelowThreshold);
    }
}
