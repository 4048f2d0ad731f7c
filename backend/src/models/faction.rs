//! Factions: the political sides of the conflict
//!
//! The faction set is closed. Every map keyed by [`FactionId`] is a
//! `BTreeMap`, so iteration order is the id order (`HRHB < RBiH < RS`).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a faction id string is not one of the known sides
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown faction id: {0}")]
pub struct UnknownFactionId(pub String);

/// Closed set of faction ids
///
/// Variant order matches the lexicographic order of the string ids, so the
/// derived `Ord` is the same order a sorted string key would produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FactionId {
    Hrhb,
    Rbih,
    Rs,
}

impl FactionId {
    pub const ALL: [FactionId; 3] = [FactionId::Hrhb, FactionId::Rbih, FactionId::Rs];

    pub fn as_str(&self) -> &'static str {
        match self {
            FactionId::Hrhb => "HRHB",
            FactionId::Rbih => "RBiH",
            FactionId::Rs => "RS",
        }
    }
}

impl fmt::Display for FactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FactionId {
    type Err = UnknownFactionId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FactionId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownFactionId(s.to_string()))
    }
}

// String form on the wire so the id also works as a JSON object key
impl Serialize for FactionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FactionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Bounded political/military profile of a faction (each value 0..=100)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorityProfile {
    pub authority: f64,
    pub legitimacy: f64,
    pub control: f64,
    pub logistics: f64,
    pub exhaustion: f64,
}

impl Default for AuthorityProfile {
    fn default() -> Self {
        Self {
            authority: 50.0,
            legitimacy: 50.0,
            control: 50.0,
            logistics: 50.0,
            exhaustion: 0.0,
        }
    }
}

/// Negotiation standing of a faction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NegotiationRecord {
    pub pressure: u32,
    pub capital: u32,
    pub spent_total: u32,
    pub last_change_turn: Option<u32>,
}

/// A faction's mutable per-run state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Faction {
    #[serde(default)]
    pub profile: AuthorityProfile,

    /// Settlements this faction controls (its area of responsibility)
    #[serde(default)]
    pub areas_of_responsibility: BTreeSet<String>,

    /// Declared supply-source settlements
    #[serde(default)]
    pub supply_sources: BTreeSet<String>,

    #[serde(default)]
    pub negotiation: NegotiationRecord,

    /// Posture weight the faction can sustain before commitments are scaled
    /// down (0 means unlimited)
    #[serde(default)]
    pub command_capacity: u32,
}

impl Faction {
    /// Create a faction controlling the given settlements
    pub fn with_areas<I, S>(areas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            areas_of_responsibility: areas.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn controls(&self, sid: &str) -> bool {
        self.areas_of_responsibility.contains(sid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_faction_id_order_matches_string_order() {
        let mut ids: Vec<&str> = FactionId::ALL.iter().map(|f| f.as_str()).collect();
        ids.sort();
        let typed: Vec<&str> = {
            let mut t = FactionId::ALL.to_vec();
            t.sort();
            t.iter().map(|f| f.as_str()).collect()
        };
        assert_eq!(ids, typed);
    }

    #[test]
    fn test_faction_id_works_as_json_key() {
        let mut map = BTreeMap::new();
        map.insert(FactionId::Rs, 1);
        map.insert(FactionId::Rbih, 2);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"RBiH":2,"RS":1}"#);
        let back: BTreeMap<FactionId, i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn test_unknown_faction_is_rejected() {
        assert_eq!(
            "JNA".parse::<FactionId>(),
            Err(UnknownFactionId("JNA".to_string()))
        );
    }
}
