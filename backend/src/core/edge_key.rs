//! Canonical front-edge identifiers
//!
//! A front edge is an unordered pair of settlements. Its identity is the
//! string `a__b` where `a < b` lexicographically. Persistent per-edge
//! records (activity, pressure, ceasefire) are keyed by this string so they
//! survive the per-turn recomputation of the edge set.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

const SEPARATOR: &str = "__";

/// Errors raised while parsing an edge id
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EdgeKeyError {
    #[error("Invalid edge_id: {0} (expected a__b)")]
    Malformed(String),

    #[error("Invalid edge_id: {0} (expected canonical a__b with a < b)")]
    NotCanonical(String),
}

/// Canonical key of an unordered settlement pair
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeKey {
    a: String,
    b: String,
}

impl EdgeKey {
    /// Build a key from two endpoints in any order
    ///
    /// # Example
    /// ```
    /// use frontline_core::EdgeKey;
    ///
    /// let key = EdgeKey::from_endpoints("S200", "S100");
    /// assert_eq!(key.as_string(), "S100__S200");
    /// ```
    pub fn from_endpoints(x: &str, y: &str) -> Self {
        if x <= y {
            Self {
                a: x.to_string(),
                b: y.to_string(),
            }
        } else {
            Self {
                a: y.to_string(),
                b: x.to_string(),
            }
        }
    }

    /// Parse a strictly canonical id (`a__b`, both non-empty, `a < b`)
    ///
    /// Non-canonical ordering is rejected rather than normalized: scripts
    /// and saves must already carry canonical ids.
    pub fn parse_canonical(raw: &str) -> Result<Self, EdgeKeyError> {
        let mut parts = raw.split(SEPARATOR);
        let (a, b) = match (parts.next(), parts.next(), parts.next()) {
            (Some(a), Some(b), None) if !a.is_empty() && !b.is_empty() => (a, b),
            _ => return Err(EdgeKeyError::Malformed(raw.to_string())),
        };
        if a >= b {
            return Err(EdgeKeyError::NotCanonical(raw.to_string()));
        }
        Ok(Self {
            a: a.to_string(),
            b: b.to_string(),
        })
    }

    /// Lexicographically smaller endpoint
    pub fn a(&self) -> &str {
        &self.a
    }

    /// Lexicographically larger endpoint
    pub fn b(&self) -> &str {
        &self.b
    }

    /// True when `sid` is one of the two endpoints
    pub fn touches(&self, sid: &str) -> bool {
        self.a == sid || self.b == sid
    }

    pub fn as_string(&self) -> String {
        format!("{}{}{}", self.a, SEPARATOR, self.b)
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.a, SEPARATOR, self.b)
    }
}

impl Serialize for EdgeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EdgeKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        EdgeKey::parse_canonical(&raw).map_err(serde::de::Error::custom)
    }
}
