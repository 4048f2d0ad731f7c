//! Turn bookkeeping for the simulation
//!
//! The simulation advances in discrete turns (one turn = one week of
//! campaign time). There is no wall-clock time anywhere in the core; the
//! turn number and the scenario seed are the only world-level metadata.

use serde::{Deserialize, Serialize};

/// World-level turn counter plus the scenario seed
///
/// # Example
/// ```
/// use frontline_core::TurnClock;
///
/// let mut clock = TurnClock::new("seed-1992");
/// assert_eq!(clock.turn(), 0);
///
/// clock.advance();
/// assert_eq!(clock.turn(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnClock {
    /// Turns elapsed since scenario start
    turn: u32,
    /// Deterministic scenario seed (opaque, never used as a clock)
    #[serde(default)]
    seed: String,
}

impl TurnClock {
    /// Create a clock at turn 0
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            turn: 0,
            seed: seed.into(),
        }
    }

    /// Create a clock positioned at an arbitrary turn (used when loading saves)
    pub fn at_turn(turn: u32, seed: impl Into<String>) -> Self {
        Self {
            turn,
            seed: seed.into(),
        }
    }

    /// Advance by exactly one turn and return the new turn number
    pub fn advance(&mut self) -> u32 {
        self.turn += 1;
        self.turn
    }

    /// Current turn
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Scenario seed
    pub fn seed(&self) -> &str {
        &self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_is_monotonic() {
        let mut clock = TurnClock::at_turn(7, "s");
        assert_eq!(clock.advance(), 8);
        assert_eq!(clock.advance(), 9);
        assert_eq!(clock.seed(), "s");
    }

    #[test]
    fn test_missing_seed_defaults_to_empty() {
        let clock: TurnClock = serde_json::from_str(r#"{"turn": 3}"#).unwrap();
        assert_eq!(clock.turn(), 3);
        assert_eq!(clock.seed(), "");
    }
}
