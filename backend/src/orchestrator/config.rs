//! Turn configuration
//!
//! One immutable [`TurnConfig`] value is handed to every turn. It replaces
//! process-wide feature toggles: which stages run and every tunable constant
//! live here and nowhere else.
//!
//! All structs deserialize with `#[serde(default)]`, so a JSON file only
//! needs to name the values it overrides.

use crate::models::{Domain, Posture};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse turn config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read turn config from {path:?}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid turn config: {0}")]
    Invalid(String),
}

/// Complete per-turn configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnConfig {
    pub stages: StageFlags,
    pub pressure: PressureConfig,
    pub exhaustion: ExhaustionConfig,
    pub collapse: CollapseConfig,
    pub negotiation: NegotiationConfig,
    pub breach: BreachConfig,
}

impl TurnConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: TurnConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        TurnConfig::from_json_str(&contents)
    }

    /// Reject values the pipeline cannot run with
    ///
    /// This only checks structural sanity. Whether the collapse constants
    /// are calibrated is a separate guard (`CollapseConfig::constants_verified`)
    /// checked when the gate runs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.collapse;
        if c.persistence_turns == 0 || c.tier1_persistence_turns == 0 {
            return Err(ConfigError::Invalid(
                "persistence turn requirements must be at least 1".to_string(),
            ));
        }
        if c.strain_ceiling <= 0.0 || c.strain_fraction < 0.0 {
            return Err(ConfigError::Invalid(
                "strain_ceiling must be positive and strain_fraction non-negative".to_string(),
            ));
        }
        if self.exhaustion.ceiling <= 0.0 {
            return Err(ConfigError::Invalid(
                "exhaustion ceiling must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.pressure.friction_floor) {
            return Err(ConfigError::Invalid(
                "friction_floor must be within 0..=1".to_string(),
            ));
        }
        if self.pressure.max_delta_per_turn < 0 {
            return Err(ConfigError::Invalid(
                "max_delta_per_turn must be non-negative".to_string(),
            ));
        }
        let n = &self.negotiation;
        if n.capital_pressure_divisor == 0
            || n.supplied_formations_divisor == 0
            || n.unsupplied_formations_divisor == 0
            || n.unsupplied_militia_divisor == 0
        {
            return Err(ConfigError::Invalid(
                "negotiation divisors must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Which gated stages run this turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageFlags {
    pub exhaustion: bool,
    /// Tier-0 and Tier-1 collapse gating (requires `exhaustion`)
    pub collapse_gating: bool,
    pub negotiation: bool,
    /// Resolve breaches into control flips after each scenario turn
    pub apply_breaches: bool,
}

impl Default for StageFlags {
    fn default() -> Self {
        Self {
            exhaustion: true,
            collapse_gating: false,
            negotiation: true,
            apply_breaches: false,
        }
    }
}

/// Posture commitment, exposure and front pressure constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PressureConfig {
    /// Exposure multiplier per posture
    pub exposure_hold: f64,
    pub exposure_probe: f64,
    pub exposure_push: f64,

    /// Pressure-generating intent multiplier per posture
    pub intent_hold: f64,
    pub intent_probe: f64,
    pub intent_push: f64,

    /// Effective weight lost per friction point
    pub friction_step: f64,
    /// Lower bound of the friction factor
    pub friction_floor: f64,

    /// Per-turn clamp on the pressure delta of one edge
    pub max_delta_per_turn: i64,

    /// Halve intent when the side has no supplied endpoint on the edge
    pub halve_unsupplied_intent: bool,
}

impl PressureConfig {
    pub fn exposure_multiplier(&self, posture: Posture) -> f64 {
        match posture {
            Posture::Hold => self.exposure_hold,
            Posture::Probe => self.exposure_probe,
            Posture::Push => self.exposure_push,
        }
    }

    pub fn intent_multiplier(&self, posture: Posture) -> f64 {
        match posture {
            Posture::Hold => self.intent_hold,
            Posture::Probe => self.intent_probe,
            Posture::Push => self.intent_push,
        }
    }

    /// `max(floor, 1 - step * friction)`
    pub fn friction_factor(&self, friction: u32) -> f64 {
        (1.0 - self.friction_step * f64::from(friction)).max(self.friction_floor)
    }
}

impl Default for PressureConfig {
    fn default() -> Self {
        Self {
            exposure_hold: 0.5,
            exposure_probe: 1.0,
            exposure_push: 1.5,
            intent_hold: 0.0,
            intent_probe: 1.0,
            intent_push: 2.0,
            friction_step: 0.05,
            friction_floor: 0.25,
            max_delta_per_turn: 10,
            halve_unsupplied_intent: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExhaustionConfig {
    /// Exhaustion per unit of exposure on supplied settlements
    pub supplied_rate: f64,
    /// Exhaustion per unit of exposure on isolated settlements
    pub unsupplied_rate: f64,
    /// Exhaustion per unit of effective committed posture weight
    pub commitment_rate: f64,
    /// Recovery applied on a turn with no exposure at all
    pub recovery_per_quiet_turn: f64,
    pub ceiling: f64,
}

impl Default for ExhaustionConfig {
    fn default() -> Self {
        Self {
            supplied_rate: 0.01,
            unsupplied_rate: 0.03,
            commitment_rate: 0.0,
            recovery_per_quiet_turn: 0.0,
            ceiling: 100.0,
        }
    }
}

/// Collapse eligibility constants
///
/// Every value here is an uncalibrated placeholder. Gating refuses to run
/// until `constants_verified` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollapseConfig {
    pub authority_threshold: f64,
    pub cohesion_threshold: f64,
    pub spatial_threshold: f64,
    /// Consecutive qualifying turns before Tier-0 eligibility
    pub persistence_turns: u32,

    /// Authority below this counts as authority degradation
    pub authority_degradation: f64,
    /// Formation fatigue above this counts as cohesion degradation
    pub fatigue_degradation: f64,
    /// Supply-source ratio below this counts as spatial degradation
    pub supply_ratio_degradation: f64,

    pub tier1_authority_threshold: f64,
    pub tier1_cohesion_threshold: f64,
    pub tier1_spatial_threshold: f64,
    pub tier1_persistence_turns: u32,

    /// Fraction of exposure converted to local strain each turn
    pub strain_fraction: f64,
    pub strain_ceiling: f64,

    pub constants_verified: bool,
}

impl CollapseConfig {
    pub fn threshold(&self, domain: Domain) -> f64 {
        match domain {
            Domain::Authority => self.authority_threshold,
            Domain::Cohesion => self.cohesion_threshold,
            Domain::Spatial => self.spatial_threshold,
        }
    }

    pub fn tier1_threshold(&self, domain: Domain) -> f64 {
        match domain {
            Domain::Authority => self.tier1_authority_threshold,
            Domain::Cohesion => self.tier1_cohesion_threshold,
            Domain::Spatial => self.tier1_spatial_threshold,
        }
    }
}

impl Default for CollapseConfig {
    fn default() -> Self {
        Self {
            authority_threshold: 50.0,
            cohesion_threshold: 50.0,
            spatial_threshold: 50.0,
            persistence_turns: 3,
            authority_degradation: 30.0,
            fatigue_degradation: 30.0,
            supply_ratio_degradation: 0.5,
            tier1_authority_threshold: 20.0,
            tier1_cohesion_threshold: 20.0,
            tier1_spatial_threshold: 20.0,
            tier1_persistence_turns: 3,
            strain_fraction: 0.1,
            strain_ceiling: 100.0,
            constants_verified: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NegotiationConfig {
    /// Pressure added per eligible Tier-0 domain
    pub pressure_per_eligible_domain: u32,
    /// Cap on pressure added from sustained sieges in one turn
    pub siege_cap: u32,
    /// Consecutive isolated turns before a settlement counts as besieged
    pub sustained_siege_turns: u32,
    /// Cap on pressure added from breach candidates involving the faction
    pub breach_cap: u32,
    /// Pressure added = unsupplied active formations / divisor
    pub unsupplied_formations_divisor: u32,
    /// Pressure added = militia pools cut off from supply / divisor
    pub unsupplied_militia_divisor: u32,
    /// Pressure lost on a turn with no increment
    pub decay_per_quiet_turn: u32,
    /// Capital gained = pressure delta / divisor
    pub capital_pressure_divisor: u32,
    /// Capital gained = supplied active formations / divisor
    pub supplied_formations_divisor: u32,
    pub max_capital_gain_per_turn: u32,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            pressure_per_eligible_domain: 1,
            siege_cap: 3,
            sustained_siege_turns: 3,
            breach_cap: 3,
            unsupplied_formations_divisor: 5,
            unsupplied_militia_divisor: 10,
            decay_per_quiet_turn: 0,
            capital_pressure_divisor: 2,
            supplied_formations_divisor: 10,
            max_capital_gain_per_turn: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreachConfig {
    /// Absolute edge pressure at which a breach is possible
    pub threshold: i64,
}

impl Default for BreachConfig {
    fn default() -> Self {
        Self { threshold: 20 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = TurnConfig::from_json_str(
            r#"{"stages": {"collapse_gating": true}, "collapse": {"constants_verified": true}}"#,
        )
        .unwrap();
        assert!(config.stages.collapse_gating);
        assert!(config.stages.exhaustion);
        assert!(config.collapse.constants_verified);
        assert_eq!(config.collapse.persistence_turns, 3);
        assert_eq!(config.pressure.max_delta_per_turn, 10);
    }

    #[test]
    fn test_zero_persistence_is_rejected() {
        let err = TurnConfig::from_json_str(r#"{"collapse": {"persistence_turns": 0}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_negative_pressure_clamp_is_rejected() {
        let err = TurnConfig::from_json_str(r#"{"pressure": {"max_delta_per_turn": -1}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("max_delta_per_turn")));

        let config = TurnConfig::from_json_str(r#"{"pressure": {"max_delta_per_turn": 0}}"#)
            .unwrap();
        assert_eq!(config.pressure.max_delta_per_turn, 0);
    }

    #[test]
    fn test_zero_negotiation_divisor_is_rejected() {
        let err =
            TurnConfig::from_json_str(r#"{"negotiation": {"unsupplied_militia_divisor": 0}}"#)
                .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_friction_factor_is_floored() {
        let config = PressureConfig::default();
        assert_eq!(config.friction_factor(0), 1.0);
        assert!((config.friction_factor(10) - 0.5).abs() < 1e-12);
        assert_eq!(config.friction_factor(100), 0.25);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"breach": {{"threshold": 7}}}}"#).unwrap();
        let config = TurnConfig::from_file(file.path()).unwrap();
        assert_eq!(config.breach.threshold, 7);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = TurnConfig::from_file(Path::new("/nonexistent/turn.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/turn.json"));
    }
}
