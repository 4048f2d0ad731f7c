//! Scenario scripts
//!
//! ```json
//! { "schema": 1,
//!   "turns": { "1": [ { "faction": "RS", "edge_id": "S1__S2", "posture": "push", "weight": 3 } ] } }
//! ```
//!
//! Turn keys are 1-based indices into the scenario run, not absolute game
//! turns. Entries of a turn are applied sorted by faction, then edge id,
//! whatever their order in the file.

use crate::core::EdgeKey;
use crate::models::{FactionId, Posture, PostureAssignment};
use crate::orchestrator::SimulationError;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const SCRIPT_SCHEMA_VERSION: u64 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptEntry {
    pub faction: FactionId,
    pub edge_id: EdgeKey,
    pub posture: Posture,
    pub weight: u32,
}

impl ScriptEntry {
    pub fn assignment(&self) -> PostureAssignment {
        PostureAssignment {
            posture: self.posture,
            weight: self.weight,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioScript {
    turns: BTreeMap<u32, Vec<ScriptEntry>>,
}

fn invalid(msg: impl Into<String>) -> SimulationError {
    SimulationError::InvalidScript(msg.into())
}

fn required_str<'a>(
    raw: &'a Map<String, Value>,
    field: &str,
    at: &str,
) -> Result<&'a str, SimulationError> {
    match raw.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.as_str()),
        Some(other) => Err(invalid(format!(
            "{at}: field `{field}` must be a non-empty string, got {other}"
        ))),
        None => Err(invalid(format!("{at}: missing field `{field}`"))),
    }
}

fn parse_posture(raw: &str) -> Result<Posture, SimulationError> {
    match raw {
        "hold" => Ok(Posture::Hold),
        "probe" => Ok(Posture::Probe),
        "push" => Ok(Posture::Push),
        other => Err(invalid(format!(
            "Invalid posture: {other} (expected hold|probe|push)"
        ))),
    }
}

fn parse_entry(raw: &Value, at: &str) -> Result<ScriptEntry, SimulationError> {
    let Value::Object(obj) = raw else {
        return Err(invalid(format!("{at}: entry must be an object")));
    };

    let faction_raw = required_str(obj, "faction", at)?;
    let faction: FactionId = faction_raw
        .parse()
        .map_err(|_| SimulationError::UnknownFaction(faction_raw.to_string()))?;
    let edge_id = EdgeKey::parse_canonical(required_str(obj, "edge_id", at)?)?;
    let posture = parse_posture(required_str(obj, "posture", at)?)?;
    let weight = match obj.get("weight") {
        None | Some(Value::Null) => 0,
        Some(value) => value
            .as_u64()
            .and_then(|w| u32::try_from(w).ok())
            .ok_or_else(|| {
                invalid(format!(
                    "{at}: weight must be a non-negative integer, got {value}"
                ))
            })?,
    };

    Ok(ScriptEntry {
        faction,
        edge_id,
        posture,
        weight,
    })
}

impl ScenarioScript {
    pub fn from_json_str(json: &str) -> Result<Self, SimulationError> {
        let data: Value = serde_json::from_str(json)?;
        let Value::Object(root) = data else {
            return Err(invalid("expected JSON object"));
        };

        match root.get("schema").and_then(Value::as_u64) {
            Some(SCRIPT_SCHEMA_VERSION) => {}
            _ => {
                return Err(invalid(format!(
                    "schema must be {SCRIPT_SCHEMA_VERSION}, got {}",
                    root.get("schema").unwrap_or(&Value::Null)
                )))
            }
        }

        let Some(Value::Object(turns)) = root.get("turns") else {
            return Err(invalid("missing turns object"));
        };

        let mut parsed = BTreeMap::new();
        for (key, value) in turns {
            let index: u32 = key
                .parse()
                .map_err(|_| invalid(format!("turn key \"{key}\" is not a turn number")))?;
            let Value::Array(raw_entries) = value else {
                return Err(invalid(format!("turns[\"{key}\"] must be an array")));
            };
            let mut entries = raw_entries
                .iter()
                .enumerate()
                .map(|(i, raw)| parse_entry(raw, &format!("turns[\"{key}\"][{i}]")))
                .collect::<Result<Vec<_>, _>>()?;
            entries.sort_by(|a, b| {
                a.faction
                    .cmp(&b.faction)
                    .then_with(|| a.edge_id.cmp(&b.edge_id))
            });
            parsed.insert(index, entries);
        }

        Ok(Self { turns: parsed })
    }

    pub fn from_file(path: &Path) -> Result<Self, SimulationError> {
        let contents = fs::read_to_string(path).map_err(|source| SimulationError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Entries for the 1-based run index (empty when none are scripted)
    pub fn entries_for(&self, index: u32) -> &[ScriptEntry] {
        self.turns.get(&index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn scripted_turns(&self) -> impl Iterator<Item = u32> + '_ {
        self.turns.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_are_sorted_by_faction_then_edge() {
        let script = ScenarioScript::from_json_str(
            r#"{"schema": 1, "turns": {"2": [
                {"faction": "RS", "edge_id": "A__B", "posture": "push", "weight": 2},
                {"faction": "RBiH", "edge_id": "C__D", "posture": "hold", "weight": 1},
                {"faction": "RBiH", "edge_id": "A__C", "posture": "probe", "weight": 1}
            ]}}"#,
        )
        .unwrap();
        let order: Vec<(FactionId, String)> = script
            .entries_for(2)
            .iter()
            .map(|e| (e.faction, e.edge_id.to_string()))
            .collect();
        assert_eq!(
            order,
            vec![
                (FactionId::Rbih, "A__C".to_string()),
                (FactionId::Rbih, "C__D".to_string()),
                (FactionId::Rs, "A__B".to_string()),
            ]
        );
        assert!(script.entries_for(1).is_empty());
    }

    #[test]
    fn test_non_canonical_edge_is_rejected() {
        let err = ScenarioScript::from_json_str(
            r#"{"schema": 1, "turns": {"1": [{"faction": "RS", "edge_id": "B__A", "posture": "hold"}]}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, SimulationError::InvalidEdgeId(_)));
        assert!(err.to_string().contains("a < b"));
    }

    #[test]
    fn test_missing_posture_is_rejected() {
        let err = ScenarioScript::from_json_str(
            r#"{"schema": 1, "turns": {"1": [{"faction": "RS", "edge_id": "A__B"}]}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("missing field `posture`"));
    }

    #[test]
    fn test_unknown_posture_and_faction() {
        let bad_posture = ScenarioScript::from_json_str(
            r#"{"schema": 1, "turns": {"1": [{"faction": "RS", "edge_id": "A__B", "posture": "charge"}]}}"#,
        )
        .unwrap_err();
        assert!(bad_posture.to_string().contains("Invalid posture: charge"));

        let bad_faction = ScenarioScript::from_json_str(
            r#"{"schema": 1, "turns": {"1": [{"faction": "XX", "edge_id": "A__B", "posture": "hold"}]}}"#,
        )
        .unwrap_err();
        assert!(matches!(bad_faction, SimulationError::UnknownFaction(_)));
    }

    #[test]
    fn test_wrong_schema_is_rejected() {
        let err = ScenarioScript::from_json_str(r#"{"schema": 2, "turns": {}}"#).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidScript(_)));
    }

    #[test]
    fn test_negative_weight_is_rejected() {
        let err = ScenarioScript::from_json_str(
            r#"{"schema": 1, "turns": {"1": [{"faction": "RS", "edge_id": "A__B", "posture": "hold", "weight": -1}]}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("weight"));
    }
}
