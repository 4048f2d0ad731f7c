//! Tier-1: settlement-level collapse eligibility
//!
//! Each settlement with nonzero exposure whose controller already has a
//! Tier-0 record accrues local strain. A domain may only count toward
//! eligibility while strain exceeds the Tier-1 threshold *and* the
//! controlling faction is Tier-0 eligible in that same domain.

use crate::collapse::coherence::is_degraded;
use crate::collapse::DomainCounts;
use crate::core::round6;
use crate::models::{Domain, DomainGate, EntityEligibility, Event, FactionId, GameState};
use crate::orchestrator::config::CollapseConfig;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

const TOP_EXPOSURE_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExposureEntry {
    pub entity_id: String,
    pub exposure: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Tier1Stats {
    pub entities_evaluated: u32,
    pub eligible: DomainCounts,
    pub newly_eligible: DomainCounts,
    pub suppressed_count: u32,
    pub immune_count: u32,
    /// Eligible flags withdrawn because the faction lost Tier-0 eligibility
    pub revoked_count: u32,
    pub top10_exposure_entities: Vec<ExposureEntry>,
    pub max_exposure: f64,
    pub max_persistence: DomainCounts,
}

/// `clamp(strain + exposure × fraction, 0, ceiling)`
pub fn accumulate_strain(strain: f64, exposure: f64, config: &CollapseConfig) -> f64 {
    round6((strain + exposure * config.strain_fraction).clamp(0.0, config.strain_ceiling))
}

/// Settlements sorted by exposure descending, then id ascending
pub fn top_exposure(exposure: &BTreeMap<String, f64>, limit: usize) -> Vec<ExposureEntry> {
    let mut ranked: Vec<ExposureEntry> = exposure
        .iter()
        .filter(|(_, v)| **v > 0.0)
        .map(|(id, v)| ExposureEntry {
            entity_id: id.clone(),
            exposure: *v,
        })
        .collect();
    ranked.sort_by(|x, y| {
        y.exposure
            .total_cmp(&x.exposure)
            .then_with(|| x.entity_id.cmp(&y.entity_id))
    });
    ranked.truncate(limit);
    ranked
}

pub fn evaluate_tier1(
    state: &mut GameState,
    exposure: &BTreeMap<String, f64>,
    config: &CollapseConfig,
    turn: u32,
) -> (Tier1Stats, Vec<Event>) {
    let mut stats = Tier1Stats {
        top10_exposure_entities: top_exposure(exposure, TOP_EXPOSURE_LIMIT),
        max_exposure: exposure.values().copied().fold(0.0, f64::max),
        ..Tier1Stats::default()
    };
    let mut events = Vec::new();
    let mut strain_updates: Vec<(String, f64)> = Vec::new();
    let mut record_updates: Vec<(String, EntityEligibility)> = Vec::new();

    {
        let view: &GameState = state;
        let controllers = view.controller_index();

        for (sid, value) in exposure {
            if *value <= 0.0 {
                continue;
            }
            let Some(faction_id) = controllers.get(sid.as_str()).copied() else {
                debug!(settlement = %sid, "no controlling faction, skipped");
                continue;
            };
            let Some(tier0) = view.collapse_eligibility.get(&faction_id) else {
                continue;
            };
            stats.entities_evaluated += 1;

            let before = view.strain_of(sid);
            let strain = accumulate_strain(before, *value, config);
            if before < config.strain_ceiling && strain >= config.strain_ceiling {
                events.push(Event::StrainCeilingReached {
                    turn,
                    settlement: sid.clone(),
                });
            }
            strain_updates.push((sid.clone(), strain));

            let previous = view
                .collapse_eligibility_tier1
                .get(sid)
                .cloned()
                .unwrap_or_default();
            let suppressed = view.collapse_overrides.suppressed_entities.contains(sid);
            let immune = view.collapse_overrides.immune_entities.contains(sid);
            let mut record = EntityEligibility {
                domains: previous.domains,
                suppressed,
                immune,
            };
            if suppressed {
                stats.suppressed_count += 1;
            }

            if immune {
                stats.immune_count += 1;
            } else {
                for domain in Domain::ALL {
                    let qualifying = strain > config.tier1_threshold(domain)
                        && tier0.domains.get(domain).is_eligible();
                    let gate = previous.domains.get(domain).advance(
                        qualifying,
                        suppressed,
                        config.tier1_persistence_turns,
                        || is_degraded(view, faction_id, domain, config),
                    );
                    record.domains.set(domain, gate);
                    stats.max_persistence.raise_to(domain, gate.persistence());

                    if gate.is_eligible() && !previous.domains.get(domain).is_eligible() {
                        stats.newly_eligible.bump(domain);
                        info!(settlement = %sid, %domain, turn, "settlement collapse-eligible");
                        events.push(Event::CollapseEligible {
                            turn,
                            tier: 1,
                            actor: sid.clone(),
                            domain,
                        });
                    }
                }
            }
            record_updates.push((sid.clone(), record));
        }
    }

    state.local_strain.extend(strain_updates);
    state.collapse_eligibility_tier1.extend(record_updates);
    stats.revoked_count = revoke_without_tier0(state);

    for record in state.collapse_eligibility_tier1.values() {
        for domain in Domain::ALL {
            if record.domains.get(domain).is_eligible() {
                stats.eligible.bump(domain);
            }
        }
    }

    (stats, events)
}

/// Withdraw Tier-1 eligibility wherever the controller is not Tier-0
/// eligible in the same domain
///
/// Covers settlements skipped this turn (no exposure or no controller)
/// whose flags would otherwise outlive their faction's standing. Immune
/// settlements keep their flags unchanged, as they do during evaluation.
fn revoke_without_tier0(state: &mut GameState) -> u32 {
    let controllers: BTreeMap<String, FactionId> = state
        .controller_index()
        .into_iter()
        .map(|(sid, f)| (sid.to_string(), f))
        .collect();
    let immune = &state.collapse_overrides.immune_entities;
    let mut revoked = 0;

    for (sid, record) in state.collapse_eligibility_tier1.iter_mut() {
        if immune.contains(sid) {
            continue;
        }
        let tier0 = controllers
            .get(sid)
            .and_then(|f| state.collapse_eligibility.get(f));
        for domain in Domain::ALL {
            if !record.domains.get(domain).is_eligible() {
                continue;
            }
            let backed = tier0.is_some_and(|t| t.domains.get(domain).is_eligible());
            if !backed {
                record.domains.set(domain, DomainGate::BelowThreshold);
                revoked += 1;
            }
        }
    }
    revoked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Faction, FactionEligibility};

    fn tier0_eligible_authority() -> FactionEligibility {
        let mut record = FactionEligibility::default();
        record.domains.authority = DomainGate::Eligible { turns: 3 };
        record
    }

    fn state() -> GameState {
        let mut rs = Faction::with_areas(["S1", "S2"]);
        rs.profile.authority = 10.0;
        let mut state = GameState::new("s").with_faction(FactionId::Rs, rs);
        state
            .collapse_eligibility
            .insert(FactionId::Rs, tier0_eligible_authority());
        state
    }

    fn exposure(value: f64) -> BTreeMap<String, f64> {
        let mut map = BTreeMap::new();
        map.insert("S1".to_string(), value);
        map
    }

    #[test]
    fn test_strain_clamps_at_ceiling() {
        let config = CollapseConfig::default();
        assert_eq!(accumulate_strain(90.0, 250.0, &config), 100.0);
        assert_eq!(accumulate_strain(0.0, 250.0, &config), 25.0);
    }

    #[test]
    fn test_top_exposure_ordering() {
        let mut map = BTreeMap::new();
        map.insert("B".to_string(), 5.0);
        map.insert("A".to_string(), 5.0);
        map.insert("C".to_string(), 9.0);
        map.insert("D".to_string(), 0.0);
        let ids: Vec<String> = top_exposure(&map, 10)
            .into_iter()
            .map(|e| e.entity_id)
            .collect();
        assert_eq!(ids, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_settlement_eligible_on_third_strained_turn() {
        let mut state = state();
        let config = CollapseConfig::default();
        let exposure = exposure(250.0);

        for turn in 1..=2 {
            evaluate_tier1(&mut state, &exposure, &config, turn);
            assert!(!state.collapse_eligibility_tier1["S1"]
                .domains
                .authority
                .is_eligible());
        }
        let (stats, _) = evaluate_tier1(&mut state, &exposure, &config, 3);
        assert_eq!(
            state.collapse_eligibility_tier1["S1"].domains.authority,
            DomainGate::Eligible { turns: 3 }
        );
        assert_eq!(stats.newly_eligible.authority, 1);
        assert_eq!(stats.max_persistence.authority, 3);
        // Cohesion never counts: the faction is not Tier-0 eligible there
        assert_eq!(stats.max_persistence.cohesion, 0);

        let (_, events) = evaluate_tier1(&mut state, &exposure, &config, 4);
        assert_eq!(state.local_strain["S1"], 100.0);
        assert_eq!(events.iter().filter(|e| e.event_type() == "StrainCeilingReached").count(), 1);
    }

    #[test]
    fn test_faction_without_tier0_record_is_skipped() {
        let mut state = state();
        state.collapse_eligibility.clear();
        let (stats, _) = evaluate_tier1(&mut state, &exposure(250.0), &CollapseConfig::default(), 1);
        assert_eq!(stats.entities_evaluated, 0);
        assert!(state.local_strain.is_empty());
        assert_eq!(stats.max_exposure, 250.0);
    }

    #[test]
    fn test_eligibility_revoked_when_tier0_lapses() {
        let mut state = state();
        let config = CollapseConfig::default();
        for turn in 1..=3 {
            evaluate_tier1(&mut state, &exposure(250.0), &config, turn);
        }
        state
            .collapse_eligibility
            .insert(FactionId::Rs, FactionEligibility::default());
        // No exposure this turn: the settlement is not evaluated
        let (stats, _) = evaluate_tier1(&mut state, &BTreeMap::new(), &config, 4);
        assert_eq!(stats.revoked_count, 1);
        assert!(!state.collapse_eligibility_tier1["S1"]
            .domains
            .authority
            .is_eligible());
    }

    #[test]
    fn test_immune_settlement_keeps_flags_when_tier0_lapses() {
        let mut state = state();
        let config = CollapseConfig::default();
        for turn in 1..=3 {
            evaluate_tier1(&mut state, &exposure(250.0), &config, turn);
        }
        state.collapse_overrides.immune_entities.insert("S1".to_string());
        state
            .collapse_eligibility
            .insert(FactionId::Rs, FactionEligibility::default());

        let (stats, _) = evaluate_tier1(&mut state, &exposure(250.0), &config, 4);
        assert_eq!(stats.immune_count, 1);
        assert_eq!(stats.revoked_count, 0);
        let record = &state.collapse_eligibility_tier1["S1"];
        assert!(record.immune);
        assert_eq!(record.domains.authority, DomainGate::Eligible { turns: 3 });
    }

    #[test]
    fn test_suppressed_settlement_counter_is_frozen() {
        let mut state = state();
        let config = CollapseConfig::default();
        evaluate_tier1(&mut state, &exposure(250.0), &config, 1);
        state.collapse_overrides.suppressed_entities.insert("S1".to_string());

        for turn in 2..=5 {
            let (stats, _) = evaluate_tier1(&mut state, &exposure(250.0), &config, turn);
            assert_eq!(stats.suppressed_count, 1);
        }
        let record = &state.collapse_eligibility_tier1["S1"];
        assert!(record.suppressed);
        assert_eq!(record.domains.authority, DomainGate::Persisting { turns: 1 });
    }

    #[test]
    fn test_suppressed_settlement_at_required_count_becomes_eligible() {
        let mut state = state();
        let config = CollapseConfig::default();
        state.collapse_overrides.suppressed_entities.insert("S1".to_string());
        let mut previous = EntityEligibility::default();
        previous.domains.authority = DomainGate::Persisting { turns: 3 };
        state
            .collapse_eligibility_tier1
            .insert("S1".to_string(), previous);

        let (stats, events) = evaluate_tier1(&mut state, &exposure(250.0), &config, 1);
        assert_eq!(
            state.collapse_eligibility_tier1["S1"].domains.authority,
            DomainGate::Eligible { turns: 3 }
        );
        assert_eq!(stats.newly_eligible.authority, 1);
        assert_eq!(events.iter().filter(|e| e.event_type() == "CollapseEligible").count(), 1);
    }
}
