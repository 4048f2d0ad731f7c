//! Tier-0: faction-level collapse eligibility

use crate::collapse::coherence::is_degraded;
use crate::collapse::DomainCounts;
use crate::models::{Domain, Event, FactionEligibility, FactionId, GameState};
use crate::orchestrator::config::CollapseConfig;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tier0Stats {
    pub entities_evaluated: u32,
    pub eligible: DomainCounts,
    pub newly_eligible: DomainCounts,
    pub suppressed_count: u32,
    pub immune_count: u32,
}

/// Advance every faction's Tier-0 record by one turn
///
/// Immune factions keep their domain gates untouched; only their flags and
/// turn stamp are refreshed.
pub fn evaluate_tier0(
    state: &mut GameState,
    config: &CollapseConfig,
    turn: u32,
) -> (Tier0Stats, Vec<Event>) {
    let mut stats = Tier0Stats::default();
    let mut events = Vec::new();
    let mut updates: Vec<(FactionId, FactionEligibility)> = Vec::new();
    let view: &GameState = state;

    for (faction_id, faction) in &view.factions {
        let previous = view
            .collapse_eligibility
            .get(faction_id)
            .cloned()
            .unwrap_or_default();
        let suppressed = view.collapse_overrides.suppressed_factions.contains(faction_id);
        let immune = view.collapse_overrides.immune_factions.contains(faction_id);

        let mut record = FactionEligibility {
            domains: previous.domains,
            suppressed,
            immune,
            last_updated_turn: turn,
        };
        stats.entities_evaluated += 1;
        if suppressed {
            stats.suppressed_count += 1;
        }

        if immune {
            stats.immune_count += 1;
        } else {
            let exhaustion = faction.profile.exhaustion;
            for domain in Domain::ALL {
                let qualifying = exhaustion > config.threshold(domain);
                let gate = previous.domains.get(domain).advance(
                    qualifying,
                    suppressed,
                    config.persistence_turns,
                    || is_degraded(view, *faction_id, domain, config),
                );
                record.domains.set(domain, gate);

                if gate.is_eligible() && !previous.domains.get(domain).is_eligible() {
                    stats.newly_eligible.bump(domain);
                    info!(faction = %faction_id, %domain, turn, "faction collapse-eligible");
                    events.push(Event::CollapseEligible {
                        turn,
                        tier: 0,
                        actor: faction_id.to_string(),
                        domain,
                    });
                }
            }
        }

        for domain in Domain::ALL {
            if record.domains.get(domain).is_eligible() {
                stats.eligible.bump(domain);
            }
        }
        updates.push((*faction_id, record));
    }

    state.collapse_eligibility.extend(updates);
    (stats, events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DomainGate, Faction};

    fn faction(exhaustion: f64, authority: f64) -> Faction {
        let mut f = Faction::with_areas(["A"]);
        f.supply_sources.insert("A".to_string());
        f.profile.exhaustion = exhaustion;
        f.profile.authority = authority;
        f
    }

    #[test]
    fn test_authority_eligible_on_third_turn() {
        let mut state = GameState::new("s").with_faction(FactionId::Rs, faction(60.0, 20.0));
        let config = CollapseConfig::default();

        for turn in 1..=2 {
            let (stats, _) = evaluate_tier0(&mut state, &config, turn);
            assert_eq!(stats.eligible.authority, 0);
        }
        let (stats, events) = evaluate_tier0(&mut state, &config, 3);
        let record = &state.collapse_eligibility[&FactionId::Rs];
        assert_eq!(record.domains.authority, DomainGate::Eligible { turns: 3 });
        assert_eq!(stats.newly_eligible.authority, 1);
        assert_eq!(events.len(), 1);
        // Source ratio 1/1 keeps spatial coherent; no formations keeps cohesion coherent
        assert_eq!(record.domains.spatial, DomainGate::Persisting { turns: 3 });
        assert_eq!(record.domains.cohesion, DomainGate::Persisting { turns: 3 });
        assert_eq!(record.last_updated_turn, 3);
    }

    #[test]
    fn test_exhaustion_at_threshold_does_not_qualify() {
        let mut state = GameState::new("s").with_faction(FactionId::Rs, faction(50.0, 0.0));
        evaluate_tier0(&mut state, &CollapseConfig::default(), 1);
        assert_eq!(
            state.collapse_eligibility[&FactionId::Rs].domains.authority,
            DomainGate::BelowThreshold
        );
    }

    #[test]
    fn test_immune_faction_is_counted_but_not_advanced() {
        let mut state = GameState::new("s").with_faction(FactionId::Rs, faction(90.0, 0.0));
        state.collapse_overrides.immune_factions.insert(FactionId::Rs);
        let (stats, _) = evaluate_tier0(&mut state, &CollapseConfig::default(), 1);
        let record = &state.collapse_eligibility[&FactionId::Rs];
        assert!(record.immune);
        assert_eq!(record.domains.authority, DomainGate::BelowThreshold);
        assert_eq!(stats.immune_count, 1);
        assert_eq!(stats.entities_evaluated, 1);
    }
}
