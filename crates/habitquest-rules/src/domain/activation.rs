//! Whole-set recomputation of stored trait flags and current ability values.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::ability::{Ability, AbilitySnapshot};
use super::apply::apply;
use super::context::CurrentTags;
use super::effect::{AbilityRef, Effect, EffectKind, ResolutionContext};
use super::filter::filter;
use super::normalize::normalize;
use super::sources::EffectSources;

/// A trait whose stored flag changed during a refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitChange {
    /// Trait name.
    pub name: String,
    /// The recomputed flag.
    pub is_active: bool,
}

/// Output of [`refresh`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationReport {
    /// Sources with recomputed trait flags.
    pub sources: EffectSources,
    /// Abilities with recomputed current values.
    pub abilities: AbilitySnapshot,
    /// Traits whose flag flipped.
    pub changed_traits: Vec<TraitChange>,
}

/// Recomputes every trait's `is_active` and every ability's current value in
/// one pass.
///
/// A trait is active iff any of its effects' conditions holds; a trait with
/// no effects keeps its stored flag. An ability's current value is its base
/// plus the passive stat-modifier deltas of enabled sources. Every condition
/// is evaluated against `abilities`, never against the snapshot being built.
#[must_use]
pub fn refresh(sources: &EffectSources, abilities: &AbilitySnapshot) -> ActivationReport {
    let mut refreshed = sources.clone();
    let mut changed_traits = Vec::new();

    for character_trait in &mut refreshed.traits {
        if character_trait.effects.is_empty() {
            continue;
        }
        let is_active = character_trait
            .effects
            .iter()
            .any(|entry| entry.condition.evaluate(abilities));
        if is_active != character_trait.is_active {
            character_trait.is_active = is_active;
            changed_traits.push(TraitChange {
                name: character_trait.name.clone(),
                is_active,
            });
        }
    }

    let effects = normalize(&refreshed, abilities);
    let recomputed = AbilitySnapshot::new(abilities.iter().map(|ability| {
        let current = passive_value(&effects, ability, abilities);
        ability.clone().with_current(current)
    }));

    if changed_traits.is_empty() {
        debug!(abilities = recomputed.len(), "activation refreshed; no trait changes");
    } else {
        info!(changed = changed_traits.len(), "trait activation changed");
    }

    ActivationReport {
        sources: refreshed,
        abilities: recomputed,
        changed_traits,
    }
}

fn passive_value(effects: &[Effect], ability: &Ability, abilities: &AbilitySnapshot) -> i32 {
    let stat_modifiers: Vec<&Effect> =
        filter(effects, &ability.name, ResolutionContext::Passive, abilities)
            .into_iter()
            .filter(|e| matches!(e.kind, EffectKind::StatModifier { .. }))
            .collect();

    let tags = CurrentTags {
        roll_type: ResolutionContext::Passive,
        ability: Some(ability.name.clone()),
        core_stat: Some(ability.core_stat),
        tags: Vec::new(),
    };

    apply(
        &stat_modifiers,
        ability.base_value,
        AbilityRef::resolve(&ability.name, abilities),
        &tags,
    )
    .total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ability::CoreStat;
    use crate::domain::effect::{EffectEntry, EffectTarget, StatDelta};
    use crate::domain::sources::{CharacterTrait, Item};

    fn abilities(drive: i32) -> AbilitySnapshot {
        AbilitySnapshot::new([
            Ability::new("creation", 3, CoreStat::Mind),
            Ability::new("research", 2, CoreStat::Mind),
            Ability::new("drive", 0, CoreStat::Soul).with_current(drive),
        ])
    }

    fn plus(ability: &str, delta: i32) -> EffectEntry {
        EffectEntry::new(EffectKind::StatModifier {
            modifiers: vec![StatDelta {
                ability: ability.into(),
                delta,
            }],
        })
    }

    fn artist(stored: bool) -> CharacterTrait {
        CharacterTrait::new("ARTIST", vec![plus("creation", 2).when("drive > 0")]).active(stored)
    }

    #[test]
    fn test_trait_activates_when_condition_holds() {
        let sources = EffectSources {
            traits: vec![artist(false)],
            ..EffectSources::default()
        };

        let report = refresh(&sources, &abilities(1));

        assert!(report.sources.traits[0].is_active);
        assert_eq!(
            report.changed_traits,
            vec![TraitChange {
                name: "ARTIST".into(),
                is_active: true
            }]
        );
        assert_eq!(report.abilities.current_value("creation"), Some(5));
    }

    #[test]
    fn test_trait_deactivates_and_current_falls_back_to_base() {
        let sources = EffectSources {
            traits: vec![artist(true)],
            ..EffectSources::default()
        };

        let report = refresh(&sources, &abilities(0));

        assert!(!report.sources.traits[0].is_active);
        assert_eq!(report.changed_traits.len(), 1);
        assert_eq!(report.abilities.current_value("creation"), Some(3));
    }

    #[test]
    fn test_unchanged_traits_are_not_reported() {
        let sources = EffectSources {
            traits: vec![artist(true), CharacterTrait::new("PLAIN", vec![]).active(true)],
            ..EffectSources::default()
        };

        let report = refresh(&sources, &abilities(1));

        assert!(report.changed_traits.is_empty());
        assert!(report.sources.traits[1].is_active);
    }

    #[test]
    fn test_only_passive_stat_modifiers_count() {
        let sources = EffectSources {
            items: vec![
                Item {
                    name: "Quill".into(),
                    is_equipped: true,
                    effects: vec![plus("research", 1)],
                },
                Item {
                    name: "Sword".into(),
                    is_equipped: true,
                    effects: vec![plus("research", 5).applies_to([ResolutionContext::Attack])],
                },
                Item {
                    name: "Lens".into(),
                    is_equipped: true,
                    effects: vec![EffectEntry::new(EffectKind::Advantage {
                        targets: vec![EffectTarget::Ability("research".into())],
                        modifier: Some(3),
                    })],
                },
                Item {
                    name: "Shelved".into(),
                    is_equipped: false,
                    effects: vec![plus("research", 10)],
                },
            ],
            ..EffectSources::default()
        };

        let report = refresh(&sources, &abilities(0));

        assert_eq!(report.abilities.current_value("research"), Some(3));
        assert_eq!(report.abilities.current_value("drive"), Some(0));
    }

    #[test]
    fn test_conditions_use_supplied_snapshot() {
        let sources = EffectSources {
            traits: vec![
                artist(true),
                CharacterTrait::new("DRIVEN", vec![plus("drive", 5)]).active(true),
            ],
            ..EffectSources::default()
        };

        let report = refresh(&sources, &abilities(0));

        assert_eq!(report.abilities.current_value("drive"), Some(5));
        assert!(!report.sources.traits[0].is_active);
        assert_eq!(report.abilities.current_value("creation"), Some(3));
    }
}
