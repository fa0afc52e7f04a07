//! Selects the effects relevant to one ability in one context.

use tracing::debug;

use super::ability::AbilitySnapshot;
use super::effect::{AbilityRef, Effect, ResolutionContext};

/// Keeps an effect iff its condition holds against `abilities`, it is
/// eligible in `context` (empty `applies_to` is a wildcard), and it targets
/// `target_ability` by name or through the ability's core stat.
///
/// The result preserves input order.
#[must_use]
pub fn filter<'e>(
    effects: &'e [Effect],
    target_ability: &str,
    context: ResolutionContext,
    abilities: &AbilitySnapshot,
) -> Vec<&'e Effect> {
    let target = AbilityRef::resolve(target_ability, abilities);

    let relevant: Vec<&Effect> = effects
        .iter()
        .filter(|e| e.is_active(abilities))
        .filter(|e| e.applies_in(context))
        .filter(|e| e.targets(target))
        .collect();

    debug!(
        ability = target_ability,
        %context,
        considered = effects.len(),
        relevant = relevant.len(),
        "effects filtered"
    );
    relevant
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ability::{Ability, CoreStat};
    use crate::domain::effect::{EffectEntry, EffectKind, EffectTarget, SourceType, StatDelta};

    fn abilities(drive: i32) -> AbilitySnapshot {
        AbilitySnapshot::new([
            Ability::new("creation", 3, CoreStat::Mind),
            Ability::new("research", 2, CoreStat::Mind),
            Ability::new("running", 1, CoreStat::Body),
            Ability::new("drive", 0, CoreStat::Soul).with_current(drive),
        ])
    }

    fn effect(label: &str, entry: EffectEntry) -> Effect {
        Effect::from_entry(&entry, label, SourceType::Trait)
    }

    fn plus(ability: &str, delta: i32) -> EffectEntry {
        EffectEntry::new(EffectKind::StatModifier {
            modifiers: vec![StatDelta {
                ability: ability.into(),
                delta,
            }],
        })
    }

    fn labels(effects: &[&Effect]) -> Vec<String> {
        effects.iter().map(|e| e.source_label.clone()).collect()
    }

    #[test]
    fn test_condition_must_hold() {
        let effects = vec![effect("ARTIST (feature)", plus("creation", 2).when("drive > 0"))];

        assert_eq!(
            filter(&effects, "creation", ResolutionContext::AbilityCheck, &abilities(1)).len(),
            1
        );
        assert!(
            filter(&effects, "creation", ResolutionContext::AbilityCheck, &abilities(0))
                .is_empty()
        );
    }

    #[test]
    fn test_malformed_condition_excludes_effect() {
        let effects = vec![effect("X", plus("creation", 2).when("not a condition"))];

        assert!(
            filter(&effects, "creation", ResolutionContext::AbilityCheck, &abilities(9))
                .is_empty()
        );
    }

    #[test]
    fn test_context_eligibility() {
        let effects = vec![effect(
            "Lens (item)",
            EffectEntry::new(EffectKind::Advantage {
                targets: vec![EffectTarget::Ability("research".into())],
                modifier: Some(1),
            })
            .applies_to([ResolutionContext::AbilityCheck]),
        )];

        assert_eq!(
            filter(&effects, "research", ResolutionContext::AbilityCheck, &abilities(0)).len(),
            1
        );
        assert!(
            filter(&effects, "research", ResolutionContext::SavingThrow, &abilities(0))
                .is_empty()
        );
    }

    #[test]
    fn test_targets_by_name_or_core_stat() {
        let effects = vec![
            effect("A", plus("creation", 1)),
            effect(
                "B",
                EffectEntry::new(EffectKind::Disadvantage {
                    targets: vec![EffectTarget::CoreStat {
                        core_stat: CoreStat::Mind,
                    }],
                    modifier: None,
                }),
            ),
            effect("C", plus("running", 1)),
        ];

        let for_research =
            filter(&effects, "research", ResolutionContext::AbilityCheck, &abilities(0));
        assert_eq!(labels(&for_research), vec!["B"]);

        let for_creation =
            filter(&effects, "creation", ResolutionContext::AbilityCheck, &abilities(0));
        assert_eq!(labels(&for_creation), vec!["A", "B"]);
    }

    #[test]
    fn test_unknown_ability_matches_only_by_name() {
        let effects = vec![
            effect("A", plus("mystery", 1)),
            effect(
                "B",
                EffectEntry::new(EffectKind::Advantage {
                    targets: vec![EffectTarget::CoreStat {
                        core_stat: CoreStat::Mind,
                    }],
                    modifier: None,
                }),
            ),
        ];

        let relevant = filter(&effects, "mystery", ResolutionContext::AbilityCheck, &abilities(0));
        assert_eq!(labels(&relevant), vec!["A"]);
    }

    #[test]
    fn test_preserves_input_order() {
        let effects: Vec<Effect> = ["first", "second", "third", "fourth"]
            .into_iter()
            .map(|label| effect(label, plus("creation", 1)))
            .collect();

        let relevant = filter(&effects, "creation", ResolutionContext::Attack, &abilities(0));

        assert_eq!(labels(&relevant), vec!["first", "second", "third", "fourth"]);
    }
}
