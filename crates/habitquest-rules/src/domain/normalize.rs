//! Converts heterogeneous source records into one list of [`Effect`]s.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use super::ability::AbilitySnapshot;
use super::effect::{Effect, EffectEntry, EffectKind, EffectTarget, SourceType};
use super::sources::{DayKind, DayState, EffectSource, EffectSources};

/// Normalizes every enabled source, in order: traits, items, temporary
/// effects, day-state.
///
/// Disabled sources (inactive traits, unequipped items) contribute nothing.
/// Two sources that would share a label are told apart by a ` #n` suffix on
/// every repeat after the first.
/// Per-effect conditions are *not* applied here; they are re-evaluated by
/// the filter against the same snapshot.
#[must_use]
pub fn normalize(sources: &EffectSources, abilities: &AbilitySnapshot) -> Vec<Effect> {
    let mut effects = Vec::new();
    let mut seen_labels: BTreeMap<String, usize> = BTreeMap::new();

    for source in sources.iter().filter(EffectSource::is_enabled) {
        let label = distinct_label(source.label(), &mut seen_labels);
        let source_type = source.source_type();

        match source {
            EffectSource::Trait(t) => push_entries(&mut effects, &t.effects, &label, source_type),
            EffectSource::Item(i) => push_entries(&mut effects, &i.effects, &label, source_type),
            EffectSource::TemporaryEffect(e) => {
                push_entries(&mut effects, &e.effects, &label, source_type);
            }
            EffectSource::DayState(day) => {
                if let Some(kind) = day_state_kind(day) {
                    effects.push(Effect::from_entry(&EffectEntry::new(kind), &label, source_type));
                }
            }
        }
    }

    for effect in &effects {
        match effect.condition.referenced_ability() {
            Some(ability) if abilities.get(ability).is_none() => {
                debug!(
                    source = %effect.source_label,
                    ability,
                    "condition references unknown ability"
                );
            }
            _ => {}
        }
    }

    debug!(count = effects.len(), "effects normalized");
    effects
}

fn distinct_label(label: String, seen: &mut BTreeMap<String, usize>) -> String {
    let count = seen.entry(label.clone()).or_insert(0);
    *count += 1;
    if *count == 1 {
        label
    } else {
        format!("{label} #{count}")
    }
}

fn push_entries(
    out: &mut Vec<Effect>,
    entries: &[EffectEntry],
    label: &str,
    source_type: SourceType,
) {
    for entry in entries {
        if !entry.condition.is_well_formed() {
            warn!(
                source = label,
                condition = %entry.condition,
                "malformed condition; effect stays inactive"
            );
        }
        out.push(Effect::from_entry(entry, label, source_type));
    }
}

/// The synthetic effect a day-state contributes, if any.
fn day_state_kind(day: &DayState) -> Option<EffectKind> {
    let targets = match day.state {
        DayKind::Difficult => day
            .affected_core_stats
            .iter()
            .map(|&core_stat| EffectTarget::CoreStat { core_stat })
            .collect::<Vec<_>>(),
        DayKind::Inspiration => day
            .selected_core_stat
            .map(|core_stat| EffectTarget::CoreStat { core_stat })
            .into_iter()
            .collect(),
        DayKind::Normal | DayKind::Critical => return None,
    };

    if targets.is_empty() {
        return None;
    }

    Some(match day.state {
        DayKind::Inspiration => EffectKind::Advantage {
            targets,
            modifier: None,
        },
        _ => EffectKind::Disadvantage {
            targets,
            modifier: None,
        },
    })
}

/// An effect together with its activation against a snapshot, for callers
/// that display provenance.
#[derive(Debug, Clone, Serialize)]
pub struct EffectActivation {
    /// The normalized effect.
    #[serde(flatten)]
    pub effect: Effect,
    /// Whether its condition currently holds.
    pub is_active: bool,
}

/// Normalizes and pairs each effect with its current activation.
#[must_use]
pub fn normalize_with_activation(
    sources: &EffectSources,
    abilities: &AbilitySnapshot,
) -> Vec<EffectActivation> {
    normalize(sources, abilities)
        .into_iter()
        .map(|effect| {
            let is_active = effect.is_active(abilities);
            EffectActivation { effect, is_active }
        })
        .collect()
}
