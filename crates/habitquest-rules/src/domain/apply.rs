//! Folds filtered effects into a modifier, a breakdown, and roll flags.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ability::names_match;
use super::context::CurrentTags;
use super::effect::{AbilityRef, Effect, EffectKind};

/// Breakdown label for a caller-forced advantage/disadvantage.
pub const MANUAL_OVERRIDE_SOURCE: &str = "Manual override";

/// Breakdown label for the caller-supplied flat modifier.
pub const ADDITIONAL_MODIFIER_SOURCE: &str = "Additional modifier";

/// Caller-selected roll mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollMode {
    /// No forced flag.
    #[default]
    Normal,
    /// Force advantage.
    Advantage,
    /// Force disadvantage.
    Disadvantage,
}

/// One labeled contribution to a roll's modifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    /// Provenance label.
    pub source: String,
    /// Signed contribution; 0 for attribution-only rows.
    pub value: i32,
}

impl BreakdownEntry {
    /// Builds an entry.
    #[must_use]
    pub fn new(source: impl Into<String>, value: i32) -> Self {
        Self {
            source: source.into(),
            value,
        }
    }
}

/// The folded result of applying effects to one ability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedModifier {
    /// Sum of every breakdown row.
    pub total: i32,
    /// Contributions in encounter order, base row first.
    pub breakdown: Vec<BreakdownEntry>,
    /// Whether any effect (or the caller) granted advantage.
    pub has_advantage: bool,
    /// Whether any effect (or the caller) imposed disadvantage.
    pub has_disadvantage: bool,
    /// Labels of everything that granted advantage.
    pub advantage_sources: Vec<String>,
    /// Labels of everything that imposed disadvantage.
    pub disadvantage_sources: Vec<String>,
}

impl AppliedModifier {
    /// Result for a roll with no ability: zero and an empty breakdown.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    fn add(&mut self, source: &str, value: i32) {
        self.total = self.total.saturating_add(value);
        self.breakdown.push(BreakdownEntry::new(source, value));
    }

    /// ORs a caller-selected mode into the flags. `Manual override` is
    /// recorded only when it sets a flag no effect had set.
    ///
    /// Advantage and disadvantage never cancel here; both may be reported.
    #[must_use]
    pub fn with_manual_override(mut self, mode: RollMode) -> Self {
        match mode {
            RollMode::Normal => {}
            RollMode::Advantage => {
                if !self.has_advantage {
                    self.has_advantage = true;
                    self.advantage_sources.push(MANUAL_OVERRIDE_SOURCE.to_owned());
                }
            }
            RollMode::Disadvantage => {
                if !self.has_disadvantage {
                    self.has_disadvantage = true;
                    self.disadvantage_sources
                        .push(MANUAL_OVERRIDE_SOURCE.to_owned());
                }
            }
        }
        self
    }

    /// Adds the caller-supplied flat modifier as the last row, if nonzero.
    #[must_use]
    pub fn with_additional_modifier(mut self, value: i32) -> Self {
        if value != 0 {
            self.add(ADDITIONAL_MODIFIER_SOURCE, value);
        }
        self
    }
}

/// Applies `filtered` to `target`, seeded with `base_modifier`.
///
/// * Stat modifiers add every delta naming the target, one row each. A stat
///   modifier whose tag expression rejects `tags` contributes nothing.
/// * Advantage/disadvantage effects covering the target set the flag and
///   record their label. Their flat modifier is added only when nonzero and
///   the tag expression accepts `tags`; otherwise a zero row is recorded so
///   the source still shows up.
/// * Custom effects never change the number.
#[must_use]
pub fn apply(
    filtered: &[&Effect],
    base_modifier: i32,
    target: AbilityRef<'_>,
    tags: &CurrentTags,
) -> AppliedModifier {
    let mut applied = AppliedModifier {
        total: base_modifier,
        breakdown: vec![BreakdownEntry::new(
            format!("{} (base)", target.name),
            base_modifier,
        )],
        ..AppliedModifier::default()
    };

    for effect in filtered {
        let label = effect.source_label.as_str();
        match &effect.kind {
            EffectKind::StatModifier { modifiers } => {
                if !effect.matches_tags(tags) {
                    continue;
                }
                for delta in modifiers
                    .iter()
                    .filter(|m| names_match(&m.ability, target.name))
                {
                    applied.add(label, delta.delta);
                }
            }
            EffectKind::Advantage { targets, modifier }
            | EffectKind::Disadvantage { targets, modifier } => {
                if !targets.iter().any(|t| t.covers(target)) {
                    continue;
                }

                if matches!(effect.kind, EffectKind::Advantage { .. }) {
                    applied.has_advantage = true;
                    applied.advantage_sources.push(label.to_owned());
                } else {
                    applied.has_disadvantage = true;
                    applied.disadvantage_sources.push(label.to_owned());
                }

                match modifier {
                    Some(flat) if *flat != 0 && effect.matches_tags(tags) => {
                        applied.add(label, *flat);
                    }
                    _ => applied.breakdown.push(BreakdownEntry::new(label, 0)),
                }
            }
            EffectKind::Custom { .. } => {}
        }
    }

    debug!(
        ability = target.name,
        total = applied.total,
        rows = applied.breakdown.len(),
        advantage = applied.has_advantage,
        disadvantage = applied.has_disadvantage,
        "effects applied"
    );
    applied
}
