//! The normalized, source-agnostic effect shape.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::ability::{AbilitySnapshot, CoreStat, names_match};
use super::condition::Condition;
use super::context::{self, ContextExpression, CurrentTags};

/// The kind of roll being resolved.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionContext {
    /// Passive display of a value, no die involved.
    Passive,
    /// A standard ability check.
    #[default]
    AbilityCheck,
    /// A saving throw.
    SavingThrow,
    /// An attack roll.
    Attack,
    /// A damage roll.
    Damage,
}

impl ResolutionContext {
    /// Wire name of the context.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passive => "passive",
            Self::AbilityCheck => "ability_check",
            Self::SavingThrow => "saving_throw",
            Self::Attack => "attack",
            Self::Damage => "damage",
        }
    }
}

impl fmt::Display for ResolutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which kind of record an effect came from. Used for attribution only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// A character trait.
    Trait,
    /// An equipped item.
    Item,
    /// A temporary custom effect.
    Custom,
    /// The current day-state.
    DayState,
}

/// One ability an effect points at, either by name or via its core stat.
///
/// Deserializes from a bare string (ability name) or `{ "core_stat": .. }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EffectTarget {
    /// A single ability by name.
    Ability(String),
    /// Every ability grouped under a core stat.
    CoreStat {
        /// The targeted core stat.
        core_stat: CoreStat,
    },
}

impl EffectTarget {
    /// Whether this target covers `ability`.
    #[must_use]
    pub fn covers(&self, ability: AbilityRef<'_>) -> bool {
        match self {
            Self::Ability(name) => names_match(name, ability.name),
            Self::CoreStat { core_stat } => ability.core_stat == Some(*core_stat),
        }
    }
}

/// A signed change to one ability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatDelta {
    /// Ability the delta applies to.
    pub ability: String,
    /// Signed amount.
    pub delta: i32,
}

/// What an effect does when it applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectKind {
    /// Adds signed deltas to named abilities.
    StatModifier {
        /// The `(ability, delta)` pairs.
        modifiers: Vec<StatDelta>,
    },
    /// Grants advantage, optionally with a flat modifier.
    Advantage {
        /// Abilities receiving advantage.
        targets: Vec<EffectTarget>,
        /// Flat modifier accompanying the flag.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        modifier: Option<i32>,
    },
    /// Imposes disadvantage, optionally with a flat modifier.
    Disadvantage {
        /// Abilities receiving disadvantage.
        targets: Vec<EffectTarget>,
        /// Flat modifier accompanying the flag.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        modifier: Option<i32>,
    },
    /// Free-form effect with no numeric contribution.
    Custom {
        /// Abilities the effect is about, for attribution.
        #[serde(default)]
        targets: Vec<EffectTarget>,
        /// Human-readable description.
        #[serde(default)]
        description: String,
    },
}

impl EffectKind {
    /// Whether any part of this effect concerns `ability`.
    #[must_use]
    pub fn targets(&self, ability: AbilityRef<'_>) -> bool {
        match self {
            Self::StatModifier { modifiers } => modifiers
                .iter()
                .any(|m| names_match(&m.ability, ability.name)),
            Self::Advantage { targets, .. }
            | Self::Disadvantage { targets, .. }
            | Self::Custom { targets, .. } => targets.iter().any(|t| t.covers(ability)),
        }
    }
}

/// An effect as stored on a trait, item, or temporary effect, before it is
/// attributed to its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectEntry {
    /// What the effect does.
    #[serde(flatten)]
    pub kind: EffectKind,
    /// Contexts the effect is eligible in; empty means all.
    #[serde(default)]
    pub applies_to: BTreeSet<ResolutionContext>,
    /// Activation condition, `"always"` when absent.
    #[serde(default)]
    pub condition: Condition,
    /// Optional tag expression gating the effect's numeric contribution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ContextExpression>,
}

impl EffectEntry {
    /// An always-on effect eligible in every context.
    #[must_use]
    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            applies_to: BTreeSet::new(),
            condition: Condition::Always,
            context: None,
        }
    }

    /// Restricts the effect to the given contexts.
    #[must_use]
    pub fn applies_to(mut self, contexts: impl IntoIterator<Item = ResolutionContext>) -> Self {
        self.applies_to = contexts.into_iter().collect();
        self
    }

    /// Sets the activation condition.
    #[must_use]
    pub fn when(mut self, condition: impl Into<Condition>) -> Self {
        self.condition = condition.into();
        self
    }

    /// Sets the tag expression.
    #[must_use]
    pub fn in_context(mut self, expression: ContextExpression) -> Self {
        self.context = Some(expression);
        self
    }
}

/// A normalized effect with provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    /// What the effect does.
    #[serde(flatten)]
    pub kind: EffectKind,
    /// Contexts the effect is eligible in; empty means all.
    pub applies_to: BTreeSet<ResolutionContext>,
    /// Activation condition.
    pub condition: Condition,
    /// Optional tag expression gating the numeric contribution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ContextExpression>,
    /// Human-readable provenance, e.g. `ARTIST (feature)`.
    pub source_label: String,
    /// Kind of record the effect came from.
    pub source_type: SourceType,
}

impl Effect {
    /// Attributes a stored effect to its source.
    #[must_use]
    pub fn from_entry(entry: &EffectEntry, source_label: &str, source_type: SourceType) -> Self {
        Self {
            kind: entry.kind.clone(),
            applies_to: entry.applies_to.clone(),
            condition: entry.condition.clone(),
            context: entry.context.clone(),
            source_label: source_label.to_owned(),
            source_type,
        }
    }

    /// Whether the condition holds against the current ability values.
    /// Recomputed on every call; never cached.
    #[must_use]
    pub fn is_active(&self, abilities: &AbilitySnapshot) -> bool {
        self.condition.evaluate(abilities)
    }

    /// Whether the effect is eligible in `context`.
    #[must_use]
    pub fn applies_in(&self, context: ResolutionContext) -> bool {
        self.applies_to.is_empty() || self.applies_to.contains(&context)
    }

    /// Whether the effect concerns `ability`.
    #[must_use]
    pub fn targets(&self, ability: AbilityRef<'_>) -> bool {
        self.kind.targets(ability)
    }

    /// Whether the tag expression (if any) accepts the roll's tags.
    #[must_use]
    pub fn matches_tags(&self, tags: &CurrentTags) -> bool {
        context::matches(self.context.as_ref(), tags)
    }
}

/// The ability a roll is about, with the core stat it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbilityRef<'a> {
    /// Ability name.
    pub name: &'a str,
    /// Core stat, when the ability is known.
    pub core_stat: Option<CoreStat>,
}

impl<'a> AbilityRef<'a> {
    /// Resolves the core stat of `name` from the snapshot.
    #[must_use]
    pub fn resolve(name: &'a str, abilities: &AbilitySnapshot) -> Self {
        Self {
            name,
            core_stat: abilities.core_stat_of(name),
        }
    }
}
