//! The four kinds of record that can carry effects.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ability::CoreStat;
use super::effect::{EffectEntry, SourceType};

fn default_trait_category() -> String {
    "feature".to_owned()
}

/// A character trait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterTrait {
    /// Trait name, e.g. `ARTIST`.
    pub name: String,
    /// Free-form category shown in the provenance label.
    #[serde(default = "default_trait_category")]
    pub category: String,
    /// Stored activation flag; see `activation::refresh`.
    #[serde(default)]
    pub is_active: bool,
    /// Effects granted while active.
    #[serde(default)]
    pub effects: Vec<EffectEntry>,
}

impl CharacterTrait {
    /// A `feature` trait, initially inactive.
    #[must_use]
    pub fn new(name: impl Into<String>, effects: Vec<EffectEntry>) -> Self {
        Self {
            name: name.into(),
            category: default_trait_category(),
            is_active: false,
            effects,
        }
    }

    /// Sets the stored activation flag.
    #[must_use]
    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}

/// An item in the character's inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Item name.
    pub name: String,
    /// Only equipped items contribute effects.
    #[serde(default)]
    pub is_equipped: bool,
    /// Effects granted while equipped.
    #[serde(default)]
    pub effects: Vec<EffectEntry>,
}

/// A user-created effect that lasts until it expires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporaryEffect {
    /// Display name.
    pub name: String,
    /// Effects granted until expiry.
    #[serde(default)]
    pub effects: Vec<EffectEntry>,
    /// Expiry; `None` lasts until removed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl TemporaryEffect {
    /// Whether the effect has not yet expired at `now`.
    #[must_use]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|expiry| now < expiry)
    }
}

/// The day's environmental state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayKind {
    /// Nothing special.
    #[default]
    Normal,
    /// Disadvantage on the affected core stats.
    Difficult,
    /// Advantage on the selected core stat.
    Inspiration,
    /// Doubles XP awards.
    Critical,
}

impl fmt::Display for DayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Normal => "normal",
            Self::Difficult => "difficult",
            Self::Inspiration => "inspiration",
            Self::Critical => "critical",
        })
    }
}

/// The current day-state record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayState {
    /// Which kind of day it is.
    pub state: DayKind,
    /// Core stats a difficult day weighs on.
    #[serde(default)]
    pub affected_core_stats: Vec<CoreStat>,
    /// Core stat an inspired day lifts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_core_stat: Option<CoreStat>,
}

impl DayState {
    /// XP multiplier: 2 on a critical day, 1 otherwise.
    #[must_use]
    pub fn xp_multiplier(&self) -> u32 {
        match self.state {
            DayKind::Critical => 2,
            DayKind::Normal | DayKind::Difficult | DayKind::Inspiration => 1,
        }
    }

    /// Provenance label for the synthetic effect.
    #[must_use]
    pub fn label(&self) -> String {
        match self.state {
            DayKind::Difficult => "Difficult day (day state)".to_owned(),
            DayKind::Inspiration => "Inspired day (day state)".to_owned(),
            other => format!("{other} day (day state)"),
        }
    }
}

/// One source record, borrowed from [`EffectSources`].
#[derive(Debug, Clone, Copy)]
pub enum EffectSource<'a> {
    /// A trait.
    Trait(&'a CharacterTrait),
    /// An item.
    Item(&'a Item),
    /// A temporary effect.
    TemporaryEffect(&'a TemporaryEffect),
    /// The day-state.
    DayState(&'a DayState),
}

impl EffectSource<'_> {
    /// Whether the record itself is switched on. Temporary effects are
    /// always enabled here: expired ones must already be removed.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Trait(t) => t.is_active,
            Self::Item(i) => i.is_equipped,
            Self::TemporaryEffect(_) | Self::DayState(_) => true,
        }
    }

    /// Attribution kind.
    #[must_use]
    pub fn source_type(&self) -> SourceType {
        match self {
            Self::Trait(_) => SourceType::Trait,
            Self::Item(_) => SourceType::Item,
            Self::TemporaryEffect(_) => SourceType::Custom,
            Self::DayState(_) => SourceType::DayState,
        }
    }

    /// Provenance label, built from the record.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Trait(t) => format!("{} ({})", t.name, t.category),
            Self::Item(i) => format!("{} (item)", i.name),
            Self::TemporaryEffect(e) => format!("{} (effect)", e.name),
            Self::DayState(d) => d.label(),
        }
    }
}

/// Every effect-carrying record of one character.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectSources {
    /// Traits, in display order.
    #[serde(default)]
    pub traits: Vec<CharacterTrait>,
    /// Inventory items.
    #[serde(default)]
    pub items: Vec<Item>,
    /// Temporary custom effects.
    #[serde(default)]
    pub temporary_effects: Vec<TemporaryEffect>,
    /// Today's state, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_state: Option<DayState>,
}

impl EffectSources {
    /// Sources in resolution order: traits, items, temporary effects, day-state.
    pub fn iter(&self) -> impl Iterator<Item = EffectSource<'_>> {
        self.traits
            .iter()
            .map(EffectSource::Trait)
            .chain(self.items.iter().map(EffectSource::Item))
            .chain(
                self.temporary_effects
                    .iter()
                    .map(EffectSource::TemporaryEffect),
            )
            .chain(self.day_state.iter().map(EffectSource::DayState))
    }

    /// Drops temporary effects that have expired at `now`. Returns how many
    /// were removed.
    pub fn retain_live(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.temporary_effects.len();
        self.temporary_effects.retain(|e| e.is_live(now));
        before - self.temporary_effects.len()
    }

    /// XP multiplier implied by the day-state.
    #[must_use]
    pub fn xp_multiplier(&self) -> u32 {
        self.day_state.as_ref().map_or(1, DayState::xp_multiplier)
    }
}
