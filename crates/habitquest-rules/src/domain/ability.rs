//! Ability snapshot consumed by the resolution engine.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Top-level category grouping several abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoreStat {
    /// Physical habits.
    Body,
    /// Learning and focus.
    Mind,
    /// Relationships and emotion.
    Heart,
    /// Meaning and reflection.
    Soul,
}

impl CoreStat {
    /// Wire name of the core stat.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Mind => "mind",
            Self::Heart => "heart",
            Self::Soul => "soul",
        }
    }
}

impl fmt::Display for CoreStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named ability as seen by one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ability {
    /// Display name, unique per character (case-insensitively).
    pub name: String,
    /// Permanent value; changes only on level-up.
    pub base_value: i32,
    /// Base plus all standing modifiers.
    pub current_value: i32,
    /// Category the ability belongs to.
    pub core_stat: CoreStat,
}

impl Ability {
    /// An ability with no standing modifiers (`current == base`).
    #[must_use]
    pub fn new(name: impl Into<String>, base_value: i32, core_stat: CoreStat) -> Self {
        Self {
            name: name.into(),
            base_value,
            current_value: base_value,
            core_stat,
        }
    }

    /// Overrides the current value.
    #[must_use]
    pub fn with_current(mut self, current_value: i32) -> Self {
        self.current_value = current_value;
        self
    }
}

/// Wire shape of one ability inside the snapshot map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityValues {
    /// Permanent value.
    pub base_value: i32,
    /// Base plus standing modifiers.
    pub current_value: i32,
    /// Owning core stat.
    pub core_stat: CoreStat,
}

/// Consistent view of a character's abilities, keyed case-insensitively.
///
/// Serialized as a map from ability name to
/// `{ base_value, current_value, core_stat }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, AbilityValues>",
    into = "BTreeMap<String, AbilityValues>"
)]
pub struct AbilitySnapshot {
    abilities: BTreeMap<String, Ability>,
}

/// Whether two ability names refer to the same ability. Case folding covers
/// every script, matching how [`AbilitySnapshot`] keys its entries.
#[must_use]
pub fn names_match(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

impl AbilitySnapshot {
    /// Builds a snapshot. A later ability with the same (case-folded) name
    /// replaces an earlier one.
    pub fn new(abilities: impl IntoIterator<Item = Ability>) -> Self {
        Self {
            abilities: abilities
                .into_iter()
                .map(|ability| (ability.name.to_lowercase(), ability))
                .collect(),
        }
    }

    /// Looks an ability up by name, ignoring case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Ability> {
        self.abilities.get(&name.to_lowercase())
    }

    /// Current value of the named ability.
    #[must_use]
    pub fn current_value(&self, name: &str) -> Option<i32> {
        self.get(name).map(|a| a.current_value)
    }

    /// Core stat of the named ability.
    #[must_use]
    pub fn core_stat_of(&self, name: &str) -> Option<CoreStat> {
        self.get(name).map(|a| a.core_stat)
    }

    /// Iterates abilities in case-folded name order.
    pub fn iter(&self) -> impl Iterator<Item = &Ability> {
        self.abilities.values()
    }

    /// Number of abilities in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    /// Whether the snapshot holds no abilities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }
}

impl From<BTreeMap<String, AbilityValues>> for AbilitySnapshot {
    fn from(map: BTreeMap<String, AbilityValues>) -> Self {
        Self::new(map.into_iter().map(|(name, values)| Ability {
            name,
            base_value: values.base_value,
            current_value: values.current_value,
            core_stat: values.core_stat,
        }))
    }
}

impl From<AbilitySnapshot> for BTreeMap<String, AbilityValues> {
    fn from(snapshot: AbilitySnapshot) -> Self {
        snapshot
            .abilities
            .into_values()
            .map(|a| {
                (
                    a.name,
                    AbilityValues {
                        base_value: a.base_value,
                        current_value: a.current_value,
                        core_stat: a.core_stat,
                    },
                )
            })
            .collect()
    }
}
