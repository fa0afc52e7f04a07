//! One roll, end to end: normalize, filter, apply, classify, reward.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::ability::AbilitySnapshot;
use super::apply::{AppliedModifier, BreakdownEntry, RollMode, apply};
use super::context::CurrentTags;
use super::effect::{AbilityRef, Effect, ResolutionContext};
use super::filter::filter;
use super::normalize::normalize;
use super::outcome::{RollOutcome, determine_outcome, xp_reward};
use super::sources::EffectSources;

/// A caller's request to resolve one roll. The die is already rolled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollRequest {
    /// Character making the roll.
    pub character_id: Uuid,
    /// Kind of roll.
    #[serde(default)]
    pub roll_type: ResolutionContext,
    /// Ability rolled; `None` skips effects entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ability: Option<String>,
    /// Caller-forced advantage/disadvantage.
    #[serde(default)]
    pub roll_mode: RollMode,
    /// Difficulty target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dc: Option<i32>,
    /// XP at stake before multipliers.
    #[serde(default)]
    pub base_xp: u32,
    /// Raw d20 value, 1 to 20.
    pub die: u8,
    /// Extra flat modifier supplied by the caller.
    #[serde(default)]
    pub additional_modifier: i32,
    /// Organizational tags for context expressions.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Everything resolution reads about a character, gathered up front.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSnapshot {
    /// Ability values.
    pub abilities: AbilitySnapshot,
    /// Effect-carrying records.
    #[serde(default)]
    pub sources: EffectSources,
}

/// The resolved roll, suitable for display and for the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollResult {
    /// Character that rolled.
    pub character_id: Uuid,
    /// Kind of roll.
    pub roll_type: ResolutionContext,
    /// Ability rolled, if any.
    pub ability: Option<String>,
    /// Raw die value.
    pub die: u8,
    /// Difficulty target, if any.
    pub dc: Option<i32>,
    /// Sum of the breakdown.
    pub modifier: i32,
    /// Die plus modifier.
    pub total: i32,
    /// Labeled contributions, base row first.
    pub breakdown: Vec<BreakdownEntry>,
    /// Whether anything granted advantage.
    pub has_advantage: bool,
    /// Whether anything imposed disadvantage.
    pub has_disadvantage: bool,
    /// Labels that granted advantage.
    pub advantage_sources: Vec<String>,
    /// Labels that imposed disadvantage.
    pub disadvantage_sources: Vec<String>,
    /// Outcome class.
    pub outcome: RollOutcome,
    /// XP awarded after multipliers.
    pub xp_awarded: u32,
    /// Effects judged relevant, for display and tagging.
    pub relevant_effects: Vec<Effect>,
}

impl RollResult {
    /// The mode a UI should present. Simultaneous advantage and disadvantage
    /// show as a flat roll; the flags themselves are left untouched.
    #[must_use]
    pub fn presentation_mode(&self) -> RollMode {
        match (self.has_advantage, self.has_disadvantage) {
            (true, false) => RollMode::Advantage,
            (false, true) => RollMode::Disadvantage,
            (true, true) | (false, false) => RollMode::Normal,
        }
    }
}

/// Resolves `request` against `snapshot`.
///
/// Pure: the same inputs always produce the same result. A roll with no
/// ability, or an ability missing from the snapshot, carries only the manual
/// override and the additional modifier.
#[must_use]
#[instrument(
    skip_all,
    fields(character_id = %request.character_id, roll_type = %request.roll_type)
)]
pub fn resolve_roll(request: &RollRequest, snapshot: &CharacterSnapshot) -> RollResult {
    let abilities = &snapshot.abilities;
    let effects = normalize(&snapshot.sources, abilities);

    let (applied, relevant_effects) = match request.ability.as_deref() {
        None => (AppliedModifier::zero(), Vec::new()),
        Some(name) => match abilities.get(name) {
            None => {
                warn!(ability = name, "ability not in snapshot; no modifiers applied");
                (AppliedModifier::zero(), Vec::new())
            }
            Some(ability) => {
                let relevant = filter(&effects, &ability.name, request.roll_type, abilities);
                let tags = CurrentTags {
                    roll_type: request.roll_type,
                    ability: Some(ability.name.clone()),
                    core_stat: Some(ability.core_stat),
                    tags: request.tags.clone(),
                };
                let applied = apply(
                    &relevant,
                    ability.base_value,
                    AbilityRef::resolve(&ability.name, abilities),
                    &tags,
                );
                (applied, relevant.into_iter().cloned().collect())
            }
        },
    };

    let applied = applied
        .with_manual_override(request.roll_mode)
        .with_additional_modifier(request.additional_modifier);

    let total = i32::from(request.die).saturating_add(applied.total);
    let outcome = determine_outcome(request.die, total, request.dc);
    let xp_awarded = xp_reward(request.base_xp, outcome, snapshot.sources.xp_multiplier());

    debug!(die = request.die, total, %outcome, xp_awarded, "roll resolved");

    RollResult {
        character_id: request.character_id,
        roll_type: request.roll_type,
        ability: request.ability.clone(),
        die: request.die,
        dc: request.dc,
        modifier: applied.total,
        total,
        breakdown: applied.breakdown,
        has_advantage: applied.has_advantage,
        has_disadvantage: applied.has_disadvantage,
        advantage_sources: applied.advantage_sources,
        disadvantage_sources: applied.disadvantage_sources,
        outcome,
        xp_awarded,
        relevant_effects,
    }
}
