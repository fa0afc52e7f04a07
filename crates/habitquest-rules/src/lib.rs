//! Effect resolution and roll calculation for HabitQuest.
//!
//! Normalizes the effects carried by traits, items, temporary effects and
//! the day-state, filters them for one ability and roll type, folds them into
//! a modifier with a labeled breakdown, and classifies the d20 outcome and
//! XP reward. Resolved rolls are kept in a per-character, event-sourced log.

pub mod application;
pub mod domain;
