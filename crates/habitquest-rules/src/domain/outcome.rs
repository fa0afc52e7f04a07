//! Outcome classification and XP rewards.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Result class of a d20 roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollOutcome {
    /// Natural 20.
    CriticalSuccess,
    /// Met the difficulty, or no difficulty was set.
    Success,
    /// Fell short of the difficulty.
    Failure,
    /// Natural 1.
    CriticalFailure,
}

impl RollOutcome {
    /// Whether the outcome earns XP.
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Self::CriticalSuccess | Self::Success)
    }
}

impl fmt::Display for RollOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CriticalSuccess => "critical_success",
            Self::Success => "success",
            Self::Failure => "failure",
            Self::CriticalFailure => "critical_failure",
        })
    }
}

/// Classifies a roll. A natural 20 or 1 decides the outcome regardless of
/// `total`; without a `dc` every other roll succeeds.
#[must_use]
pub fn determine_outcome(die: u8, total: i32, dc: Option<i32>) -> RollOutcome {
    match (die, dc) {
        (20, _) => RollOutcome::CriticalSuccess,
        (1, _) => RollOutcome::CriticalFailure,
        (_, None) => RollOutcome::Success,
        (_, Some(dc)) if total >= dc => RollOutcome::Success,
        (_, Some(_)) => RollOutcome::Failure,
    }
}

/// XP awarded for `outcome`: nothing on failure, double on a critical
/// success, then scaled by the day multiplier.
#[must_use]
pub fn xp_reward(base_xp: u32, outcome: RollOutcome, day_multiplier: u32) -> u32 {
    let factor = match outcome {
        RollOutcome::CriticalSuccess => 2,
        RollOutcome::Success => 1,
        RollOutcome::Failure | RollOutcome::CriticalFailure => return 0,
    };
    base_xp.saturating_mul(factor).saturating_mul(day_multiplier)
}
