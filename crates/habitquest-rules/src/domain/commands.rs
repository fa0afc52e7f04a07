//! Commands for the roll audit log.

use habitquest_core::command::Command;
use uuid::Uuid;

use super::orchestrator::{CharacterSnapshot, RollRequest};

/// Command to resolve a roll and append it to the character's log.
#[derive(Debug, Clone)]
pub struct ResolveRoll {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Identifier assigned to this roll.
    pub roll_id: Uuid,
    /// The roll to resolve.
    pub request: RollRequest,
    /// Character state gathered by the caller.
    pub snapshot: CharacterSnapshot,
}

impl Command for ResolveRoll {
    fn command_type(&self) -> &'static str {
        "rules.resolve_roll"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
