//! Domain events for the roll audit log.

use habitquest_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::orchestrator::RollResult;

/// Emitted when a roll has been resolved and recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollRecorded {
    /// Identifier of this roll.
    pub roll_id: Uuid,
    /// Character that rolled.
    pub character_id: Uuid,
    /// The full resolution.
    pub result: RollResult,
}

/// Event payload variants for the roll audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RulesEventKind {
    /// A roll was recorded.
    RollRecorded(RollRecorded),
}

/// Domain event envelope for the roll audit log.
#[derive(Debug, Clone)]
pub struct RulesEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: RulesEventKind,
}

impl DomainEvent for RulesEvent {
    fn event_type(&self) -> &'static str {
        match &self.kind {
            RulesEventKind::RollRecorded(_) => "rules.roll_recorded",
        }
    }

    fn to_payload(&self) -> serde_json::Value {
        // Derived Serialize into Value cannot fail for these types.
        serde_json::to_value(&self.kind).unwrap_or_default()
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
