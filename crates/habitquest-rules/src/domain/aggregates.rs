//! The per-character roll log aggregate.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use habitquest_core::aggregate::AggregateRoot;
use habitquest_core::clock::Clock;
use habitquest_core::error::DomainError;
use habitquest_core::event::EventMetadata;
use uuid::Uuid;

use super::events::{RollRecorded, RulesEvent, RulesEventKind};
use super::orchestrator::RollResult;

/// One recorded roll within the log.
#[derive(Debug, Clone)]
pub(crate) struct LoggedRoll {
    pub roll_id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub result: RollResult,
}

/// Audit log of a character's rolls. The aggregate id is the character id.
#[derive(Debug)]
pub struct RollLog {
    /// Aggregate identifier (the character).
    pub id: Uuid,
    /// Current version (event count).
    pub(crate) version: i64,
    /// Rolls in recording order.
    pub(crate) entries: Vec<LoggedRoll>,
    /// Rolls per ability, keyed by lowercased name.
    pub(crate) ability_usage: BTreeMap<String, u32>,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<RulesEvent>,
}

impl RollLog {
    /// Creates an empty log for a character.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            entries: Vec::new(),
            ability_usage: BTreeMap::new(),
            uncommitted_events: Vec::new(),
        }
    }

    /// Returns the next sequence number for a new event.
    #[allow(clippy::cast_possible_wrap)]
    fn next_sequence_number(&self) -> i64 {
        self.version + self.uncommitted_events.len() as i64 + 1
    }

    fn knows_roll(&self, roll_id: Uuid) -> bool {
        self.entries.iter().any(|e| e.roll_id == roll_id)
            || self.uncommitted_events.iter().any(|e| match &e.kind {
                RulesEventKind::RollRecorded(r) => r.roll_id == roll_id,
            })
    }

    /// Records a resolved roll, producing a `RollRecorded` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the roll belongs to another
    /// character or `roll_id` is already in the log.
    pub fn record_roll(
        &mut self,
        roll_id: Uuid,
        result: RollResult,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if result.character_id != self.id {
            return Err(DomainError::Validation(
                "roll belongs to a different character".to_owned(),
            ));
        }
        if self.knows_roll(roll_id) {
            return Err(DomainError::Validation(format!(
                "roll {roll_id} is already recorded"
            )));
        }

        let event = RulesEvent {
            metadata: EventMetadata::from_command(
                "rules.roll_recorded",
                self.id,
                self.next_sequence_number(),
                correlation_id,
                clock.now(),
            ),
            kind: RulesEventKind::RollRecorded(RollRecorded {
                roll_id,
                character_id: self.id,
                result,
            }),
        };

        self.uncommitted_events.push(event);
        Ok(())
    }
}

impl AggregateRoot for RollLog {
    type Event = RulesEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            RulesEventKind::RollRecorded(payload) => {
                if let Some(ability) = &payload.result.ability {
                    *self
                        .ability_usage
                        .entry(ability.to_lowercase())
                        .or_insert(0) += 1;
                }
                self.entries.push(LoggedRoll {
                    roll_id: payload.roll_id,
                    recorded_at: event.metadata.occurred_at,
                    result: payload.result.clone(),
                });
            }
        }
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}
