//! Command handlers for the roll audit log.
//!
//! Each handler loads the aggregate, runs the domain logic, and persists the
//! resulting events.

use habitquest_core::aggregate::AggregateRoot;
use habitquest_core::clock::Clock;
use habitquest_core::command::Command;
use habitquest_core::error::DomainError;
use habitquest_core::repository::{EventRepository, StoredEvent};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::domain::aggregates::RollLog;
use crate::domain::commands::ResolveRoll;
use crate::domain::events::{RulesEvent, RulesEventKind};
use crate::domain::orchestrator::{RollResult, resolve_roll};

/// Lowest face of the d20.
pub const DIE_MIN: u8 = 1;

/// Highest face of the d20.
pub const DIE_MAX: u8 = 20;

/// The resolved roll together with the events that recorded it.
#[derive(Debug, Clone)]
pub struct RollResolution {
    /// The resolution.
    pub result: RollResult,
    /// Events appended to the character's log.
    pub stored_events: Vec<StoredEvent>,
}

/// Reconstitutes a `RollLog` from stored events.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub(crate) fn reconstitute(
    character_id: Uuid,
    existing_events: &[StoredEvent],
) -> Result<RollLog, DomainError> {
    let mut log = RollLog::new(character_id);
    for stored in existing_events {
        let kind: RulesEventKind = serde_json::from_value(stored.payload.clone()).map_err(|e| {
            DomainError::Infrastructure(format!("event deserialization failed: {e}"))
        })?;
        let event = RulesEvent {
            metadata: stored.metadata(),
            kind,
        };
        log.apply(&event);
    }
    Ok(log)
}

/// Handles the `ResolveRoll` command: drops expired temporary effects,
/// resolves the roll, and appends it to the character's log.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the die is outside 1 to 20 or the
/// roll cannot be recorded, and any error from loading or appending events.
#[instrument(skip_all, fields(command = command.command_type(), roll_id = %command.roll_id))]
pub async fn handle_resolve_roll(
    command: &ResolveRoll,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<RollResolution, DomainError> {
    let die = command.request.die;
    if !(DIE_MIN..=DIE_MAX).contains(&die) {
        return Err(DomainError::Validation(format!(
            "die must be between {DIE_MIN} and {DIE_MAX}, got {die}"
        )));
    }

    let character_id = command.request.character_id;
    let existing_events = repo.load_events(character_id).await?;
    let mut log = reconstitute(character_id, &existing_events)?;

    let mut snapshot = command.snapshot.clone();
    let expired = snapshot.sources.retain_live(clock.now());
    if expired > 0 {
        debug!(expired, "dropped expired temporary effects");
    }

    let result = resolve_roll(&command.request, &snapshot);
    log.record_roll(command.roll_id, result.clone(), command.correlation_id, clock)?;

    let stored_events: Vec<StoredEvent> = log
        .uncommitted_events()
        .iter()
        .map(StoredEvent::from_domain_event)
        .collect();

    repo.append_events(character_id, log.version, &stored_events)
        .await?;

    info!(
        %character_id,
        total = result.total,
        outcome = %result.outcome,
        xp_awarded = result.xp_awarded,
        "roll recorded"
    );
    Ok(RollResolution {
        result,
        stored_events,
    })
}
