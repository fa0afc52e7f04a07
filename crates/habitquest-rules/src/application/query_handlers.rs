//! Query handlers for the roll audit log.
//!
//! These reconstitute the aggregate from stored events and return read-only
//! view DTOs.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use habitquest_core::error::DomainError;
use habitquest_core::repository::EventRepository;
use serde::Serialize;
use uuid::Uuid;

use crate::application::command_handlers;
use crate::domain::orchestrator::RollResult;

/// Read-only view of one recorded roll.
#[derive(Debug, Serialize)]
pub struct RollEntryView {
    /// The roll identifier.
    pub roll_id: Uuid,
    /// When the roll was recorded.
    pub recorded_at: DateTime<Utc>,
    /// The full resolution.
    pub result: RollResult,
}

/// Read-only view of a character's roll log.
#[derive(Debug, Serialize)]
pub struct RollLogView {
    /// The character identifier.
    pub character_id: Uuid,
    /// Rolls in recording order.
    pub rolls: Vec<RollEntryView>,
    /// Number of rolls per ability, keyed by lowercased name.
    pub ability_usage: BTreeMap<String, u32>,
    /// Sum of XP awarded across all rolls.
    pub total_xp: u64,
    /// Current version (event count).
    pub version: i64,
}

/// Retrieves a character's roll log.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no rolls exist for the character.
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub async fn get_roll_log(
    character_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<RollLogView, DomainError> {
    let stored_events = repo.load_events(character_id).await?;
    if stored_events.is_empty() {
        return Err(DomainError::AggregateNotFound(character_id));
    }
    let log = command_handlers::reconstitute(character_id, &stored_events)?;

    let total_xp = log
        .entries
        .iter()
        .map(|e| u64::from(e.result.xp_awarded))
        .sum();

    let rolls = log
        .entries
        .into_iter()
        .map(|e| RollEntryView {
            roll_id: e.roll_id,
            recorded_at: e.recorded_at,
            result: e.result,
        })
        .collect();

    Ok(RollLogView {
        character_id: log.id,
        rolls,
        ability_usage: log.ability_usage,
        total_xp,
        version: log.version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::command_handlers::handle_resolve_roll;
    use crate::domain::ability::{Ability, AbilitySnapshot, CoreStat};
    use crate::domain::apply::RollMode;
    use crate::domain::commands::ResolveRoll;
    use crate::domain::effect::ResolutionContext;
    use crate::domain::orchestrator::{CharacterSnapshot, RollRequest};
    use habitquest_core::repository::StoredEvent;
    use habitquest_test_support::{
        EmptyEventRepository, FailingEventRepository, RecordingEventRepository, fixed_clock,
    };

    async fn record(
        character_id: Uuid,
        ability: Option<&str>,
        die: u8,
        prior: Vec<StoredEvent>,
    ) -> Vec<StoredEvent> {
        let cmd = ResolveRoll {
            correlation_id: Uuid::new_v4(),
            roll_id: Uuid::new_v4(),
            request: RollRequest {
                character_id,
                roll_type: ResolutionContext::AbilityCheck,
                ability: ability.map(str::to_owned),
                roll_mode: RollMode::Normal,
                dc: None,
                base_xp: 10,
                die,
                additional_modifier: 0,
                tags: vec![],
            },
            snapshot: CharacterSnapshot {
                abilities: AbilitySnapshot::new([Ability::new("research", 2, CoreStat::Mind)]),
                ..CharacterSnapshot::default()
            },
        };
        let repo = RecordingEventRepository::new(prior.clone());
        let resolution = handle_resolve_roll(&cmd, &fixed_clock(), &repo)
            .await
            .unwrap();
        prior.into_iter().chain(resolution.stored_events).collect()
    }

    #[tokio::test]
    async fn test_get_roll_log_returns_view() {
        let character_id = Uuid::new_v4();
        let events = record(character_id, Some("research"), 12, Vec::new()).await;
        let events = record(character_id, Some("Research"), 20, events).await;
        let events = record(character_id, None, 1, events).await;
        let repo = RecordingEventRepository::new(events);

        let view = get_roll_log(character_id, &repo).await.unwrap();

        assert_eq!(view.character_id, character_id);
        assert_eq!(view.version, 3);
        assert_eq!(view.rolls.len(), 3);
        assert_eq!(view.rolls[0].recorded_at, fixed_clock().0);
        assert_eq!(view.ability_usage.get("research"), Some(&2));
        assert_eq!(view.total_xp, 30);
    }

    #[tokio::test]
    async fn test_get_roll_log_returns_not_found_when_empty() {
        let character_id = Uuid::new_v4();

        let result = get_roll_log(character_id, &EmptyEventRepository).await;

        match result.unwrap_err() {
            DomainError::AggregateNotFound(id) => assert_eq!(id, character_id),
            other => panic!("expected AggregateNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_roll_log_propagates_repository_error() {
        let result = get_roll_log(Uuid::new_v4(), &FailingEventRepository).await;

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }
}
