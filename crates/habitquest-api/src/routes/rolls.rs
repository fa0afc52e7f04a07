//! Routes for resolving rolls and reading a character's roll log.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use habitquest_core::error::DomainError;
use habitquest_core::rng::roll_d20;
use habitquest_rules::application::{command_handlers, query_handlers};
use habitquest_rules::domain::apply::RollMode;
use habitquest_rules::domain::commands::ResolveRoll;
use habitquest_rules::domain::effect::ResolutionContext;
use habitquest_rules::domain::orchestrator::{CharacterSnapshot, RollRequest, RollResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /resolve.
#[derive(Debug, Deserialize)]
pub struct ResolveRollBody {
    /// Character making the roll.
    pub character_id: Uuid,
    /// Kind of roll.
    #[serde(default)]
    pub roll_type: ResolutionContext,
    /// Ability rolled, if any.
    #[serde(default)]
    pub ability: Option<String>,
    /// Caller-forced advantage/disadvantage.
    #[serde(default)]
    pub roll_mode: RollMode,
    /// Difficulty target.
    #[serde(default)]
    pub dc: Option<i32>,
    /// XP at stake before multipliers.
    #[serde(default)]
    pub base_xp: u32,
    /// Die value; the server rolls one when absent.
    #[serde(default)]
    pub die: Option<u8>,
    /// Extra flat modifier.
    #[serde(default)]
    pub additional_modifier: i32,
    /// Organizational tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Character state to resolve against.
    pub snapshot: CharacterSnapshot,
}

impl ResolveRollBody {
    fn into_parts(self, die: u8) -> (RollRequest, CharacterSnapshot) {
        let request = RollRequest {
            character_id: self.character_id,
            roll_type: self.roll_type,
            ability: self.ability,
            roll_mode: self.roll_mode,
            dc: self.dc,
            base_xp: self.base_xp,
            die,
            additional_modifier: self.additional_modifier,
            tags: self.tags,
        };
        (request, self.snapshot)
    }
}

/// Response body for POST /resolve.
#[derive(Debug, Serialize)]
pub struct ResolveRollResponse {
    /// Identifier assigned to the roll.
    pub roll_id: Uuid,
    /// IDs of the domain events produced and persisted.
    pub event_ids: Vec<Uuid>,
    /// The resolution.
    pub result: RollResult,
}

fn server_die(state: &AppState) -> Result<u8, ApiError> {
    let face = {
        let mut rng = state
            .rng
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("RNG mutex poisoned: {e}")))?;
        roll_d20(&mut *rng)
    };
    debug!(face, "server rolled die");
    u8::try_from(face).map_err(|_| {
        ApiError(DomainError::Infrastructure(format!("rolled die out of range: {face}")))
    })
}

/// POST /resolve
#[instrument(skip(state, body), fields(character_id = %body.character_id))]
async fn resolve(
    State(state): State<AppState>,
    Json(body): Json<ResolveRollBody>,
) -> Result<Json<ResolveRollResponse>, ApiError> {
    let die = match body.die {
        Some(die) => die,
        None => server_die(&state)?,
    };
    let (request, snapshot) = body.into_parts(die);

    let command = ResolveRoll {
        correlation_id: Uuid::new_v4(),
        roll_id: Uuid::new_v4(),
        request,
        snapshot,
    };

    info!(correlation_id = %command.correlation_id, "handling resolve_roll command");

    let resolution = command_handlers::handle_resolve_roll(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    let event_ids = resolution.stored_events.iter().map(|e| e.event_id).collect();

    Ok(Json(ResolveRollResponse {
        roll_id: command.roll_id,
        event_ids,
        result: resolution.result,
    }))
}

/// GET /{character_id}
#[instrument(skip_all, fields(%character_id))]
async fn roll_log(
    State(state): State<AppState>,
    Path(character_id): Path<Uuid>,
) -> Result<Json<query_handlers::RollLogView>, ApiError> {
    let view = query_handlers::get_roll_log(character_id, &*state.event_repository).await?;
    Ok(Json(view))
}

/// Returns the router for rolls.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/resolve", post(resolve))
        .route("/{character_id}", get(roll_log))
}
