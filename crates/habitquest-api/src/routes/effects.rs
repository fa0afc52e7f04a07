//! Routes exposing effect normalization and activation refresh.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use habitquest_rules::domain::activation::{self, ActivationReport};
use habitquest_rules::domain::normalize::{EffectActivation, normalize_with_activation};
use habitquest_rules::domain::orchestrator::CharacterSnapshot;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::state::AppState;

/// Response body for POST /normalize.
#[derive(Debug, Serialize)]
pub struct NormalizeResponse {
    /// Normalized effects in source order, with current activation.
    pub effects: Vec<EffectActivation>,
}

/// Drops temporary effects that have expired according to the server clock.
fn live_snapshot(state: &AppState, mut snapshot: CharacterSnapshot) -> CharacterSnapshot {
    let expired = snapshot.sources.retain_live(state.clock.now());
    if expired > 0 {
        debug!(expired, "dropped expired temporary effects");
    }
    snapshot
}

/// POST /normalize
#[instrument(skip_all)]
async fn normalize(
    State(state): State<AppState>,
    Json(snapshot): Json<CharacterSnapshot>,
) -> Json<NormalizeResponse> {
    let snapshot = live_snapshot(&state, snapshot);
    let effects = normalize_with_activation(&snapshot.sources, &snapshot.abilities);
    Json(NormalizeResponse { effects })
}

/// POST /refresh
#[instrument(skip_all)]
async fn refresh(
    State(state): State<AppState>,
    Json(snapshot): Json<CharacterSnapshot>,
) -> Json<ActivationReport> {
    let snapshot = live_snapshot(&state, snapshot);
    Json(activation::refresh(&snapshot.sources, &snapshot.abilities))
}

/// Returns the router for effect inspection.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/normalize", post(normalize))
        .route("/refresh", post(refresh))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use habitquest_test_support::{EmptyEventRepository, MockRng, fixed_clock};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn test_app_state() -> AppState {
        AppState::new(
            Arc::new(fixed_clock()),
            Arc::new(Mutex::new(MockRng)),
            Arc::new(EmptyEventRepository),
        )
    }

    fn snapshot(drive: i32) -> Value {
        json!({
            "abilities": {
                "creation": { "base_value": 3, "current_value": 3, "core_stat": "mind" },
                "drive": { "base_value": 0, "current_value": drive, "core_stat": "soul" }
            },
            "sources": {
                "traits": [{
                    "name": "ARTIST",
                    "is_active": false,
                    "effects": [{
                        "kind": "stat_modifier",
                        "modifiers": [{ "ability": "creation", "delta": 2 }],
                        "condition": "drive > 0"
                    }]
                }],
                "temporary_effects": [
                    {
                        "name": "Stale Coffee",
                        "expires_at": "2026-01-15T09:00:00Z",
                        "effects": [{ "kind": "advantage", "targets": ["creation"] }]
                    },
                    {
                        "name": "Fresh Coffee",
                        "expires_at": "2026-01-15T11:00:00Z",
                        "effects": [{ "kind": "advantage", "targets": ["creation"] }]
                    }
                ],
                "day_state": { "state": "difficult", "affected_core_stats": ["body"] }
            }
        })
    }

    async fn post(uri: &str, body: &Value) -> (StatusCode, Value) {
        let app = router().with_state(test_app_state());
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_normalize_lists_live_effects_with_activation() {
        let (status, json) = post("/normalize", &snapshot(1)).await;

        assert_eq!(status, StatusCode::OK);
        let effects = json["effects"].as_array().unwrap();
        let labels: Vec<&str> = effects
            .iter()
            .map(|e| e["source_label"].as_str().unwrap())
            .collect();
        assert_eq!(labels, vec!["Fresh Coffee (effect)", "Difficult day (day state)"]);
        assert_eq!(effects[0]["kind"], "advantage");
        assert_eq!(effects[0]["is_active"], true);
        assert_eq!(effects[1]["source_type"], "day_state");
    }

    #[tokio::test]
    async fn test_refresh_activates_trait_and_recomputes_current() {
        let (status, json) = post("/refresh", &snapshot(1)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["sources"]["traits"][0]["is_active"], true);
        assert_eq!(
            json["changed_traits"],
            json!([{ "name": "ARTIST", "is_active": true }])
        );
        assert_eq!(json["abilities"]["creation"]["current_value"], 5);
        assert_eq!(
            json["sources"]["temporary_effects"].as_array().unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_refresh_returns_422_for_malformed_context_expression() {
        let body = json!({
            "abilities": {},
            "sources": {
                "items": [{
                    "name": "Odd Charm",
                    "is_equipped": true,
                    "effects": [{
                        "kind": "advantage",
                        "targets": ["creation"],
                        "context": { "type": "not", "children": [] }
                    }]
                }]
            }
        });

        let (status, _) = post("/refresh", &body).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
