//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use habitquest_core::clock::Clock;
use habitquest_core::repository::EventRepository;
use habitquest_core::rng::DeterministicRng;
use habitquest_event_store::memory_event_repository::InMemoryEventRepository;
use habitquest_test_support::{SequenceRng, fixed_clock};
use http_body_util::BodyExt;
use tower::ServiceExt;

use habitquest_api::routes;
use habitquest_api::state::AppState;

/// Build the full app router over `repository` with deterministic Clock/RNG.
/// Uses the same route structure as `main.rs`.
pub fn build_test_app(repository: Arc<InMemoryEventRepository>) -> Router {
    build_test_app_with_rng(repository, SequenceRng::new(vec![]))
}

/// Build the full app router with a custom `SequenceRng` for tests that let
/// the server roll the die.
pub fn build_test_app_with_rng(
    repository: Arc<InMemoryEventRepository>,
    rng: SequenceRng,
) -> Router {
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(fixed_clock());
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(rng));
    let event_repository: Arc<dyn EventRepository> = repository;
    routes::app(AppState::new(clock, rng, event_repository))
}

/// A fresh, empty store.
pub fn store() -> Arc<InMemoryEventRepository> {
    Arc::new(InMemoryEventRepository::new())
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap_or_default();

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap_or_default();

    (status, json)
}

/// A snapshot for a character with `creation` (base 3), `research` (base 2)
/// and `drive`, the ARTIST trait, a reading lens, and the given day-state.
pub fn snapshot(drive: i32, day_state: &str) -> serde_json::Value {
    serde_json::json!({
        "abilities": {
            "creation": { "base_value": 3, "current_value": 3, "core_stat": "mind" },
            "research": { "base_value": 2, "current_value": 2, "core_stat": "mind" },
            "drive": { "base_value": 0, "current_value": drive, "core_stat": "soul" }
        },
        "sources": {
            "traits": [{
                "name": "ARTIST",
                "is_active": true,
                "effects": [{
                    "kind": "stat_modifier",
                    "modifiers": [{ "ability": "creation", "delta": 2 }],
                    "condition": "drive > 0"
                }]
            }],
            "items": [{
                "name": "Reading Lens",
                "is_equipped": true,
                "effects": [{
                    "kind": "advantage",
                    "targets": ["research"],
                    "modifier": 1,
                    "applies_to": ["ability_check"]
                }]
            }],
            "day_state": { "state": day_state, "affected_core_stats": ["mind"] }
        }
    })
}
