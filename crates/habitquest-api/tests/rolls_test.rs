//! Integration tests for roll resolution and the roll log.

mod common;

use axum::http::StatusCode;
use habitquest_test_support::SequenceRng;
use serde_json::json;
use uuid::Uuid;

fn roll(character_id: Uuid, ability: &str, die: Option<u8>, day_state: &str) -> serde_json::Value {
    json!({
        "character_id": character_id,
        "ability": ability,
        "base_xp": 10,
        "die": die,
        "snapshot": common::snapshot(1, day_state)
    })
}

#[tokio::test]
async fn test_resolve_then_read_roll_log() {
    let store = common::store();
    let character_id = Uuid::new_v4();

    // POST /api/v1/rolls/resolve
    let app = common::build_test_app(store.clone());
    let (status, json) = common::post_json(
        app,
        "/api/v1/rolls/resolve",
        &roll(character_id, "creation", Some(12), "normal"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["result"]["total"], 17);
    assert_eq!(json["result"]["outcome"], "success");
    assert_eq!(json["result"]["xp_awarded"], 10);
    let roll_id = json["roll_id"].clone();

    // GET /api/v1/rolls/{character_id}
    let app = common::build_test_app(store);
    let (status, json) = common::get_json(app, &format!("/api/v1/rolls/{character_id}")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["character_id"], character_id.to_string());
    assert_eq!(json["version"], 1);
    assert_eq!(json["rolls"][0]["roll_id"], roll_id);
    assert_eq!(json["rolls"][0]["recorded_at"], "2026-01-15T10:00:00Z");
    assert_eq!(json["ability_usage"]["creation"], 1);
    assert_eq!(json["total_xp"], 10);
}

#[tokio::test]
async fn test_roll_log_accumulates_across_requests() {
    let store = common::store();
    let character_id = Uuid::new_v4();

    for (ability, die) in [("creation", 12), ("research", 20), ("research", 1)] {
        let app = common::build_test_app(store.clone());
        let (status, _) = common::post_json(
            app,
            "/api/v1/rolls/resolve",
            &roll(character_id, ability, Some(die), "normal"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let app = common::build_test_app(store);
    let (status, json) = common::get_json(app, &format!("/api/v1/rolls/{character_id}")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["version"], 3);
    assert_eq!(json["rolls"].as_array().unwrap().len(), 3);
    assert_eq!(json["ability_usage"], json!({ "creation": 1, "research": 2 }));
    assert_eq!(json["total_xp"], 30);
}

#[tokio::test]
async fn test_server_rolls_die_when_omitted() {
    let store = common::store();
    let app = common::build_test_app_with_rng(store, SequenceRng::new(vec![9]));

    let (status, json) = common::post_json(
        app,
        "/api/v1/rolls/resolve",
        &roll(Uuid::new_v4(), "research", None, "normal"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["result"]["die"], 9);
    assert_eq!(json["result"]["total"], 12);
    assert_eq!(json["result"]["has_advantage"], true);
    assert_eq!(json["result"]["advantage_sources"], json!(["Reading Lens (item)"]));
}

#[tokio::test]
async fn test_day_state_effects_reach_the_result() {
    let store = common::store();

    let app = common::build_test_app(store.clone());
    let (status, json) = common::post_json(
        app,
        "/api/v1/rolls/resolve",
        &roll(Uuid::new_v4(), "research", Some(10), "difficult"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["result"]["has_advantage"], true);
    assert_eq!(json["result"]["has_disadvantage"], true);
    assert_eq!(
        json["result"]["disadvantage_sources"],
        json!(["Difficult day (day state)"])
    );

    let app = common::build_test_app(store);
    let (status, json) = common::post_json(
        app,
        "/api/v1/rolls/resolve",
        &roll(Uuid::new_v4(), "creation", Some(10), "critical"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["result"]["xp_awarded"], 20);
}

#[tokio::test]
async fn test_out_of_range_die_is_rejected_and_not_logged() {
    let store = common::store();
    let character_id = Uuid::new_v4();

    let app = common::build_test_app(store.clone());
    let (status, json) = common::post_json(
        app,
        "/api/v1/rolls/resolve",
        &roll(character_id, "creation", Some(21), "normal"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");

    let app = common::build_test_app(store);
    let (status, json) = common::get_json(app, &format!("/api/v1/rolls/{character_id}")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "aggregate_not_found");
}
