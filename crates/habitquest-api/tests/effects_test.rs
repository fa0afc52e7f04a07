//! Integration tests for effect normalization and activation refresh.

mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_normalize_reports_each_effect_with_activation() {
    let app = common::build_test_app(common::store());

    let body = common::snapshot(0, "inspiration");
    let (status, json) = common::post_json(app, "/api/v1/effects/normalize", &body).await;

    assert_eq!(status, StatusCode::OK);
    let effects = json["effects"].as_array().unwrap();
    assert_eq!(effects.len(), 2);
    assert_eq!(effects[0]["source_label"], "ARTIST (feature)");
    assert_eq!(effects[0]["source_type"], "trait");
    assert_eq!(effects[0]["is_active"], false);
    assert_eq!(effects[1]["source_label"], "Reading Lens (item)");
    assert_eq!(effects[1]["applies_to"], json!(["ability_check"]));
    assert_eq!(effects[1]["is_active"], true);
}

#[tokio::test]
async fn test_refresh_deactivates_trait_whose_condition_fails() {
    let app = common::build_test_app(common::store());

    let (status, json) =
        common::post_json(app, "/api/v1/effects/refresh", &common::snapshot(0, "normal")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["changed_traits"],
        json!([{ "name": "ARTIST", "is_active": false }])
    );
    assert_eq!(json["abilities"]["creation"]["current_value"], 3);
    assert_eq!(json["abilities"]["research"]["current_value"], 2);
}
