mod common;

use axum::http::StatusCode;
use chrono::Duration;
use serde_json::json;

use common::{build_test_app, delete_json, get_json, get_public, guest_token, post_json};

#[tokio::test]
async fn test_hold_requires_auth() {
    let app = build_test_app();
    let (status, _) = post_json(
        &app,
        "/v1/holds",
        "not-a-token",
        &json!({ "show_id": app.show_id, "seat_ids": ["A1"], "quantity": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_and_fetch_hold() {
    let app = build_test_app();
    let token = guest_token(&app).await;

    let (status, hold) = post_json(
        &app,
        "/v1/holds",
        &token,
        &json!({ "show_id": app.show_id, "seat_ids": ["A1", "A2"], "quantity": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(hold["status"], "HELD");
    assert_eq!(hold["seat_ids"], json!(["A1", "A2"]));

    let hold_id = hold["hold_id"].as_str().unwrap();
    let (status, fetched) = get_json(&app, &format!("/v1/holds/{hold_id}"), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["status"], "HELD");

    // Held seats show up for everyone browsing availability.
    let (status, view) = get_public(&app, &format!("/v1/shows/{}/availability", app.show_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["held_seat_ids"], json!(["A1", "A2"]));
}

#[tokio::test]
async fn test_quantity_mismatch_is_rejected() {
    let app = build_test_app();
    let token = guest_token(&app).await;

    let (status, body) = post_json(
        &app,
        "/v1/holds",
        &token,
        &json!({ "show_id": app.show_id, "seat_ids": ["A1"], "quantity": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_overlapping_hold_names_the_conflict() {
    let app = build_test_app();
    let token_a = guest_token(&app).await;
    let token_b = guest_token(&app).await;

    post_json(
        &app,
        "/v1/holds",
        &token_a,
        &json!({ "show_id": app.show_id, "seat_ids": ["A1", "A2"], "quantity": 2 }),
    )
    .await;

    let (status, body) = post_json(
        &app,
        "/v1/holds",
        &token_b,
        &json!({ "show_id": app.show_id, "seat_ids": ["A2", "A3"], "quantity": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "seat_conflict");
    assert_eq!(body["seats"], json!(["A2"]));

    // A3 was not locked by the failed attempt.
    let (_, view) = get_public(&app, &format!("/v1/shows/{}/availability", app.show_id)).await;
    assert_eq!(view["held_seat_ids"], json!(["A1", "A2"]));
}

#[tokio::test]
async fn test_release_is_owner_only_and_single_shot() {
    let app = build_test_app();
    let token_a = guest_token(&app).await;
    let token_b = guest_token(&app).await;

    let (_, hold) = post_json(
        &app,
        "/v1/holds",
        &token_a,
        &json!({ "show_id": app.show_id, "seat_ids": ["A1"], "quantity": 1 }),
    )
    .await;
    let hold_id = hold["hold_id"].as_str().unwrap().to_string();

    let (status, body) = delete_json(&app, &format!("/v1/holds/{hold_id}"), &token_b).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "not_owner");

    let (status, released) = delete_json(&app, &format!("/v1/holds/{hold_id}"), &token_a).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(released["status"], "RELEASED");

    let (status, body) = delete_json(&app, &format!("/v1/holds/{hold_id}"), &token_a).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "wrong_status");
}

#[tokio::test]
async fn test_expired_hold_reads_expired_and_frees_seats() {
    let app = build_test_app();
    let token = guest_token(&app).await;

    let (_, hold) = post_json(
        &app,
        "/v1/holds",
        &token,
        &json!({ "show_id": app.show_id, "seat_ids": ["A3"], "quantity": 1 }),
    )
    .await;
    let hold_id = hold["hold_id"].as_str().unwrap().to_string();

    app.clock.advance(Duration::seconds(301));

    let (status, fetched) = get_json(&app, &format!("/v1/holds/{hold_id}"), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["status"], "EXPIRED");

    let (_, view) = get_public(&app, &format!("/v1/shows/{}/availability", app.show_id)).await;
    assert_eq!(view["held_seat_ids"], json!([]));
}

#[tokio::test]
async fn test_unknown_show_and_unknown_hold() {
    let app = build_test_app();
    let token = guest_token(&app).await;

    let (status, body) = post_json(
        &app,
        "/v1/holds",
        &token,
        &json!({
            "show_id": "00000000-0000-0000-0000-000000000000",
            "seat_ids": ["A1"],
            "quantity": 1
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, _) = get_json(
        &app,
        "/v1/holds/00000000-0000-0000-0000-000000000000",
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) =
        get_public(&app, "/v1/shows/00000000-0000-0000-0000-000000000000/availability").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_statically_blocked_seats_are_listed_unavailable() {
    let app = build_test_app();
    let (status, view) =
        get_public(&app, &format!("/v1/shows/{}/availability", app.show_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["unavailable_seat_ids"], json!(["A8"]));
    assert_eq!(view["held_seat_ids"], json!([]));
}
