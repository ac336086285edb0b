mod common;

use axum::http::StatusCode;
use chrono::Duration;
use serde_json::json;

use common::{build_test_app, get_json, get_public, guest_token, post_json, TestApp};

async fn held(app: &TestApp, token: &str, seats: &[&str]) -> String {
    let (status, hold) = post_json(
        app,
        "/v1/holds",
        token,
        &json!({ "show_id": app.show_id, "seat_ids": seats, "quantity": seats.len() }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    hold["hold_id"].as_str().unwrap().to_string()
}

fn customer() -> serde_json::Value {
    json!({ "name": "Ada Lovelace", "email": "ada@example.com", "phone": "+15550001" })
}

#[tokio::test]
async fn test_checkout_happy_path() {
    let app = build_test_app();
    let token = guest_token(&app).await;
    let hold_id = held(&app, &token, &["A1", "A2"]).await;

    let (status, order) = post_json(
        &app,
        "/v1/orders",
        &token,
        &json!({ "hold_id": hold_id, "customer": customer() }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["status"], "PAYMENT_PENDING");
    assert_eq!(order["amount_cents"], 5000);
    assert!(order.get("ticket_code").is_none());

    // The hold is consumed; its lock no longer shows in availability.
    let (_, view) = get_public(&app, &format!("/v1/shows/{}/availability", app.show_id)).await;
    assert_eq!(view["held_seat_ids"], json!([]));

    let order_id = order["order_id"].as_str().unwrap();
    let (status, confirmed) = post_json(
        &app,
        &format!("/v1/orders/{order_id}/confirm"),
        &token,
        &json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(confirmed["status"], "CONFIRMED");
    let ticket = confirmed["ticket_code"].as_str().unwrap();
    assert!(ticket.starts_with("MRQ-"));

    // Sold seats are unavailable independent of any lock TTL.
    app.clock.advance(Duration::seconds(3600));
    let (_, view) = get_public(&app, &format!("/v1/shows/{}/availability", app.show_id)).await;
    assert_eq!(view["unavailable_seat_ids"], json!(["A1", "A2", "A8"]));
    assert_eq!(view["held_seat_ids"], json!([]));
}

#[tokio::test]
async fn test_order_is_owner_scoped() {
    let app = build_test_app();
    let token_a = guest_token(&app).await;
    let token_b = guest_token(&app).await;
    let hold_id = held(&app, &token_a, &["A1"]).await;

    let (status, body) = post_json(
        &app,
        "/v1/orders",
        &token_b,
        &json!({ "hold_id": hold_id, "customer": customer() }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "not_owner");

    let (_, order) = post_json(
        &app,
        "/v1/orders",
        &token_a,
        &json!({ "hold_id": hold_id, "customer": customer() }),
    )
    .await;
    let order_id = order["order_id"].as_str().unwrap();

    let (status, _) = post_json(
        &app,
        &format!("/v1/orders/{order_id}/confirm"),
        &token_b,
        &json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_missing_customer_fields_are_rejected() {
    let app = build_test_app();
    let token = guest_token(&app).await;
    let hold_id = held(&app, &token, &["A1"]).await;

    let (status, body) = post_json(
        &app,
        "/v1/orders",
        &token,
        &json!({
            "hold_id": hold_id,
            "customer": { "name": "Ada", "email": "not-an-email", "phone": "+15550001" }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_expired_hold_cannot_become_an_order() {
    let app = build_test_app();
    let token = guest_token(&app).await;
    let hold_id = held(&app, &token, &["A1"]).await;

    app.clock.advance(Duration::seconds(301));
    let (status, body) = post_json(
        &app,
        "/v1/orders",
        &token,
        &json!({ "hold_id": hold_id, "customer": customer() }),
    )
    .await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(body["error"], "expired");
}

#[tokio::test]
async fn test_pending_order_expires_lazily() {
    let app = build_test_app();
    let token = guest_token(&app).await;
    let hold_id = held(&app, &token, &["A1"]).await;

    let (_, order) = post_json(
        &app,
        "/v1/orders",
        &token,
        &json!({ "hold_id": hold_id, "customer": customer() }),
    )
    .await;
    let order_id = order["order_id"].as_str().unwrap().to_string();

    app.clock.advance(Duration::seconds(901));
    let (status, fetched) = get_json(&app, &format!("/v1/orders/{order_id}"), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["status"], "EXPIRED");

    let (status, body) = post_json(
        &app,
        &format!("/v1/orders/{order_id}/confirm"),
        &token,
        &json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(body["error"], "expired");
}

#[tokio::test]
async fn test_losing_the_race_window_reports_seats_lost() {
    let app = build_test_app();
    let token_a = guest_token(&app).await;
    let token_b = guest_token(&app).await;

    // A orders A4 and pays later; B orders the same seat while it is
    // pending (the lock is gone once A's order exists).
    let hold_a = held(&app, &token_a, &["A4"]).await;
    let (_, order_a) = post_json(
        &app,
        "/v1/orders",
        &token_a,
        &json!({ "hold_id": hold_a, "customer": customer() }),
    )
    .await;

    let hold_b = held(&app, &token_b, &["A4"]).await;
    let (_, order_b) = post_json(
        &app,
        "/v1/orders",
        &token_b,
        &json!({ "hold_id": hold_b, "customer": customer() }),
    )
    .await;

    let order_a_id = order_a["order_id"].as_str().unwrap();
    let order_b_id = order_b["order_id"].as_str().unwrap();

    let (status, _) = post_json(
        &app,
        &format!("/v1/orders/{order_a_id}/confirm"),
        &token_a,
        &json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post_json(
        &app,
        &format!("/v1/orders/{order_b_id}/confirm"),
        &token_b,
        &json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "seats_lost");
    assert_eq!(body["seats"], json!(["A4"]));

    let (_, failed) = get_json(&app, &format!("/v1/orders/{order_b_id}"), &token_b).await;
    assert_eq!(failed["status"], "FAILED");
}

#[tokio::test]
async fn test_list_orders_returns_only_the_callers() {
    let app = build_test_app();
    let token_a = guest_token(&app).await;
    let token_b = guest_token(&app).await;

    let hold_a = held(&app, &token_a, &["A1"]).await;
    post_json(
        &app,
        "/v1/orders",
        &token_a,
        &json!({ "hold_id": hold_a, "customer": customer() }),
    )
    .await;

    let (status, mine) = get_json(&app, "/v1/orders", &token_a).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let (_, theirs) = get_json(&app, "/v1/orders", &token_b).await;
    assert_eq!(theirs.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_lifecycle_events_are_emitted_in_order() {
    let app = build_test_app();
    let token = guest_token(&app).await;
    let hold_id = held(&app, &token, &["A1"]).await;

    let (_, order) = post_json(
        &app,
        "/v1/orders",
        &token,
        &json!({ "hold_id": hold_id, "customer": customer() }),
    )
    .await;
    let order_id = order["order_id"].as_str().unwrap();
    post_json(
        &app,
        &format!("/v1/orders/{order_id}/confirm"),
        &token,
        &json!({}),
    )
    .await;

    assert_eq!(
        app.events.topics(),
        vec!["hold.created", "order.created", "order.confirmed"]
    );
}
