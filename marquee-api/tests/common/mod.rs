//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

use marquee_api::state::{AppState, AuthConfig};
use marquee_api::app;
use marquee_core::{Clock, EventSink, HoldStore, SeatLockStore, Show, ShowCatalog};
use marquee_engine::{AvailabilityAggregator, HoldManager, HoldPolicy, OrderManager, OrderPolicy};
use marquee_test_support::{
    InMemoryHoldStore, InMemoryOrderLedger, InMemorySeatLockStore, InMemoryShowCatalog,
    ManualClock, RecordingEventSink,
};

pub const TEST_SECRET: &str = "test-secret";

/// Full app wired to in-memory stores and a manual clock, same route
/// structure as `main.rs`.
pub struct TestApp {
    pub router: Router,
    pub clock: Arc<ManualClock>,
    pub catalog: Arc<InMemoryShowCatalog>,
    pub events: Arc<RecordingEventSink>,
    pub show_id: Uuid,
}

pub fn build_test_app() -> TestApp {
    let clock = Arc::new(ManualClock::default_start());
    let locks_impl = Arc::new(InMemorySeatLockStore::new(clock.clone()));
    let catalog_impl = Arc::new(InMemoryShowCatalog::new());
    let events_impl = Arc::new(RecordingEventSink::new());

    let show_id = Uuid::new_v4();
    catalog_impl.add_show(Show {
        id: show_id,
        title: "Evening Show".to_string(),
        starts_at: Utc::now(),
        price_cents: 2500,
        seats: (1..=8).map(|n| format!("A{n}")).collect(),
        unavailable_seats: vec!["A8".to_string()],
    });

    let locks: Arc<dyn SeatLockStore> = locks_impl;
    let hold_store: Arc<dyn HoldStore> = Arc::new(InMemoryHoldStore::new());
    let ledger = Arc::new(InMemoryOrderLedger::new());
    let catalog: Arc<dyn ShowCatalog> = catalog_impl.clone();
    let events: Arc<dyn EventSink> = events_impl.clone();
    let clock_dyn: Arc<dyn Clock> = clock.clone();

    let availability = Arc::new(AvailabilityAggregator::new(
        catalog.clone(),
        ledger.clone(),
        locks.clone(),
        clock_dyn.clone(),
        Duration::ZERO,
    ));
    let holds = Arc::new(HoldManager::new(
        locks.clone(),
        hold_store.clone(),
        catalog.clone(),
        availability.clone(),
        events.clone(),
        clock_dyn.clone(),
        HoldPolicy {
            ttl: Duration::from_secs(300),
            max_seats: 4,
        },
    ));
    let orders = Arc::new(OrderManager::new(
        ledger,
        hold_store,
        locks,
        catalog,
        availability.clone(),
        events,
        clock_dyn,
        OrderPolicy {
            ttl: Duration::from_secs(900),
        },
    ));

    let state = AppState {
        holds,
        orders,
        availability,
        auth: AuthConfig {
            secret: TEST_SECRET.to_string(),
            expiration: 3600,
        },
    };

    TestApp {
        router: app(state),
        clock,
        catalog: catalog_impl,
        events: events_impl,
        show_id,
    }
}

/// Obtain a guest bearer token through the real login route.
pub async fn guest_token(app: &TestApp) -> String {
    let (status, json) = send(app, "POST", "/v1/auth/guest", None, None).await;
    assert_eq!(status, StatusCode::OK);
    json["token"].as_str().unwrap().to_string()
}

pub async fn post_json(
    app: &TestApp,
    uri: &str,
    token: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "POST", uri, Some(token), Some(body)).await
}

pub async fn get_json(app: &TestApp, uri: &str, token: &str) -> (StatusCode, serde_json::Value) {
    send(app, "GET", uri, Some(token), None).await
}

pub async fn delete_json(app: &TestApp, uri: &str, token: &str) -> (StatusCode, serde_json::Value) {
    send(app, "DELETE", uri, Some(token), None).await
}

pub async fn get_public(app: &TestApp, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, "GET", uri, None, None).await
}

async fn send(
    app: &TestApp,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<&serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    (status, json)
}
