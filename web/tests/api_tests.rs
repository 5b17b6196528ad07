//! Router tests over in-memory doubles, driven with `tower::ServiceExt::oneshot`.

#![allow(clippy::unwrap_used)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Duration;
use fm_tracking_core::{CarrierError, TrackingEventStore};
use fm_tracking_runtime::{Monitor, MonitorConfig, TrackingEnvironment};
use fm_tracking_testing::{TestHarness, base_time, event_at, shipment_at};
use fm_tracking_web::{AppState, DatabaseProbe, build_router};
use serde_json::{Value, json};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tower::ServiceExt;

struct StaticProbe(bool);

impl DatabaseProbe for StaticProbe {
    fn ping(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        let up = self.0;
        Box::pin(async move { up })
    }
}

fn app_with_database(harness: &TestHarness, database_up: bool) -> Router {
    let env = TrackingEnvironment {
        events: harness.events.clone(),
        shipments: harness.shipments.clone(),
        carrier: harness.carrier.clone(),
        clock: harness.clock.clone(),
    };
    build_router(AppState {
        monitor: Monitor::new(env, MonitorConfig::default()),
        shipments: harness.shipments.clone(),
        carrier: harness.carrier.clone(),
        clock: harness.clock.clone(),
        database: Arc::new(StaticProbe(database_up)),
    })
}

fn app(harness: &TestHarness) -> Router {
    app_with_database(harness, true)
}

async fn call(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn list_wraps_views_in_envelope() {
    let harness = TestHarness::new();
    harness.register(shipment_at("TRK1", 0)).await;
    harness.register(shipment_at("TRK2", 2)).await;
    harness.clock.set(base_time() + Duration::hours(30));

    let (status, body) = call(app(&harness), "GET", "/monitoring", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["total"], 2);
    assert_eq!(body["data"][0]["trackingCode"], "TRK2");
    assert_eq!(body["data"][1]["hoursSinceLastMovement"], 30);
    assert_eq!(body["data"][1]["alertActive"], true);
    assert_eq!(body["data"][1]["latestStatusDescription"], "Order created");
}

#[tokio::test]
async fn summary_counts() {
    let harness = TestHarness::new();
    harness.register(shipment_at("TRK1", 0)).await;
    harness.register(shipment_at("TRK2", 0)).await;
    harness.events.upsert(&event_at("TRK2", "E1", 5, 3)).await.unwrap();
    harness.clock.set(base_time() + Duration::hours(50));

    let (status, body) = call(app(&harness), "GET", "/monitoring/summary", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({"total": 2, "inTransit": 1, "delivered": 1, "stalled24h": 1, "stalled48h": 1})
    );
}

#[tokio::test]
async fn alerts_default_to_24_hours() {
    let harness = TestHarness::new();
    harness.register(shipment_at("OLD", 0)).await;
    harness.register(shipment_at("NEW", 20)).await;
    harness.clock.set(base_time() + Duration::hours(30));

    let (_, body) = call(app(&harness), "GET", "/monitoring/alerts", None).await;

    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["trackingCode"], "OLD");
    assert_eq!(body["data"][0]["priority"], "medium");
}

#[tokio::test]
async fn alerts_accept_min_hours_and_legacy_alias() {
    let harness = TestHarness::new();
    harness.register(shipment_at("OLD", 0)).await;
    harness.register(shipment_at("NEW", 20)).await;
    harness.clock.set(base_time() + Duration::hours(30));

    let (_, by_min_hours) = call(app(&harness), "GET", "/monitoring/alerts?minHours=5", None).await;
    let (_, by_alias) = call(app(&harness), "GET", "/monitoring/alerts?horas=5", None).await;

    assert_eq!(by_min_hours["total"], 2);
    assert_eq!(by_alias["total"], 2);
    assert_eq!(by_min_hours["data"][1]["priority"], "normal");
}

#[tokio::test]
async fn alerts_reject_non_numeric_threshold() {
    let harness = TestHarness::new();

    let (status, body) = call(app(&harness), "GET", "/monitoring/alerts?minHours=abc", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn empty_threshold_uses_default() {
    let harness = TestHarness::new();
    harness.register(shipment_at("OLD", 0)).await;
    harness.register(shipment_at("NEW", 20)).await;
    harness.clock.set(base_time() + Duration::hours(30));

    let (status, body) = call(app(&harness), "GET", "/monitoring/alerts?minHours=", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["trackingCode"], "OLD");
}

#[tokio::test]
async fn detail_of_unknown_shipment_is_404() {
    let harness = TestHarness::new();

    let (status, body) = call(app(&harness), "GET", "/monitoring/NOPE", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(harness.carrier.call_count(), 0);
}

#[tokio::test]
async fn detail_syncs_and_reports_freshness() {
    let harness = TestHarness::new();
    harness.register(shipment_at("TRK1", 0)).await;
    harness
        .carrier
        .respond_with("TRK1", vec![event_at("TRK1", "E1", 2, 1), event_at("TRK1", "E2", 3, 4)]);

    let (status, body) = call(app(&harness), "GET", "/monitoring/TRK1", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["freshness"], "live");
    assert_eq!(body["data"]["shipment"]["latestStatusCode"], 3);
    assert_eq!(body["data"]["events"][0]["eventId"], "E2");
    assert_eq!(body["data"]["events"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn detail_falls_back_to_stored_history() {
    let harness = TestHarness::new();
    harness.register(shipment_at("TRK1", 0)).await;
    harness.events.upsert(&event_at("TRK1", "E1", 3, 1)).await.unwrap();
    harness.carrier.fail_with("TRK1", CarrierError::Timeout);

    let (status, body) = call(app(&harness), "POST", "/monitoring/TRK1/sync", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["freshness"], "stored");
    assert_eq!(body["data"]["events"][0]["eventId"], "E1");
}

#[tokio::test(start_paused = true)]
async fn manual_sweep_reports_counts() {
    let harness = TestHarness::new();
    harness.register(shipment_at("S1", 0)).await;
    harness.register(shipment_at("S2", 1)).await;
    harness.carrier.fail_with("S2", CarrierError::RequestFailed("reset".to_string()));

    let (status, body) = call(app(&harness), "POST", "/monitoring/sync", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({"updated": 1, "errors": 1}));
    assert_eq!(body["message"], "Sync finished: 1 updated, 1 errors");
}

#[tokio::test]
async fn account_feed_sync_stores_events() {
    let harness = TestHarness::new();
    harness.register(shipment_at("TRK1", 0)).await;
    harness.events.upsert(&event_at("TRK1", "E1", 2, 1)).await.unwrap();
    harness
        .carrier
        .respond_to_feed(vec![event_at("TRK1", "E1", 2, 1), event_at("TRK1", "E2", 3, 5)]);

    let (status, body) = call(app(&harness), "POST", "/monitoring/sync/feed", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({"fetched": 2, "inserted": 1, "duplicates": 1, "failed": 0})
    );
    assert_eq!(body["message"], "Feed stored: 1 new, 1 duplicates, 0 failed");
    assert_eq!(harness.carrier.call_log(), vec![None]);
}

#[tokio::test]
async fn account_feed_sync_reports_carrier_outage() {
    let harness = TestHarness::new();
    harness.carrier.fail_feed_with(CarrierError::Timeout);

    let (status, body) = call(app(&harness), "POST", "/monitoring/sync/feed", None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert!(harness.events.is_empty());
}

#[tokio::test]
async fn registering_twice_is_created_then_ok() {
    let harness = TestHarness::new();
    let payload = json!({
        "trackingCode": "TRK1",
        "orderNumber": "1001",
        "customerName": "Maria",
        "destinationSummary": "Campinas - SP",
        "dispatchedAt": "2025-01-01T00:00:00Z"
    });

    let (first, body) = call(app(&harness), "POST", "/shipments", Some(payload.clone())).await;
    let (second, _) = call(app(&harness), "POST", "/shipments", Some(payload)).await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(body["data"]["trackingCode"], "TRK1");
    assert_eq!(second, StatusCode::OK);
    assert_eq!(harness.shipments.len(), 1);
}

#[tokio::test]
async fn registering_without_tracking_code_is_422() {
    let harness = TestHarness::new();

    let (status, body) = call(
        app(&harness),
        "POST",
        "/shipments",
        Some(json!({"trackingCode": " ", "orderNumber": "1001"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(harness.shipments.is_empty());
}

#[tokio::test]
async fn readiness_reports_degraded_carrier() {
    let harness = TestHarness::new();
    harness.carrier.set_reachable(false);

    let (status, body) = call(app(&harness), "GET", "/health/ready", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "degraded", "database": true, "carrier": false}));
}

#[tokio::test]
async fn readiness_fails_without_database() {
    let harness = TestHarness::new();

    let app = app_with_database(&harness, false);
    let (status, body) = call(app, "GET", "/health/ready", None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
}

#[tokio::test]
async fn readiness_healthy() {
    let harness = TestHarness::new();

    let (status, body) = call(app(&harness), "GET", "/health/ready", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn responses_carry_correlation_id() {
    let harness = TestHarness::new();
    let response = app(&harness)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(fm_tracking_web::CORRELATION_ID_HEADER));
}
