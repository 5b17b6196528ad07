//! HTTP-level tests for the FM Transportes client against a wiremock server.

#![allow(clippy::unwrap_used)]

use fm_tracking_carrier::{CarrierConfig, FmTransportesClient};
use fm_tracking_core::{CarrierError, CarrierTracking, TrackingCode};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{basic_auth, body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> FmTransportesClient {
    FmTransportesClient::new(CarrierConfig {
        base_url: format!("{}/api", server.uri()),
        user: "apikey".to_string(),
        password: "secret".to_string(),
        client_document: "12345678000199".to_string(),
        timeout: Duration::from_millis(500),
    })
    .unwrap()
}

#[tokio::test]
async fn fetches_events_for_one_shipment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/tracking"))
        .and(basic_auth("apikey", "secret"))
        .and(body_json(json!({
            "clientDocument": "12345678000199",
            "trackingCode": "TRK1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                {
                    "trackingId": "E2",
                    "trackingCode": "TRK1",
                    "status": 5,
                    "statusDescription": "Entregue",
                    "eventTimestamp": "2025-03-11T15:00:00Z",
                    "receivedBy": "Joao"
                },
                {
                    "trackingId": "E1",
                    "trackingCode": "TRK1",
                    "status": 2,
                    "statusDescription": "",
                    "eventTimestamp": "2025-03-10T09:00:00Z"
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let events = client
        .fetch_events(Some(&TrackingCode::new("TRK1")))
        .await
        .unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event_id, "E2");
    assert_eq!(events[0].received_by.as_deref(), Some("Joao"));
    assert_eq!(events[1].status_description, "Collected");
}

#[tokio::test]
async fn account_feed_omits_tracking_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/tracking"))
        .and(body_json(json!({ "clientDocument": "12345678000199" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let events = client_for(&server).tracking(None).await.unwrap();
    assert!(events.is_empty());
}

#[tokio::test]
async fn success_false_is_a_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/tracking"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "Documento invalido"
        })))
        .mount(&server)
        .await;

    let error = client_for(&server).tracking(None).await.unwrap_err();
    assert_eq!(error, CarrierError::Rejected("Documento invalido".to_string()));
}

#[tokio::test]
async fn http_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/tracking"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let error = client_for(&server).tracking(None).await.unwrap_err();
    assert_eq!(
        error,
        CarrierError::Api {
            status: 502,
            message: "bad gateway".to_string()
        }
    );
}

#[tokio::test]
async fn malformed_body_is_a_parse_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/tracking"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let error = client_for(&server).tracking(None).await.unwrap_err();
    assert!(matches!(error, CarrierError::ResponseParseFailed(_)));
}

#[tokio::test]
async fn slow_carrier_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/tracking"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "data": [] }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let error = client_for(&server).tracking(None).await.unwrap_err();
    assert_eq!(error, CarrierError::Timeout);
}

#[tokio::test]
async fn unreadable_events_are_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/tracking"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                {
                    "trackingId": "E1",
                    "trackingCode": "TRK1",
                    "status": 3,
                    "eventTimestamp": "not a date"
                },
                {
                    "trackingId": "E2",
                    "trackingCode": "TRK1",
                    "status": 3,
                    "dataEvento": "2025-03-10 10:00:00"
                }
            ]
        })))
        .mount(&server)
        .await;

    let events = client_for(&server).tracking(None).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_id, "E2");
}

#[tokio::test]
async fn null_timestamp_keeps_the_rest_of_the_batch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/tracking"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                {
                    "trackingId": "E1",
                    "trackingCode": "TRK1",
                    "status": 3,
                    "eventTimestamp": "2025-03-10T12:00:00Z"
                },
                {
                    "trackingId": "E2",
                    "trackingCode": "TRK1",
                    "status": 4,
                    "eventTimestamp": null
                }
            ]
        })))
        .mount(&server)
        .await;

    let events = client_for(&server)
        .tracking(Some(&TrackingCode::new("TRK1")))
        .await
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_id, "E1");
}

#[tokio::test]
async fn connectivity_probe_reads_success_flag() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/quote"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    assert!(client_for(&server).is_reachable().await);
}

#[tokio::test]
async fn connectivity_probe_fails_on_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/quote"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "success": false })))
        .mount(&server)
        .await;

    assert!(!client_for(&server).check_connection().await);
}
