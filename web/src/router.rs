//! Route table.

use crate::handlers::{health, monitoring, shipments};
use crate::middleware::correlation_id_layer;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Build the API router.
///
/// CORS and request tracing are added by the server binary, which owns their
/// configuration.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness))
        .route("/monitoring", get(monitoring::list_shipments))
        .route("/monitoring/summary", get(monitoring::summary))
        .route("/monitoring/alerts", get(monitoring::alerts))
        .route("/monitoring/sync", post(monitoring::sync_all))
        .route("/monitoring/sync/feed", post(monitoring::sync_account_feed))
        .route("/monitoring/:tracking_code", get(monitoring::shipment_detail))
        .route(
            "/monitoring/:tracking_code/sync",
            post(monitoring::shipment_detail),
        )
        .route("/shipments", post(shipments::register_shipment))
        .layer(correlation_id_layer())
        .with_state(state)
}
