//! Monitoring endpoints consumed by the dispatch dashboard.

use crate::error::AppError;
use crate::middleware::CorrelationId;
use crate::response::ApiResponse;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use fm_tracking_core::TrackingCode;
use fm_tracking_runtime::state::STALLED_MEDIUM_HOURS;
use fm_tracking_runtime::{
    AlertEntry, MonitorSummary, ShipmentDetail, ShipmentView, SweepSummary, SyncReport,
};
use serde::Deserialize;

/// Query of `GET /monitoring/alerts`.
#[derive(Debug, Default, Deserialize)]
pub struct AlertsQuery {
    /// Minimum hours without movement. `horas` is accepted for older clients.
    /// An empty value means the default.
    #[serde(rename = "minHours", alias = "horas")]
    pub min_hours: Option<String>,
}

impl AlertsQuery {
    /// Parsed threshold, defaulting to 24 and clamped at zero.
    ///
    /// # Errors
    ///
    /// Returns 400 for a non-numeric value.
    pub fn threshold(&self) -> Result<i64, AppError> {
        let Some(raw) = self.min_hours.as_deref().map(str::trim).filter(|raw| !raw.is_empty())
        else {
            return Ok(STALLED_MEDIUM_HOURS);
        };
        raw.parse::<i64>()
            .map(|hours| hours.max(0))
            .map_err(|_| AppError::bad_request(format!("Invalid minHours: {raw}")))
    }
}

/// List all shipments with derived state.
///
/// ```text
/// GET /monitoring
/// ```
///
/// # Errors
///
/// Returns 500 if storage cannot be read.
pub async fn list_shipments(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ShipmentView>>>, AppError> {
    let shipments = state.monitor.list_shipments().await?;
    Ok(Json(ApiResponse::list(shipments)))
}

/// Counts by status and staleness.
///
/// ```text
/// GET /monitoring/summary
/// ```
///
/// # Errors
///
/// Returns 500 if storage cannot be read.
pub async fn summary(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<MonitorSummary>>, AppError> {
    let summary = state.monitor.summary().await?;
    Ok(Json(ApiResponse::ok(summary)))
}

/// Stalled shipments with priority.
///
/// ```text
/// GET /monitoring/alerts?minHours=24
/// ```
///
/// # Errors
///
/// Returns 400 for a non-numeric `minHours`, 500 if storage cannot be read.
pub async fn alerts(
    State(state): State<AppState>,
    query: Result<Query<AlertsQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<AlertEntry>>>, AppError> {
    let Query(query) = query.map_err(|e| AppError::bad_request(format!("Invalid query: {e}")))?;
    let min_hours = query.threshold()?;

    let alerts = state.monitor.alerts(min_hours).await?;
    Ok(Json(ApiResponse::list(alerts)))
}

/// Sync one shipment with the carrier, then return its history.
///
/// ```text
/// GET /monitoring/{trackingCode}
/// POST /monitoring/{trackingCode}/sync
/// ```
///
/// # Errors
///
/// Returns 404 if the shipment is not registered, 500 if storage cannot be read.
pub async fn shipment_detail(
    State(state): State<AppState>,
    Path(tracking_code): Path<String>,
) -> Result<Json<ApiResponse<ShipmentDetail>>, AppError> {
    let tracking_code = TrackingCode::new(tracking_code);
    let detail = state
        .monitor
        .shipment_detail(&tracking_code)
        .await?
        .ok_or_else(|| AppError::not_found("Shipment", &tracking_code))?;

    Ok(Json(ApiResponse::ok(detail)))
}

/// Sweep all open shipments through the carrier.
///
/// Blocks until the sweep finishes; at one call per second this can take
/// minutes for large registries.
///
/// ```text
/// POST /monitoring/sync
/// ```
///
/// # Errors
///
/// Returns 500 if the registry cannot be read.
pub async fn sync_all(
    State(state): State<AppState>,
    CorrelationId(correlation_id): CorrelationId,
) -> Result<Json<ApiResponse<SweepSummary>>, AppError> {
    tracing::info!(correlation_id = %correlation_id, "Manual tracking sweep requested");

    let summary = state.monitor.sync_all().await?;
    let message = format!(
        "Sync finished: {} updated, {} errors",
        summary.updated, summary.errors
    );
    Ok(Json(ApiResponse::ok(summary).with_message(message)))
}

/// Pull the carrier's account-wide feed and store every event.
///
/// Events of unregistered shipments are stored but stay out of the views.
///
/// ```text
/// POST /monitoring/sync/feed
/// ```
///
/// # Errors
///
/// Returns 503 if the carrier call fails.
pub async fn sync_account_feed(
    State(state): State<AppState>,
    CorrelationId(correlation_id): CorrelationId,
) -> Result<Json<ApiResponse<SyncReport>>, AppError> {
    tracing::info!(correlation_id = %correlation_id, "Account feed sync requested");

    let report = state.monitor.sync_account_feed().await?;
    let message = format!(
        "Feed stored: {} new, {} duplicates, {} failed",
        report.inserted, report.duplicates, report.failed
    );
    Ok(Json(ApiResponse::ok(report).with_message(message)))
}
