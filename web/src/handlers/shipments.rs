//! Shipment registration, called by the send workflow once the carrier accepts
//! an order.

use crate::error::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use fm_tracking_core::{ShipmentRecord, TrackingCode};
use serde::Deserialize;

/// Body of `POST /shipments`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterShipmentRequest {
    /// Carrier tracking code.
    pub tracking_code: String,
    /// ERP order number.
    pub order_number: String,
    /// Recipient name.
    #[serde(default)]
    pub customer_name: String,
    /// Recipient phone.
    #[serde(default)]
    pub customer_phone: Option<String>,
    /// Destination, e.g. `"Campinas - SP"`.
    #[serde(default)]
    pub destination_summary: String,
    /// Dispatch time; defaults to now.
    #[serde(default)]
    pub dispatched_at: Option<DateTime<Utc>>,
}

impl RegisterShipmentRequest {
    fn into_record(self, now: DateTime<Utc>) -> Result<ShipmentRecord, AppError> {
        let tracking_code: TrackingCode = self
            .tracking_code
            .parse()
            .map_err(|_| AppError::validation("trackingCode is required"))?;

        let order_number = self.order_number.trim();
        if order_number.is_empty() {
            return Err(AppError::validation("orderNumber is required"));
        }

        Ok(ShipmentRecord {
            tracking_code,
            order_number: order_number.to_string(),
            customer_name: self.customer_name.trim().to_string(),
            customer_phone: self
                .customer_phone
                .map(|phone| phone.trim().to_string())
                .filter(|phone| !phone.is_empty()),
            destination_summary: self.destination_summary.trim().to_string(),
            dispatched_at: self.dispatched_at.unwrap_or(now),
        })
    }
}

/// Register a dispatched shipment.
///
/// ```text
/// POST /shipments
/// ```
///
/// Returns 201 when the shipment is new, 200 when the tracking code was already
/// registered (the stored row is left untouched).
///
/// # Errors
///
/// Returns 400 for a malformed body, 422 for an empty `trackingCode` or
/// `orderNumber`, 500 if the registry cannot be written.
pub async fn register_shipment(
    State(state): State<AppState>,
    body: Result<Json<RegisterShipmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<ShipmentRecord>>), AppError> {
    let Json(request) = body.map_err(|e| AppError::bad_request(format!("Invalid body: {e}")))?;
    let shipment = request.into_record(state.clock.now())?;

    let inserted = state.shipments.register(&shipment).await?;
    if inserted {
        tracing::info!(
            tracking_code = %shipment.tracking_code,
            order_number = %shipment.order_number,
            "Shipment registered"
        );
        Ok((
            StatusCode::CREATED,
            Json(ApiResponse::ok(shipment).with_message("Shipment registered")),
        ))
    } else {
        Ok((
            StatusCode::OK,
            Json(ApiResponse::ok(shipment).with_message("Shipment already registered")),
        ))
    }
}
