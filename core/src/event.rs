//! Tracking events reported by the carrier.

use crate::shipment::TrackingCode;
use crate::status;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One carrier status event for a shipment.
///
/// Events are append-only: once stored they are never updated or deleted. The
/// pair (`tracking_code`, `event_id`) identifies an event; storing the same pair
/// twice keeps the first copy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEvent {
    /// Shipment this event belongs to.
    pub tracking_code: TrackingCode,
    /// Carrier-assigned identifier, unique per tracking code.
    pub event_id: String,
    /// Numeric carrier status, see [`crate::status`].
    pub status_code: i32,
    /// Carrier-supplied description, or the catalog description as fallback.
    pub status_description: String,
    /// When the carrier recorded the event. Trusted as-is.
    pub event_timestamp: DateTime<Utc>,
    /// Who signed for the parcel (delivery confirmations only).
    pub received_by: Option<String>,
}

impl TrackingEvent {
    /// Create an event, filling an empty description from the status catalog.
    #[must_use]
    pub fn new(
        tracking_code: TrackingCode,
        event_id: impl Into<String>,
        status_code: i32,
        status_description: impl Into<String>,
        event_timestamp: DateTime<Utc>,
    ) -> Self {
        let status_description = status_description.into();
        let status_description = if status_description.trim().is_empty() {
            status::describe(status_code).to_string()
        } else {
            status_description
        };

        Self {
            tracking_code,
            event_id: event_id.into(),
            status_code,
            status_description,
            event_timestamp,
            received_by: None,
        }
    }

    /// Attach the name of whoever received the parcel.
    #[must_use]
    pub fn with_received_by(mut self, received_by: impl Into<String>) -> Self {
        self.received_by = Some(received_by.into());
        self
    }

    /// Whether this event puts the shipment in a terminal status.
    #[must_use]
    pub fn is_final(&self) -> bool {
        status::is_final(self.status_code)
    }
}
