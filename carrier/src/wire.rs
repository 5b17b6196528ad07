//! Request and response bodies of the FM Transportes tracking API.

use chrono::{DateTime, NaiveDateTime, Utc};
use fm_tracking_core::{TrackingCode, TrackingEvent};
use serde::{Deserialize, Serialize};

/// Body of `POST /v1/tracking`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrackingRequest {
    /// CNPJ of the client account.
    pub client_document: String,
    /// Restrict the feed to one shipment. Omitted for the whole account feed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_code: Option<String>,
}

/// Response of `POST /v1/tracking`.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackingResponse {
    /// Whether the carrier accepted the request.
    pub success: bool,
    /// Events, newest first as sent by the carrier. Absent on failure.
    ///
    /// Kept raw so one malformed element cannot fail the whole batch.
    #[serde(default)]
    pub data: Option<Vec<serde_json::Value>>,
    /// Failure explanation.
    #[serde(default)]
    pub message: Option<String>,
}

/// One event as the carrier serializes it.
///
/// The carrier's Portuguese field names are accepted as aliases.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEvent {
    /// Carrier event identifier (string or number on the wire).
    pub tracking_id: serde_json::Value,
    /// Shipment tracking code.
    pub tracking_code: String,
    /// Numeric status.
    pub status: i32,
    /// Carrier description of the status.
    #[serde(default, alias = "statusDescricao")]
    pub status_description: Option<String>,
    /// Event time.
    #[serde(alias = "dataEvento")]
    pub event_timestamp: String,
    /// Who signed for the parcel.
    #[serde(default)]
    pub received_by: Option<String>,
}

impl RemoteEvent {
    /// Convert to a domain event.
    ///
    /// Returns `None` when the timestamp cannot be parsed or the event id is
    /// missing.
    #[must_use]
    pub fn into_event(self) -> Option<TrackingEvent> {
        let event_id = match &self.tracking_id {
            serde_json::Value::String(id) if !id.is_empty() => id.clone(),
            serde_json::Value::Number(id) => id.to_string(),
            _ => return None,
        };
        let event_timestamp = parse_timestamp(&self.event_timestamp)?;

        let mut event = TrackingEvent::new(
            TrackingCode::new(self.tracking_code),
            event_id,
            self.status,
            self.status_description.unwrap_or_default(),
            event_timestamp,
        );
        event.received_by = self.received_by.filter(|name| !name.trim().is_empty());
        Some(event)
    }
}

/// Decode the raw event list, skipping elements that cannot be read.
///
/// An element is skipped when it does not deserialize (missing or null
/// timestamp, non-numeric status) or when its id or timestamp is unreadable.
#[must_use]
pub fn decode_events(raw: Vec<serde_json::Value>) -> Vec<TrackingEvent> {
    raw.into_iter()
        .filter_map(|value| {
            let event_id = value.get("trackingId").map(ToString::to_string);
            let event = match serde_json::from_value::<RemoteEvent>(value) {
                Ok(remote) => remote.into_event(),
                Err(e) => {
                    tracing::warn!(
                        event_id = ?event_id,
                        error = %e,
                        "Skipping malformed carrier event"
                    );
                    return None;
                }
            };
            if event.is_none() {
                tracing::warn!(
                    event_id = ?event_id,
                    "Skipping carrier event with unreadable id or timestamp"
                );
            }
            event
        })
        .collect()
}

/// Parse a carrier timestamp.
///
/// Accepts RFC 3339, and naive `YYYY-MM-DDTHH:MM:SS[.f]` / `YYYY-MM-DD HH:MM:SS`
/// which are read as UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}
