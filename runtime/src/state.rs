//! Per-shipment state derived from the registry and the event store.
//!
//! Nothing in this module is persisted. Every read recomputes the state from the
//! latest stored event and the current time, so the views can never drift from
//! the event history.

use chrono::{DateTime, Utc};
use fm_tracking_core::{ShipmentRecord, TrackingCode, TrackingEvent, status};
use serde::Serialize;
use std::cmp::Ordering;

/// Hours without movement that make an alert `medium`, and the first stalled bucket.
pub const STALLED_MEDIUM_HOURS: i64 = 24;

/// Hours without movement that make an alert `high`, and the second stalled bucket.
pub const STALLED_HIGH_HOURS: i64 = 48;

/// Urgency of a stalled shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Below the medium threshold.
    Normal,
    /// At least [`STALLED_MEDIUM_HOURS`] without movement.
    Medium,
    /// At least [`STALLED_HIGH_HOURS`] without movement.
    High,
}

impl Priority {
    /// Classify a staleness in hours.
    #[must_use]
    pub const fn from_hours(hours: i64) -> Self {
        if hours >= STALLED_HIGH_HOURS {
            Self::High
        } else if hours >= STALLED_MEDIUM_HOURS {
            Self::Medium
        } else {
            Self::Normal
        }
    }
}

/// Live state of one shipment at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedShipmentState {
    /// Status of the newest event, or `0` when none exists.
    pub latest_status_code: i32,
    /// Description of the newest event, or the catalog description of `0`.
    pub latest_status_description: String,
    /// Newest event timestamp or dispatch time, whichever is later.
    pub last_movement_at: DateTime<Utc>,
    /// Whole hours since `last_movement_at`, clamped at zero.
    pub hours_since_last_movement: i64,
    /// Stalled past the threshold and not terminal.
    pub alert_active: bool,
    /// Whether the latest status is terminal.
    pub is_final: bool,
}

impl DerivedShipmentState {
    /// Derive the state of `shipment` given its newest event.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{Duration, TimeZone, Utc};
    /// use fm_tracking_core::{ShipmentRecord, TrackingCode};
    /// use fm_tracking_runtime::state::DerivedShipmentState;
    ///
    /// let dispatched_at = Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap();
    /// let shipment = ShipmentRecord {
    ///     tracking_code: TrackingCode::new("TRK1"),
    ///     order_number: "1001".to_string(),
    ///     customer_name: "Maria".to_string(),
    ///     customer_phone: None,
    ///     destination_summary: "Campinas - SP".to_string(),
    ///     dispatched_at,
    /// };
    ///
    /// let now = dispatched_at + Duration::hours(30);
    /// let state = DerivedShipmentState::derive(&shipment, None, now, 24);
    /// assert_eq!(state.latest_status_code, 0);
    /// assert_eq!(state.hours_since_last_movement, 30);
    /// assert!(state.alert_active);
    /// ```
    #[must_use]
    pub fn derive(
        shipment: &ShipmentRecord,
        latest: Option<&TrackingEvent>,
        now: DateTime<Utc>,
        alert_threshold_hours: i64,
    ) -> Self {
        let (latest_status_code, latest_status_description, last_movement_at) = match latest {
            Some(event) => (
                event.status_code,
                event.status_description.clone(),
                event.event_timestamp.max(shipment.dispatched_at),
            ),
            None => (
                status::STATUS_CREATED,
                status::describe(status::STATUS_CREATED).to_string(),
                shipment.dispatched_at,
            ),
        };

        let hours_since_last_movement = (now - last_movement_at).num_hours().max(0);
        let is_final = status::is_final(latest_status_code);

        Self {
            latest_status_code,
            latest_status_description,
            last_movement_at,
            hours_since_last_movement,
            alert_active: !is_final && hours_since_last_movement >= alert_threshold_hours,
            is_final,
        }
    }
}

/// A registered shipment together with its derived state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentView {
    /// Registry row.
    #[serde(flatten)]
    pub shipment: ShipmentRecord,
    /// State at read time.
    #[serde(flatten)]
    pub state: DerivedShipmentState,
}

impl ShipmentView {
    /// Tracking code of the underlying shipment.
    #[must_use]
    pub const fn tracking_code(&self) -> &TrackingCode {
        &self.shipment.tracking_code
    }
}

/// Listing order: newest dispatch first, then tracking code ascending.
pub(crate) fn by_dispatch_desc(a: &ShipmentView, b: &ShipmentView) -> Ordering {
    b.shipment
        .dispatched_at
        .cmp(&a.shipment.dispatched_at)
        .then_with(|| a.tracking_code().cmp(b.tracking_code()))
}

/// Counts across all registered shipments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorSummary {
    /// Registered shipments.
    pub total: usize,
    /// Shipments not yet in a terminal status.
    pub in_transit: usize,
    /// Shipments in a terminal status (delivered, returned, lost, cancelled).
    pub delivered: usize,
    /// Non-terminal shipments stalled at least 24 hours.
    #[serde(rename = "stalled24h")]
    pub stalled_24h: usize,
    /// Non-terminal shipments stalled at least 48 hours.
    #[serde(rename = "stalled48h")]
    pub stalled_48h: usize,
}

/// Aggregate derived states into a summary.
///
/// `total == in_transit + delivered` always holds.
#[must_use]
pub fn summarize<'a>(states: impl IntoIterator<Item = &'a DerivedShipmentState>) -> MonitorSummary {
    states
        .into_iter()
        .fold(MonitorSummary::default(), |mut summary, state| {
            summary.total += 1;
            if state.is_final {
                summary.delivered += 1;
            } else {
                summary.in_transit += 1;
                if state.hours_since_last_movement >= STALLED_MEDIUM_HOURS {
                    summary.stalled_24h += 1;
                }
                if state.hours_since_last_movement >= STALLED_HIGH_HOURS {
                    summary.stalled_48h += 1;
                }
            }
            summary
        })
}

/// A stalled shipment reported by the alerts view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertEntry {
    /// The stalled shipment.
    #[serde(flatten)]
    pub view: ShipmentView,
    /// Urgency derived from the hours without movement.
    pub priority: Priority,
}

/// Select non-terminal shipments stalled at least `min_hours`.
///
/// Sorted by hours without movement descending, then tracking code ascending.
#[must_use]
pub fn collect_alerts(views: Vec<ShipmentView>, min_hours: i64) -> Vec<AlertEntry> {
    let mut alerts: Vec<AlertEntry> = views
        .into_iter()
        .filter(|view| !view.state.is_final && view.state.hours_since_last_movement >= min_hours)
        .map(|view| AlertEntry {
            priority: Priority::from_hours(view.state.hours_since_last_movement),
            view,
        })
        .collect();

    alerts.sort_by(|a, b| {
        b.view
            .state
            .hours_since_last_movement
            .cmp(&a.view.state.hours_since_last_movement)
            .then_with(|| a.view.tracking_code().cmp(b.view.tracking_code()))
    });
    alerts
}
