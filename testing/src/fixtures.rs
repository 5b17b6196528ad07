//! Fixtures and a harness bundling all doubles.

use crate::carrier::MockCarrierClient;
use crate::mocks::{FixedClock, test_clock};
use crate::stores::{InMemoryEventStore, InMemoryShipmentRegistry};
use chrono::{DateTime, Duration, Utc};
use fm_tracking_core::{ShipmentRecord, ShipmentRegistry, TrackingCode, TrackingEvent};
use std::sync::Arc;

/// Reference instant for fixtures: 2025-01-01 00:00:00 UTC.
#[must_use]
pub fn base_time() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap_or_default()
}

/// A shipment dispatched `hours` after [`base_time`].
#[must_use]
pub fn shipment_at(tracking_code: &str, hours: i64) -> ShipmentRecord {
    ShipmentRecord {
        tracking_code: TrackingCode::new(tracking_code),
        order_number: format!("ORD-{tracking_code}"),
        customer_name: "Maria Silva".to_string(),
        customer_phone: Some("11999990000".to_string()),
        destination_summary: "Campinas - SP".to_string(),
        dispatched_at: base_time() + Duration::hours(hours),
    }
}

/// A carrier event at `hours` after [`base_time`], described from the catalog.
#[must_use]
pub fn event_at(
    tracking_code: &str,
    event_id: &str,
    status_code: i32,
    hours: i64,
) -> TrackingEvent {
    TrackingEvent::new(
        TrackingCode::new(tracking_code),
        event_id,
        status_code,
        "",
        base_time() + Duration::hours(hours),
    )
}

/// All test doubles, shared behind `Arc`s.
///
/// The clock starts at [`base_time`].
#[derive(Clone, Debug)]
pub struct TestHarness {
    /// Event store.
    pub events: Arc<InMemoryEventStore>,
    /// Shipment registry.
    pub shipments: Arc<InMemoryShipmentRegistry>,
    /// Scripted carrier.
    pub carrier: Arc<MockCarrierClient>,
    /// Settable clock.
    pub clock: Arc<FixedClock>,
}

impl TestHarness {
    /// Create a harness with empty stores and a reachable carrier.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(InMemoryEventStore::new()),
            shipments: Arc::new(InMemoryShipmentRegistry::new()),
            carrier: Arc::new(MockCarrierClient::new()),
            clock: Arc::new(test_clock()),
        }
    }

    /// Register a shipment.
    pub async fn register(&self, shipment: ShipmentRecord) {
        self.shipments.register(&shipment).await.unwrap();
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
