//! Read-side views over registered shipments.

use crate::config::MonitorConfig;
use crate::state::{self, AlertEntry, DerivedShipmentState, MonitorSummary, ShipmentView};
use crate::synchronizer::{SweepSummary, SyncReport, TrackingSynchronizer};
use crate::{SyncError, TrackingEnvironment};
use fm_tracking_core::{ShipmentRecord, StoreError, TrackingCode, TrackingEvent};
use futures::future::try_join_all;
use serde::Serialize;

/// Where the events of a detail view came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Freshness {
    /// The carrier answered; stored history includes its latest events.
    Live,
    /// The carrier call failed; only previously stored history is shown.
    Stored,
}

/// One shipment with its full event history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentDetail {
    /// Shipment and derived state.
    pub shipment: ShipmentView,
    /// Stored events, newest first.
    pub events: Vec<TrackingEvent>,
    /// Outcome of the sync that preceded the read.
    pub freshness: Freshness,
}

/// Joins the shipment registry with the event store.
///
/// Shipments without a registry row never appear, even if events exist for
/// them.
#[derive(Clone)]
pub struct Monitor {
    env: TrackingEnvironment,
    config: MonitorConfig,
    synchronizer: TrackingSynchronizer,
}

impl Monitor {
    /// Create a monitor and its synchronizer over the same environment.
    #[must_use]
    pub fn new(env: TrackingEnvironment, config: MonitorConfig) -> Self {
        let synchronizer = TrackingSynchronizer::new(env.clone(), config.clone());
        Self {
            env,
            config,
            synchronizer,
        }
    }

    /// The synchronizer used for detail reads.
    #[must_use]
    pub const fn synchronizer(&self) -> &TrackingSynchronizer {
        &self.synchronizer
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// All registered shipments, newest dispatch first.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the registry or event store cannot be read.
    pub async fn list_shipments(&self) -> Result<Vec<ShipmentView>, StoreError> {
        let mut views = self.load_views().await?;
        views.sort_by(state::by_dispatch_desc);
        Ok(views)
    }

    /// Sync one shipment with the carrier, then read its stored history.
    ///
    /// Returns `Ok(None)` if the shipment is not registered; the carrier is not
    /// called in that case. A failed carrier call is not an error: the stored
    /// history is served with [`Freshness::Stored`].
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the stored history cannot be read.
    #[tracing::instrument(skip_all, fields(tracking_code = %tracking_code))]
    pub async fn shipment_detail(
        &self,
        tracking_code: &TrackingCode,
    ) -> Result<Option<ShipmentDetail>, StoreError> {
        let Some(shipment) = self.env.shipments.get_by_tracking_code(tracking_code).await? else {
            return Ok(None);
        };

        let freshness = match self.synchronizer.sync_one(tracking_code).await {
            Ok(_) => Freshness::Live,
            Err(SyncError::Carrier(_)) => Freshness::Stored,
            Err(SyncError::Storage(error)) => return Err(error),
        };

        let events = self.env.events.list_by_tracking_code(tracking_code).await?;
        let state = DerivedShipmentState::derive(
            &shipment,
            events.first(),
            self.env.clock.now(),
            self.config.alert_threshold_hours,
        );

        Ok(Some(ShipmentDetail {
            shipment: ShipmentView { shipment, state },
            events,
            freshness,
        }))
    }

    /// Counts by terminal status and staleness bucket.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the registry or event store cannot be read.
    pub async fn summary(&self) -> Result<MonitorSummary, StoreError> {
        let views = self.load_views().await?;
        Ok(state::summarize(views.iter().map(|view| &view.state)))
    }

    /// Non-terminal shipments without movement for at least `min_hours`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the registry or event store cannot be read.
    #[tracing::instrument(skip(self))]
    pub async fn alerts(&self, min_hours: i64) -> Result<Vec<AlertEntry>, StoreError> {
        let views = self.load_views().await?;
        Ok(state::collect_alerts(views, min_hours))
    }

    /// Sweep all open shipments through the synchronizer.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Storage`] if the shipments to sweep cannot be read.
    pub async fn sync_all(&self) -> Result<SweepSummary, SyncError> {
        self.synchronizer.sync_all().await
    }

    /// Pull the whole account feed and store it.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Carrier`] if the carrier call fails.
    pub async fn sync_account_feed(&self) -> Result<SyncReport, SyncError> {
        self.synchronizer.sync_account_feed().await
    }

    async fn load_views(&self) -> Result<Vec<ShipmentView>, StoreError> {
        let shipments = self.env.shipments.list_all().await?;
        let now = self.env.clock.now();

        try_join_all(shipments.into_iter().map(|shipment| self.view_of(shipment, now))).await
    }

    async fn view_of(
        &self,
        shipment: ShipmentRecord,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<ShipmentView, StoreError> {
        let latest = self
            .env
            .events
            .latest_by_tracking_code(&shipment.tracking_code)
            .await?;
        let state = DerivedShipmentState::derive(
            &shipment,
            latest.as_ref(),
            now,
            self.config.alert_threshold_hours,
        );
        Ok(ShipmentView { shipment, state })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::state::Priority;
    use crate::test_support::environment;
    use chrono::Duration;
    use fm_tracking_core::{CarrierError, TrackingEventStore};
    use fm_tracking_testing::{TestHarness, base_time, event_at, shipment_at};

    fn monitor(harness: &TestHarness) -> Monitor {
        Monitor::new(environment(harness), MonitorConfig::default())
    }

    #[tokio::test]
    async fn shipment_without_events_alerts_after_threshold() {
        let harness = TestHarness::new();
        harness.register(shipment_at("TRK1", 0)).await;
        harness.clock.set(base_time() + Duration::hours(30));
        let monitor = monitor(&harness);

        let list = monitor.list_shipments().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].state.latest_status_code, 0);
        assert_eq!(list[0].state.hours_since_last_movement, 30);
        assert!(list[0].state.alert_active);

        let alerts = monitor.alerts(24).await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].view.state.hours_since_last_movement, 30);
        assert_eq!(alerts[0].priority, Priority::Medium);

        let summary = monitor.summary().await.unwrap();
        assert!(summary.stalled_24h >= 1);
        assert_eq!(summary.stalled_48h, 0);
    }

    #[tokio::test]
    async fn staleness_is_measured_at_read_time() {
        let harness = TestHarness::new();
        harness.register(shipment_at("TRK1", 0)).await;
        let monitor = monitor(&harness);

        harness.clock.set(base_time() + Duration::hours(23));
        assert!(monitor.alerts(24).await.unwrap().is_empty());

        harness.clock.set(base_time() + Duration::hours(25));
        assert_eq!(monitor.alerts(24).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn priority_boundary_at_48_hours() {
        let harness = TestHarness::new();
        harness.register(shipment_at("HIGH", 0)).await;
        harness.register(shipment_at("MEDIUM", 1)).await;
        harness.clock.set(base_time() + Duration::hours(48));
        let monitor = monitor(&harness);

        let alerts = monitor.alerts(24).await.unwrap();
        assert_eq!(alerts[0].view.tracking_code().as_str(), "HIGH");
        assert_eq!(alerts[0].priority, Priority::High);
        assert_eq!(alerts[1].view.state.hours_since_last_movement, 47);
        assert_eq!(alerts[1].priority, Priority::Medium);
    }

    #[tokio::test]
    async fn list_orders_by_dispatch_then_code() {
        let harness = TestHarness::new();
        harness.register(shipment_at("B", 0)).await;
        harness.register(shipment_at("A", 0)).await;
        harness.register(shipment_at("C", 3)).await;
        let monitor = monitor(&harness);

        let codes: Vec<String> = monitor
            .list_shipments()
            .await
            .unwrap()
            .into_iter()
            .map(|view| view.shipment.tracking_code.into_inner())
            .collect();
        assert_eq!(codes, vec!["C", "A", "B"]);
    }

    #[tokio::test]
    async fn orphaned_events_are_not_listed() {
        let harness = TestHarness::new();
        harness.register(shipment_at("TRK1", 0)).await;
        harness.events.upsert(&event_at("ORPHAN", "E1", 3, 1)).await.unwrap();
        let monitor = monitor(&harness);

        let list = monitor.list_shipments().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(monitor.summary().await.unwrap().total, 1);
        assert!(monitor.shipment_detail(&TrackingCode::new("ORPHAN")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn summary_counts_terminal_as_delivered() {
        let harness = TestHarness::new();
        harness.register(shipment_at("DELIVERED", 0)).await;
        harness.register(shipment_at("RETURNED", 0)).await;
        harness.register(shipment_at("OPEN", 0)).await;
        harness.events.upsert(&event_at("DELIVERED", "E1", 5, 2)).await.unwrap();
        harness.events.upsert(&event_at("RETURNED", "E1", 6, 2)).await.unwrap();
        harness.events.upsert(&event_at("OPEN", "E1", 3, 2)).await.unwrap();
        harness.clock.set(base_time() + Duration::hours(60));
        let monitor = monitor(&harness);

        let summary = monitor.summary().await.unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.delivered, 2);
        assert_eq!(summary.in_transit, 1);
        assert_eq!(summary.stalled_24h, 1);
        assert_eq!(summary.stalled_48h, 1);
    }

    #[tokio::test]
    async fn detail_of_unregistered_shipment_skips_carrier() {
        let harness = TestHarness::new();
        let monitor = monitor(&harness);

        let detail = monitor.shipment_detail(&TrackingCode::new("NOPE")).await.unwrap();
        assert!(detail.is_none());
        assert_eq!(harness.carrier.calls_for("NOPE"), 0);
    }

    #[tokio::test]
    async fn detail_syncs_before_reading() {
        let harness = TestHarness::new();
        harness.register(shipment_at("TRK1", 0)).await;
        harness.carrier.respond_with(
            "TRK1",
            vec![event_at("TRK1", "E1", 2, 1), event_at("TRK1", "E2", 4, 5)],
        );
        harness.clock.set(base_time() + Duration::hours(6));
        let monitor = monitor(&harness);

        let detail = monitor
            .shipment_detail(&TrackingCode::new("TRK1"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(detail.freshness, Freshness::Live);
        assert_eq!(detail.events.len(), 2);
        assert_eq!(detail.events[0].event_id, "E2");
        assert_eq!(detail.shipment.state.latest_status_code, 4);
        assert_eq!(detail.shipment.state.hours_since_last_movement, 1);
    }

    #[tokio::test]
    async fn detail_serves_stored_history_when_carrier_fails() {
        let harness = TestHarness::new();
        harness.register(shipment_at("TRK1", 0)).await;
        harness.events.upsert(&event_at("TRK1", "E1", 3, 2)).await.unwrap();
        harness.carrier.fail_with("TRK1", CarrierError::Timeout);
        let monitor = monitor(&harness);

        let detail = monitor
            .shipment_detail(&TrackingCode::new("TRK1"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(detail.freshness, Freshness::Stored);
        assert_eq!(detail.events.len(), 1);
        assert_eq!(detail.shipment.state.latest_status_code, 3);
    }

    #[tokio::test]
    async fn detail_of_terminal_shipment_still_syncs() {
        let harness = TestHarness::new();
        harness.register(shipment_at("TRK1", 0)).await;
        harness.events.upsert(&event_at("TRK1", "E1", 5, 2)).await.unwrap();
        let monitor = monitor(&harness);

        monitor.shipment_detail(&TrackingCode::new("TRK1")).await.unwrap();
        assert_eq!(harness.carrier.calls_for("TRK1"), 1);
    }

    #[tokio::test]
    async fn storage_failure_propagates_from_views() {
        let harness = TestHarness::new();
        harness.register(shipment_at("TRK1", 0)).await;
        harness.events.fail_reads(true);
        let monitor = monitor(&harness);

        assert!(monitor.list_shipments().await.is_err());
        assert!(monitor.summary().await.is_err());
        assert!(monitor.shipment_detail(&TrackingCode::new("TRK1")).await.is_err());
    }

    #[test]
    fn freshness_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Freshness::Live).unwrap(), "live");
        assert_eq!(serde_json::to_value(Freshness::Stored).unwrap(), "stored");
    }
}
