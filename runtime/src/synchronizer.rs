//! Reconciles carrier tracking history into the event store.
//!
//! The carrier is the source of truth for events; the store is an append-only
//! mirror. Reconciliation is always an idempotent upsert, so running a sync
//! twice, or two syncs concurrently, never duplicates or rewrites history.

use crate::config::MonitorConfig;
use crate::metrics::SyncMetrics;
use crate::{SyncError, TrackingEnvironment};
use fm_tracking_core::{CarrierError, TrackingCode, TrackingEvent};
use serde::Serialize;
use std::time::Instant;

/// Outcome of reconciling one carrier answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Events returned by the carrier.
    pub fetched: usize,
    /// Events stored for the first time.
    pub inserted: usize,
    /// Events already present.
    pub duplicates: usize,
    /// Events the store failed to write.
    pub failed: usize,
}

/// Outcome of a sweep over all open shipments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepSummary {
    /// Shipments whose carrier call succeeded.
    pub updated: usize,
    /// Shipments whose carrier call failed.
    pub errors: usize,
}

/// Pulls carrier events and upserts them.
#[derive(Clone)]
pub struct TrackingSynchronizer {
    env: TrackingEnvironment,
    config: MonitorConfig,
}

impl TrackingSynchronizer {
    /// Create a synchronizer over the given environment.
    #[must_use]
    pub const fn new(env: TrackingEnvironment, config: MonitorConfig) -> Self {
        Self { env, config }
    }

    /// Fetch events from the carrier, treating every failure as "no new data".
    ///
    /// Failures are logged and counted; the caller gets an empty list.
    pub async fn fetch_remote_events(
        &self,
        tracking_code: Option<&TrackingCode>,
    ) -> Vec<TrackingEvent> {
        match self.env.carrier.fetch_events(tracking_code).await {
            Ok(events) => events,
            Err(error) => {
                log_carrier_failure(tracking_code, &error);
                Vec::new()
            }
        }
    }

    /// Fetch and store the carrier history of one shipment.
    ///
    /// Callable for any shipment, terminal ones included. A storage failure on
    /// one event is logged and counted in [`SyncReport::failed`]; the remaining
    /// events are still written.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Carrier`] when the carrier call itself failed.
    #[tracing::instrument(skip_all, fields(tracking_code = %tracking_code))]
    pub async fn sync_one(&self, tracking_code: &TrackingCode) -> Result<SyncReport, SyncError> {
        let events = self
            .env
            .carrier
            .fetch_events(Some(tracking_code))
            .await
            .inspect_err(|error| log_carrier_failure(Some(tracking_code), error))?;

        let report = self.store_events(&events).await;
        tracing::debug!(
            tracking_code = %tracking_code,
            fetched = report.fetched,
            inserted = report.inserted,
            duplicates = report.duplicates,
            failed = report.failed,
            "Shipment synchronized"
        );
        Ok(report)
    }

    /// Fetch the whole account feed once and store every event.
    ///
    /// Events for shipments missing from the registry are stored too; the
    /// monitor ignores them until the shipment is registered.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Carrier`] when the carrier call failed.
    #[tracing::instrument(skip_all)]
    pub async fn sync_account_feed(&self) -> Result<SyncReport, SyncError> {
        let events = self
            .env
            .carrier
            .fetch_events(None)
            .await
            .inspect_err(|error| log_carrier_failure(None, error))?;

        let report = self.store_events(&events).await;
        tracing::info!(
            fetched = report.fetched,
            inserted = report.inserted,
            failed = report.failed,
            "Account feed synchronized"
        );
        Ok(report)
    }

    /// Sync every registered shipment that is not yet terminal.
    ///
    /// Shipments are visited in listing order, one carrier call at a time, with
    /// [`MonitorConfig::effective_sync_interval`] between calls. A failing
    /// shipment counts as an error and the sweep moves on.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Storage`] when the registry or event store cannot be
    /// read while selecting shipments.
    #[tracing::instrument(skip_all)]
    pub async fn sync_all(&self) -> Result<SweepSummary, SyncError> {
        let started = Instant::now();
        let interval = self.config.effective_sync_interval();

        let mut shipments = self.env.shipments.list_all().await?;
        shipments.sort_by(|a, b| {
            b.dispatched_at
                .cmp(&a.dispatched_at)
                .then_with(|| a.tracking_code.cmp(&b.tracking_code))
        });

        let mut open = Vec::with_capacity(shipments.len());
        for shipment in shipments {
            let latest = self
                .env
                .events
                .latest_by_tracking_code(&shipment.tracking_code)
                .await?;
            if !latest.as_ref().is_some_and(TrackingEvent::is_final) {
                open.push(shipment.tracking_code);
            }
        }

        tracing::info!(shipments = open.len(), "Starting tracking sweep");

        let mut summary = SweepSummary::default();
        for (index, tracking_code) in open.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(interval).await;
            }
            match self.sync_one(tracking_code).await {
                Ok(_) => summary.updated += 1,
                Err(_) => summary.errors += 1,
            }
        }

        SyncMetrics::record_sweep(started.elapsed().as_secs_f64());
        tracing::info!(
            updated = summary.updated,
            errors = summary.errors,
            duration_ms = started.elapsed().as_millis(),
            "Tracking sweep finished"
        );
        Ok(summary)
    }

    async fn store_events(&self, events: &[TrackingEvent]) -> SyncReport {
        let mut report = SyncReport {
            fetched: events.len(),
            ..SyncReport::default()
        };

        for event in events {
            match self.env.events.upsert(event).await {
                Ok(true) => report.inserted += 1,
                Ok(false) => report.duplicates += 1,
                Err(error) => {
                    report.failed += 1;
                    tracing::error!(
                        tracking_code = %event.tracking_code,
                        event_id = %event.event_id,
                        error = %error,
                        "Failed to store tracking event"
                    );
                }
            }
        }

        SyncMetrics::record_events(report.inserted);
        report
    }
}

fn log_carrier_failure(tracking_code: Option<&TrackingCode>, error: &CarrierError) {
    SyncMetrics::record_carrier_error(error);
    match tracking_code {
        Some(code) => tracing::warn!(
            tracking_code = %code,
            error = %error,
            "Carrier tracking call failed, keeping stored history"
        ),
        None => tracing::warn!(error = %error, "Carrier account feed call failed"),
    }
}
