//! # FM Tracking Runtime
//!
//! Synchronizer and monitor for FM Transportes shipments.
//!
//! ## Core Components
//!
//! - **Tracking Synchronizer**: pulls carrier history and upserts it into the event store
//! - **Monitor**: joins the shipment registry with stored events into list, summary,
//!   alert and detail views
//! - **Derived state**: staleness, alert flag and priority, recomputed on every read
//!
//! ## Example
//!
//! ```ignore
//! use fm_tracking_runtime::{Monitor, MonitorConfig, TrackingEnvironment};
//!
//! let env = TrackingEnvironment {
//!     events: Arc::new(event_store),
//!     shipments: Arc::new(registry),
//!     carrier: Arc::new(carrier_client),
//!     clock: Arc::new(SystemClock),
//! };
//!
//! let monitor = Monitor::new(env, MonitorConfig::default());
//! let alerts = monitor.alerts(24).await?;
//! ```

use fm_tracking_core::environment::Clock;
use fm_tracking_core::{
    CarrierError, CarrierTracking, ShipmentRegistry, StoreError, TrackingEventStore,
};
use std::sync::Arc;
use thiserror::Error;

pub mod config;
pub mod metrics;
pub mod monitor;
pub mod state;
pub mod synchronizer;

pub use config::MonitorConfig;
pub use monitor::{Freshness, Monitor, ShipmentDetail};
pub use state::{AlertEntry, DerivedShipmentState, MonitorSummary, Priority, ShipmentView};
pub use synchronizer::{SweepSummary, SyncReport, TrackingSynchronizer};

/// Errors from synchronizing with the carrier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The carrier call failed; no new data was stored.
    #[error("Carrier call failed: {0}")]
    Carrier(#[from] CarrierError),

    /// Shipments or events could not be read.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Dependencies shared by the synchronizer and the monitor.
///
/// Cheap to clone; every component sits behind an `Arc`.
#[derive(Clone)]
pub struct TrackingEnvironment {
    /// Append-only tracking event store.
    pub events: Arc<dyn TrackingEventStore>,
    /// Registry of dispatched shipments.
    pub shipments: Arc<dyn ShipmentRegistry>,
    /// Carrier tracking API.
    pub carrier: Arc<dyn CarrierTracking>,
    /// Source of "now" for staleness.
    pub clock: Arc<dyn Clock>,
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::TrackingEnvironment;
    use fm_tracking_testing::TestHarness;

    pub fn environment(harness: &TestHarness) -> TrackingEnvironment {
        TrackingEnvironment {
            events: harness.events.clone(),
            shipments: harness.shipments.clone(),
            carrier: harness.carrier.clone(),
            clock: harness.clock.clone(),
        }
    }
}
