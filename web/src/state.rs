//! Application state shared across handlers.

use fm_tracking_core::environment::Clock;
use fm_tracking_core::{CarrierTracking, ShipmentRegistry};
use fm_tracking_runtime::Monitor;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Database readiness check used by `GET /health/ready`.
///
/// The server implements this over its connection pool; tests use a constant.
pub trait DatabaseProbe: Send + Sync {
    /// Whether the database answers a trivial query.
    fn ping(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>>;
}

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Read views and synchronization.
    pub monitor: Monitor,
    /// Registry written by `POST /shipments`.
    pub shipments: Arc<dyn ShipmentRegistry>,
    /// Carrier client, probed by readiness.
    pub carrier: Arc<dyn CarrierTracking>,
    /// Default dispatch time for registrations that omit it.
    pub clock: Arc<dyn Clock>,
    /// Database readiness probe.
    pub database: Arc<dyn DatabaseProbe>,
}
