//! Prometheus metrics for the tracking monitor.
//!
//! The synchronizer records through the `metrics` facade; without an installed
//! recorder every call is a no-op, so unit tests need no setup.
//!
//! # Example
//!
//! ```rust,no_run
//! use fm_tracking_runtime::metrics::MetricsServer;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut server = MetricsServer::new("0.0.0.0:9090".parse()?);
//! server.start()?;
//!
//! let exposition = server.render().unwrap_or_default();
//! # Ok(())
//! # }
//! ```

use fm_tracking_core::CarrierError;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use thiserror::Error;

/// Events stored for the first time by the synchronizer.
pub const EVENTS_INSERTED_TOTAL: &str = "tracking_sync_events_inserted_total";
/// Failed carrier calls, labelled by `kind`.
pub const CARRIER_ERRORS_TOTAL: &str = "tracking_sync_carrier_errors_total";
/// Completed sweeps.
pub const SWEEPS_TOTAL: &str = "tracking_sync_sweeps_total";
/// Sweep wall-clock time.
pub const SWEEP_DURATION_SECONDS: &str = "tracking_sync_sweep_duration_seconds";
/// Rows inserted by the `PostgreSQL` event store.
pub const STORE_EVENTS_INSERTED_TOTAL: &str = "tracking_store_events_inserted_total";

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Prometheus recorder and its render handle.
///
/// The server binary serves [`MetricsServer::render`] on its metrics port.
pub struct MetricsServer {
    addr: SocketAddr,
    handle: Option<PrometheusHandle>,
}

impl MetricsServer {
    /// Create a metrics server for `addr`.
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self { addr, handle: None }
    }

    /// Address the metrics endpoint is served on.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Describe the tracking metrics and install the Prometheus recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built or installed. An already
    /// installed recorder is tolerated with a warning.
    pub fn start(&mut self) -> Result<(), MetricsError> {
        register_metrics();

        let builder = PrometheusBuilder::new()
            // Sweeps are paced at one call per second, so buckets reach minutes
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                tracing::info!(
                    addr = %self.addr,
                    "Metrics available at http://{}/metrics",
                    self.addr
                );
                Ok(())
            }
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!(
                        "Metrics recorder already initialized, skipping re-initialization"
                    );
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            }
        }
    }

    /// Get the metrics handle for rendering.
    #[must_use]
    pub const fn handle(&self) -> Option<&PrometheusHandle> {
        self.handle.as_ref()
    }

    /// Render current metrics in Prometheus text format.
    ///
    /// Returns `None` if the recorder was not installed by this server.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

fn register_metrics() {
    describe_counter!(
        EVENTS_INSERTED_TOTAL,
        "Tracking events stored for the first time by the synchronizer"
    );
    describe_counter!(CARRIER_ERRORS_TOTAL, "Failed carrier tracking calls");
    describe_counter!(SWEEPS_TOTAL, "Completed tracking sweeps");
    describe_histogram!(SWEEP_DURATION_SECONDS, "Wall-clock time of a tracking sweep");
    describe_counter!(
        STORE_EVENTS_INSERTED_TOTAL,
        "Rows inserted into the tracking event table"
    );
}

/// Recording helpers for the synchronizer.
pub struct SyncMetrics;

impl SyncMetrics {
    /// Record newly stored events.
    pub fn record_events(inserted: usize) {
        if inserted > 0 {
            counter!(EVENTS_INSERTED_TOTAL).increment(inserted as u64);
        }
    }

    /// Record a failed carrier call.
    pub fn record_carrier_error(error: &CarrierError) {
        counter!(CARRIER_ERRORS_TOTAL, "kind" => error_kind(error)).increment(1);
    }

    /// Record a finished sweep.
    pub fn record_sweep(duration_secs: f64) {
        counter!(SWEEPS_TOTAL).increment(1);
        histogram!(SWEEP_DURATION_SECONDS).record(duration_secs);
    }
}

const fn error_kind(error: &CarrierError) -> &'static str {
    match error {
        CarrierError::Timeout => "timeout",
        CarrierError::RequestFailed(_) => "request_failed",
        CarrierError::Api { .. } => "api",
        CarrierError::Rejected(_) => "rejected",
        CarrierError::ResponseParseFailed(_) => "parse",
    }
}
