//! Carrier tracking API abstraction.
//!
//! The synchronizer talks to the carrier only through [`CarrierTracking`], so the
//! HTTP client (`fm-tracking-carrier`) and the scripted test carrier
//! (`fm-tracking-testing`) are interchangeable.

use crate::event::TrackingEvent;
use crate::shipment::TrackingCode;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by [`CarrierTracking`].
pub type CarrierFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Transient carrier failures.
///
/// None of these are fatal to the monitor: a failed call means "no new data
/// this cycle".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CarrierError {
    /// The call did not complete within the configured timeout.
    #[error("Carrier request timed out")]
    Timeout,

    /// Network or transport failure.
    #[error("Carrier request failed: {0}")]
    RequestFailed(String),

    /// Non-success HTTP status.
    #[error("Carrier API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// The carrier answered with `success: false`.
    #[error("Carrier rejected request: {0}")]
    Rejected(String),

    /// The response body could not be parsed.
    #[error("Failed to parse carrier response: {0}")]
    ResponseParseFailed(String),
}

/// Source of authoritative tracking events.
pub trait CarrierTracking: Send + Sync {
    /// Fetch tracking events.
    ///
    /// With a tracking code, returns that shipment's history. Without one,
    /// returns the whole account feed.
    ///
    /// # Errors
    ///
    /// Returns a [`CarrierError`] when the call fails for any reason.
    fn fetch_events<'a>(
        &'a self,
        tracking_code: Option<&'a TrackingCode>,
    ) -> CarrierFuture<'a, Result<Vec<TrackingEvent>, CarrierError>>;

    /// Cheap connectivity probe used by readiness checks.
    fn is_reachable(&self) -> CarrierFuture<'_, bool>;
}
