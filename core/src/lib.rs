//! # FM Tracking Core
//!
//! Domain types and dependency traits for monitoring FM Transportes shipments.
//!
//! ## Core Concepts
//!
//! - **Shipment**: a parcel dispatched to the carrier, keyed by its tracking code
//! - **Tracking event**: one carrier status report for a shipment (append-only)
//! - **Status catalog**: the single mapping from carrier status codes to meaning
//! - **Environment**: storage, carrier and clock injected as traits
//!
//! ## Data Flow
//!
//! ```text
//! carrier API ──▶ synchronizer ──▶ TrackingEventStore ──▶ monitor ──▶ HTTP views
//!                                   ShipmentRegistry ──────┘
//! ```
//!
//! This crate holds no I/O. Production implementations live in
//! `fm-tracking-postgres` and `fm-tracking-carrier`; in-memory doubles live in
//! `fm-tracking-testing`.

pub mod carrier;
pub mod event;
pub mod event_store;
pub mod shipment;
pub mod status;

// Re-export commonly used types
pub use carrier::{CarrierError, CarrierTracking};
pub use chrono::{DateTime, Utc};
pub use event::TrackingEvent;
pub use event_store::{ShipmentRegistry, StoreError, TrackingEventStore};
pub use shipment::{ShipmentRecord, TrackingCode};

/// Environment module - Dependency injection traits
///
/// All time-dependent derivations (staleness, alerts) read the current time
/// through [`environment::Clock`] so tests can pin it.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use fm_tracking_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let _now = clock.now();
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
