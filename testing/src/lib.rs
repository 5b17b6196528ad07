//! # FM Tracking Testing
//!
//! Test doubles for the FM tracking monitor.
//!
//! This crate provides:
//! - [`FixedClock`]: settable deterministic time
//! - [`InMemoryEventStore`] and [`InMemoryShipmentRegistry`]: storage with failure injection
//! - [`MockCarrierClient`]: scripted carrier answers with a call log
//! - [`TestHarness`] and fixtures for building scenarios
//!
//! ## Example
//!
//! ```
//! use fm_tracking_testing::{TestHarness, event_at, shipment_at};
//!
//! # tokio_test::block_on(async {
//! let harness = TestHarness::new();
//! harness.register(shipment_at("TRK1", 0)).await;
//! harness.carrier.respond_with("TRK1", vec![event_at("TRK1", "E1", 3, 2)]);
//! assert_eq!(harness.shipments.len(), 1);
//! # });
//! ```

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Locks only panic when poisoned by a failed test

use chrono::{DateTime, Utc};
use fm_tracking_core::environment::Clock;

mod carrier;
mod fixtures;
mod stores;

pub use carrier::MockCarrierClient;
pub use fixtures::{TestHarness, base_time, event_at, shipment_at};
pub use stores::{InMemoryEventStore, InMemoryShipmentRegistry};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use std::sync::{Arc, RwLock};

    /// Fixed clock for deterministic tests
    ///
    /// Returns the same time until moved with [`FixedClock::set`] or
    /// [`FixedClock::advance`]. Clones share the same time.
    ///
    /// # Example
    ///
    /// ```
    /// use fm_tracking_testing::mocks::FixedClock;
    /// use fm_tracking_core::environment::Clock;
    /// use chrono::{Duration, Utc};
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// assert_eq!(time1, clock.now());
    ///
    /// clock.advance(Duration::hours(2));
    /// assert_eq!(clock.now() - time1, Duration::hours(2));
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: Arc<RwLock<DateTime<Utc>>>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(RwLock::new(time)),
            }
        }

        /// Move the clock to `time`.
        pub fn set(&self, time: DateTime<Utc>) {
            *self.time.write().unwrap() = time;
        }

        /// Move the clock forward by `by`.
        pub fn advance(&self, by: chrono::Duration) {
            *self.time.write().unwrap() += by;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.read().unwrap()
        }
    }

    /// Create a fixed clock at [`crate::base_time`] (2025-01-01 00:00:00 UTC).
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(crate::base_time())
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};
