//! Storage traits for tracking events and dispatched shipments.
//!
//! This module defines the two durable collaborators of the monitor:
//!
//! - [`TrackingEventStore`]: append-only tracking events, deduplicated by
//!   (tracking code, event id)
//! - [`ShipmentRegistry`]: one row per dispatched shipment
//!
//! # Implementations
//!
//! - `PostgresEventStore` / `PostgresShipmentRegistry` (in `fm-tracking-postgres`): production
//! - `InMemoryEventStore` / `InMemoryShipmentRegistry` (in `fm-tracking-testing`): tests
//!
//! # Dyn Compatibility
//!
//! Both traits return `Pin<Box<dyn Future>>` instead of using `async fn` so they can
//! be shared as `Arc<dyn TrackingEventStore>` across request handlers.

use crate::event::TrackingEvent;
use crate::shipment::{ShipmentRecord, TrackingCode};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by the storage traits.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Errors that can occur during storage operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Database connection or query error.
    #[error("Database error: {0}")]
    Database(String),

    /// A stored row could not be turned back into a domain value.
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Append-only store of carrier tracking events.
///
/// # Ordering
///
/// Listing and "latest" lookups order events by `event_timestamp` descending.
/// Events sharing a timestamp are ordered by insertion sequence descending (the
/// event stored last comes first), then by event id descending.
pub trait TrackingEventStore: Send + Sync {
    /// Store an event unless (tracking code, event id) is already present.
    ///
    /// Returns `true` when a row was inserted and `false` when the event was a
    /// duplicate. A duplicate never updates the stored row, even when other
    /// fields differ.
    ///
    /// # Errors
    ///
    /// - `Database`: the insert failed
    fn upsert<'a>(&'a self, event: &'a TrackingEvent) -> StoreFuture<'a, bool>;

    /// All events of a shipment, newest first.
    ///
    /// Returns an empty vector for unknown tracking codes.
    ///
    /// # Errors
    ///
    /// - `Database`: the query failed
    /// - `Decode`: a stored row is malformed
    fn list_by_tracking_code<'a>(
        &'a self,
        tracking_code: &'a TrackingCode,
    ) -> StoreFuture<'a, Vec<TrackingEvent>>;

    /// The newest event of a shipment, if any.
    ///
    /// # Errors
    ///
    /// - `Database`: the query failed
    /// - `Decode`: the stored row is malformed
    fn latest_by_tracking_code<'a>(
        &'a self,
        tracking_code: &'a TrackingCode,
    ) -> StoreFuture<'a, Option<TrackingEvent>>;
}

/// Registry of shipments dispatched to the carrier.
///
/// Populated by the send workflow; the monitor only reads it.
pub trait ShipmentRegistry: Send + Sync {
    /// Every shipment ever dispatched, in no particular order.
    ///
    /// # Errors
    ///
    /// - `Database`: the query failed
    /// - `Decode`: a stored row is malformed
    fn list_all(&self) -> StoreFuture<'_, Vec<ShipmentRecord>>;

    /// Look up one shipment.
    ///
    /// # Errors
    ///
    /// - `Database`: the query failed
    /// - `Decode`: the stored row is malformed
    fn get_by_tracking_code<'a>(
        &'a self,
        tracking_code: &'a TrackingCode,
    ) -> StoreFuture<'a, Option<ShipmentRecord>>;

    /// Record a newly dispatched shipment.
    ///
    /// Returns `false` without touching the stored row when the tracking code is
    /// already registered.
    ///
    /// # Errors
    ///
    /// - `Database`: the insert failed
    fn register<'a>(&'a self, shipment: &'a ShipmentRecord) -> StoreFuture<'a, bool>;
}
