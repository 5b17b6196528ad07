//! In-memory storage doubles.
//!
//! Both stores follow the `PostgreSQL` semantics: insert-or-ignore on the
//! natural key, events newest first with insertion order as tie-break.

use fm_tracking_core::event_store::StoreFuture;
use fm_tracking_core::{
    ShipmentRecord, ShipmentRegistry, StoreError, TrackingCode, TrackingEvent, TrackingEventStore,
};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct EventRows {
    // (insertion sequence, event)
    rows: Vec<(u64, TrackingEvent)>,
    next_seq: u64,
    failing_event_ids: HashSet<String>,
    fail_reads: bool,
}

/// In-memory tracking event store.
///
/// Clones share the same rows.
#[derive(Clone, Debug, Default)]
pub struct InMemoryEventStore {
    inner: Arc<RwLock<EventRows>>,
}

impl InMemoryEventStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored events across all shipments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().rows.len()
    }

    /// Whether no event is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().unwrap().rows.is_empty()
    }

    /// Make every upsert of `event_id` fail with a database error.
    pub fn fail_upsert_for(&self, event_id: impl Into<String>) {
        self.inner
            .write()
            .unwrap()
            .failing_event_ids
            .insert(event_id.into());
    }

    /// Make reads fail (or succeed again).
    pub fn fail_reads(&self, fail: bool) {
        self.inner.write().unwrap().fail_reads = fail;
    }

    fn sorted_events(
        &self,
        tracking_code: &TrackingCode,
    ) -> Result<Vec<TrackingEvent>, StoreError> {
        let inner = self.inner.read().unwrap();
        if inner.fail_reads {
            return Err(StoreError::Database("injected read failure".to_string()));
        }

        let mut rows: Vec<&(u64, TrackingEvent)> = inner
            .rows
            .iter()
            .filter(|(_, event)| &event.tracking_code == tracking_code)
            .collect();
        rows.sort_by(|(seq_a, a), (seq_b, b)| {
            b.event_timestamp
                .cmp(&a.event_timestamp)
                .then_with(|| seq_b.cmp(seq_a))
                .then_with(|| b.event_id.cmp(&a.event_id))
        });
        Ok(rows.into_iter().map(|(_, event)| event.clone()).collect())
    }
}

impl TrackingEventStore for InMemoryEventStore {
    fn upsert<'a>(&'a self, event: &'a TrackingEvent) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            let mut inner = self.inner.write().unwrap();
            if inner.failing_event_ids.contains(&event.event_id) {
                return Err(StoreError::Database(format!(
                    "injected write failure for {}",
                    event.event_id
                )));
            }

            let exists = inner.rows.iter().any(|(_, stored)| {
                stored.tracking_code == event.tracking_code && stored.event_id == event.event_id
            });
            if exists {
                return Ok(false);
            }

            let seq = inner.next_seq;
            inner.next_seq += 1;
            inner.rows.push((seq, event.clone()));
            Ok(true)
        })
    }

    fn list_by_tracking_code<'a>(
        &'a self,
        tracking_code: &'a TrackingCode,
    ) -> StoreFuture<'a, Vec<TrackingEvent>> {
        Box::pin(async move { self.sorted_events(tracking_code) })
    }

    fn latest_by_tracking_code<'a>(
        &'a self,
        tracking_code: &'a TrackingCode,
    ) -> StoreFuture<'a, Option<TrackingEvent>> {
        Box::pin(async move { Ok(self.sorted_events(tracking_code)?.into_iter().next()) })
    }
}

#[derive(Debug, Default)]
struct RegistryRows {
    shipments: BTreeMap<TrackingCode, ShipmentRecord>,
    fail_reads: bool,
}

/// In-memory shipment registry.
///
/// Clones share the same rows.
#[derive(Clone, Debug, Default)]
pub struct InMemoryShipmentRegistry {
    inner: Arc<RwLock<RegistryRows>>,
}

impl InMemoryShipmentRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered shipments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().shipments.len()
    }

    /// Whether no shipment is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().unwrap().shipments.is_empty()
    }

    /// Make reads fail (or succeed again).
    pub fn fail_reads(&self, fail: bool) {
        self.inner.write().unwrap().fail_reads = fail;
    }

    fn check_reads(&self) -> Result<(), StoreError> {
        if self.inner.read().unwrap().fail_reads {
            return Err(StoreError::Database("injected read failure".to_string()));
        }
        Ok(())
    }
}

impl ShipmentRegistry for InMemoryShipmentRegistry {
    fn list_all(&self) -> StoreFuture<'_, Vec<ShipmentRecord>> {
        Box::pin(async move {
            self.check_reads()?;
            Ok(self.inner.read().unwrap().shipments.values().cloned().collect())
        })
    }

    fn get_by_tracking_code<'a>(
        &'a self,
        tracking_code: &'a TrackingCode,
    ) -> StoreFuture<'a, Option<ShipmentRecord>> {
        Box::pin(async move {
            self.check_reads()?;
            Ok(self.inner.read().unwrap().shipments.get(tracking_code).cloned())
        })
    }

    fn register<'a>(&'a self, shipment: &'a ShipmentRecord) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            let mut inner = self.inner.write().unwrap();
            if inner.shipments.contains_key(&shipment.tracking_code) {
                return Ok(false);
            }
            inner
                .shipments
                .insert(shipment.tracking_code.clone(), shipment.clone());
            Ok(true)
        })
    }
}
