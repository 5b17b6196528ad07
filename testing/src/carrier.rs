//! Scripted carrier double.

use fm_tracking_core::carrier::CarrierFuture;
use fm_tracking_core::{CarrierError, CarrierTracking, TrackingCode, TrackingEvent};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Debug)]
struct Script {
    responses: HashMap<Option<TrackingCode>, Result<Vec<TrackingEvent>, CarrierError>>,
    calls: Vec<Option<TrackingCode>>,
    reachable: bool,
}

/// Carrier whose answers are set per tracking code.
///
/// Codes without a script answer with an empty event list. Every call is
/// recorded, so tests can assert which shipments were polled.
///
/// # Example
///
/// ```
/// use fm_tracking_testing::{MockCarrierClient, event_at};
/// use fm_tracking_core::{CarrierError, CarrierTracking, TrackingCode};
///
/// # tokio_test::block_on(async {
/// let carrier = MockCarrierClient::new();
/// carrier.respond_with("TRK1", vec![event_at("TRK1", "E1", 3, 1)]);
/// carrier.fail_with("TRK2", CarrierError::Timeout);
///
/// let events = carrier.fetch_events(Some(&TrackingCode::new("TRK1"))).await.unwrap();
/// assert_eq!(events.len(), 1);
/// assert!(carrier.fetch_events(Some(&TrackingCode::new("TRK2"))).await.is_err());
/// assert_eq!(carrier.call_count(), 2);
/// # });
/// ```
#[derive(Clone, Debug)]
pub struct MockCarrierClient {
    script: Arc<RwLock<Script>>,
}

impl MockCarrierClient {
    /// Create a reachable carrier with no scripted answers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            script: Arc::new(RwLock::new(Script {
                responses: HashMap::new(),
                calls: Vec::new(),
                reachable: true,
            })),
        }
    }

    /// Answer requests for `tracking_code` with `events`.
    pub fn respond_with(&self, tracking_code: impl Into<TrackingCode>, events: Vec<TrackingEvent>) {
        self.script
            .write()
            .unwrap()
            .responses
            .insert(Some(tracking_code.into()), Ok(events));
    }

    /// Answer account feed requests with `events`.
    pub fn respond_to_feed(&self, events: Vec<TrackingEvent>) {
        self.script.write().unwrap().responses.insert(None, Ok(events));
    }

    /// Fail requests for `tracking_code` with `error`.
    pub fn fail_with(&self, tracking_code: impl Into<TrackingCode>, error: CarrierError) {
        self.script
            .write()
            .unwrap()
            .responses
            .insert(Some(tracking_code.into()), Err(error));
    }

    /// Fail account feed requests with `error`.
    pub fn fail_feed_with(&self, error: CarrierError) {
        self.script.write().unwrap().responses.insert(None, Err(error));
    }

    /// Set the answer of the connectivity probe.
    pub fn set_reachable(&self, reachable: bool) {
        self.script.write().unwrap().reachable = reachable;
    }

    /// Every tracking request in call order; `None` is the account feed.
    #[must_use]
    pub fn call_log(&self) -> Vec<Option<TrackingCode>> {
        self.script.read().unwrap().calls.clone()
    }

    /// Total number of tracking requests.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.script.read().unwrap().calls.len()
    }

    /// Number of tracking requests for one shipment.
    #[must_use]
    pub fn calls_for(&self, tracking_code: &str) -> usize {
        self.script
            .read()
            .unwrap()
            .calls
            .iter()
            .filter(|call| call.as_ref().is_some_and(|code| code.as_str() == tracking_code))
            .count()
    }
}

impl Default for MockCarrierClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CarrierTracking for MockCarrierClient {
    fn fetch_events<'a>(
        &'a self,
        tracking_code: Option<&'a TrackingCode>,
    ) -> CarrierFuture<'a, Result<Vec<TrackingEvent>, CarrierError>> {
        Box::pin(async move {
            let key = tracking_code.cloned();
            let mut script = self.script.write().unwrap();
            script.calls.push(key.clone());
            script
                .responses
                .get(&key)
                .cloned()
                .unwrap_or_else(|| Ok(Vec::new()))
        })
    }

    fn is_reachable(&self) -> CarrierFuture<'_, bool> {
        Box::pin(async move { self.script.read().unwrap().reachable })
    }
}
