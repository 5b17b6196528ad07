//! Monitor configuration.

use std::time::Duration;

/// Default staleness threshold for `alert_active`, in hours.
pub const DEFAULT_ALERT_THRESHOLD_HOURS: i64 = 24;

/// Default pause between carrier calls during a sweep.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_millis(1100);

/// Lower bound on the pause between carrier calls.
///
/// The carrier allows one tracking request per second per account; sweeps never
/// go faster regardless of configuration.
pub const MIN_SYNC_INTERVAL: Duration = Duration::from_secs(1);

/// Settings shared by the synchronizer and the monitor.
///
/// Built once at startup and passed to constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Hours without movement after which a non-terminal shipment is alerting.
    pub alert_threshold_hours: i64,
    /// Requested pause between carrier calls in a sweep.
    pub sync_interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            alert_threshold_hours: DEFAULT_ALERT_THRESHOLD_HOURS,
            sync_interval: DEFAULT_SYNC_INTERVAL,
        }
    }
}

impl MonitorConfig {
    /// The pause actually applied between carrier calls.
    ///
    /// Never below [`MIN_SYNC_INTERVAL`].
    #[must_use]
    pub fn effective_sync_interval(&self) -> Duration {
        self.sync_interval.max(MIN_SYNC_INTERVAL)
    }
}
