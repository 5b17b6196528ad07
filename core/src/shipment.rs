//! Shipments dispatched to the carrier.
//!
//! A shipment is created once by the send workflow, when the carrier accepts an
//! order and assigns it a tracking code. The monitor only ever reads shipments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for `TrackingCode` parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid tracking code: {0}")]
pub struct ParseTrackingCodeError(String);

/// Carrier-assigned identifier of a shipment.
///
/// Tracking codes are globally unique and are the join key between the shipment
/// registry and the tracking event store.
///
/// # Validation
///
/// - `FromStr::from_str()`: trims and rejects empty input (use for external input)
/// - `new()` and `From`: no validation (use for data read back from storage)
///
/// # Examples
///
/// ```
/// use fm_tracking_core::shipment::TrackingCode;
///
/// let code = TrackingCode::new("FM123456BR");
/// assert_eq!(code.as_str(), "FM123456BR");
///
/// let parsed: TrackingCode = " FM1 ".parse().unwrap();
/// assert_eq!(parsed, TrackingCode::new("FM1"));
/// assert!("  ".parse::<TrackingCode>().is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackingCode(String);

impl TrackingCode {
    /// Create a new `TrackingCode` from a string.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Get the tracking code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert the `TrackingCode` into its inner `String`.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TrackingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TrackingCode {
    type Err = ParseTrackingCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseTrackingCodeError(
                "Tracking code cannot be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl From<String> for TrackingCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TrackingCode {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for TrackingCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A shipment dispatched to the carrier.
///
/// Immutable after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentRecord {
    /// Carrier-assigned tracking code (unique).
    pub tracking_code: TrackingCode,
    /// ERP order number.
    pub order_number: String,
    /// Recipient name.
    pub customer_name: String,
    /// Recipient phone, when the order carried one.
    pub customer_phone: Option<String>,
    /// Destination summary, e.g. `"Campinas - SP"`.
    pub destination_summary: String,
    /// When the shipment was handed to the carrier.
    pub dispatched_at: DateTime<Utc>,
}
