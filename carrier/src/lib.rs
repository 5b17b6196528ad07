//! # FM Transportes Tracking Client
//!
//! reqwest client for the carrier's tracking API, implementing
//! [`fm_tracking_core::CarrierTracking`].
//!
//! ## Example
//!
//! ```no_run
//! use fm_tracking_carrier::{CarrierConfig, FmTransportesClient};
//! use fm_tracking_core::TrackingCode;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FmTransportesClient::new(CarrierConfig {
//!         password: "secret".to_string(),
//!         client_document: "12345678000199".to_string(),
//!         ..CarrierConfig::default()
//!     })?;
//!
//!     let events = client.tracking(Some(&TrackingCode::new("FM123456BR"))).await?;
//!     println!("{} events", events.len());
//!     Ok(())
//! }
//! ```
//!
//! Every call is bounded by [`CarrierConfig::timeout`]; there are no automatic
//! retries.

pub mod client;
pub mod wire;

// Re-export main types for convenience
pub use client::{CarrierConfig, DEFAULT_BASE_URL, FmTransportesClient};
pub use wire::{RemoteEvent, TrackingRequest, TrackingResponse};
