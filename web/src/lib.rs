//! Axum HTTP API for the FM tracking monitor.
//!
//! # Request Flow
//!
//! 1. **HTTP Request** arrives at an Axum handler
//! 2. **Extract** path, query or JSON body; reject bad input with 400/422
//! 3. **Call** the [`fm_tracking_runtime::Monitor`] (which may sync with the carrier)
//! 4. **Wrap** the result in the `{success, data, total?, message?}` envelope
//!
//! # Endpoints
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | GET | `/monitoring` | list with derived state |
//! | GET | `/monitoring/summary` | counts |
//! | GET | `/monitoring/alerts?minHours=N` | stalled shipments |
//! | GET | `/monitoring/{trackingCode}` | sync, then detail |
//! | POST | `/monitoring/sync` | sweep all open shipments |
//! | POST | `/monitoring/{trackingCode}/sync` | sync, then detail |
//! | POST | `/monitoring/sync/feed` | store the account-wide carrier feed |
//! | POST | `/shipments` | register a dispatched shipment |
//! | GET | `/health`, `/health/ready` | liveness, readiness |

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod state;

// Re-export key types for convenience
pub use error::AppError;
pub use middleware::{CORRELATION_ID_HEADER, CorrelationId, correlation_id_layer};
pub use response::ApiResponse;
pub use router::build_router;
pub use state::{AppState, DatabaseProbe};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
