//! Health check endpoints.
//!
//! Used by load balancers and monitoring systems to verify service health.

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

/// Simple health check endpoint (for basic liveness).
///
/// Does NOT check the database or the carrier.
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Overall readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessStatus {
    /// Database and carrier reachable.
    Healthy,
    /// At least one dependency unreachable.
    Degraded,
}

/// Body of `GET /health/ready`.
#[derive(Debug, Clone, Serialize)]
pub struct Readiness {
    /// Overall status.
    pub status: ReadinessStatus,
    /// Database answered a ping.
    pub database: bool,
    /// Carrier answered the connectivity probe.
    pub carrier: bool,
}

/// Readiness check: database ping plus carrier probe.
///
/// # Status Codes
///
/// - 200 OK: database reachable (carrier may be down: `degraded`)
/// - 503 Service Unavailable: database unreachable
///
/// ```text
/// GET /health/ready
/// ```
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<Readiness>) {
    let (database, carrier) = tokio::join!(state.database.ping(), state.carrier.is_reachable());

    let status = if database && carrier {
        ReadinessStatus::Healthy
    } else {
        tracing::warn!(database, carrier, "Readiness check degraded");
        ReadinessStatus::Degraded
    };
    let code = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        code,
        Json(Readiness {
            status,
            database,
            carrier,
        }),
    )
}
