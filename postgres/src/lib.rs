//! `PostgreSQL` storage for FM Tracking.
//!
//! This crate implements the storage traits from `fm-tracking-core` on top of
//! sqlx:
//!
//! - [`PostgresEventStore`]: append-only `tracking_events` with
//!   `INSERT ... ON CONFLICT DO NOTHING` deduplication
//! - [`PostgresShipmentRegistry`]: the `shipments` table
//!
//! Both share one connection pool. Schema changes live in `migrations/` and are
//! applied with [`migrate`].
//!
//! # Example
//!
//! ```ignore
//! use fm_tracking_postgres::{connect, migrate, PostgresEventStore, PostgresShipmentRegistry};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = connect("postgres://localhost/fm_tracking", 10, 5).await?;
//!     migrate(&pool).await?;
//!     let events = PostgresEventStore::from_pool(pool.clone());
//!     let shipments = PostgresShipmentRegistry::from_pool(pool);
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod event_store;
mod registry;

pub use event_store::PostgresEventStore;
pub use registry::PostgresShipmentRegistry;
pub use sqlx::PgPool;

use fm_tracking_core::StoreError;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

/// Open a connection pool.
///
/// # Errors
///
/// Returns [`StoreError::Database`] if the database cannot be reached.
pub async fn connect(
    database_url: &str,
    max_connections: u32,
    connect_timeout_secs: u64,
) -> Result<PgPool, StoreError> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(connect_timeout_secs))
        .connect(database_url)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to connect: {e}")))
}

/// Apply the bundled migrations.
///
/// # Errors
///
/// Returns [`StoreError::Database`] if a migration fails.
pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| StoreError::Database(format!("Migration failed: {e}")))?;
    tracing::info!("Tracking schema migrations applied");
    Ok(())
}

/// Cheap liveness query used by readiness checks.
///
/// # Errors
///
/// Returns [`StoreError::Database`] if the query fails.
pub async fn ping(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;
    Ok(())
}
