//! `PostgreSQL`-backed tracking event store.

use chrono::{DateTime, Utc};
use fm_tracking_core::event_store::{StoreFuture, TrackingEventStore};
use fm_tracking_core::{StoreError, TrackingCode, TrackingEvent};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

const SELECT_EVENTS: &str = r"
    SELECT tracking_code, event_id, status_code, status_description, event_timestamp, received_by
    FROM tracking_events
    WHERE tracking_code = $1
    ORDER BY event_timestamp DESC, seq DESC, event_id DESC
";

const SELECT_LATEST_EVENT: &str = r"
    SELECT tracking_code, event_id, status_code, status_description, event_timestamp, received_by
    FROM tracking_events
    WHERE tracking_code = $1
    ORDER BY event_timestamp DESC, seq DESC, event_id DESC
    LIMIT 1
";

/// Tracking event store on the `tracking_events` table.
///
/// ```sql
/// CREATE TABLE tracking_events (
///     seq BIGSERIAL PRIMARY KEY,
///     tracking_code TEXT NOT NULL,
///     event_id TEXT NOT NULL,
///     ...
///     UNIQUE (tracking_code, event_id)
/// );
/// ```
///
/// Deduplication relies on the unique constraint: concurrent upserts of the same
/// event are safe without application-level locking.
#[derive(Clone, Debug)]
pub struct PostgresEventStore {
    pool: PgPool,
}

impl PostgresEventStore {
    /// Create a store over an existing connection pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `database_url` with default pool settings.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the connection fails.
    pub async fn new(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| StoreError::Database(format!("Failed to connect: {e}")))?;
        Ok(Self::from_pool(pool))
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_event(row: &PgRow) -> Result<TrackingEvent, StoreError> {
        let decode = |e: sqlx::Error| StoreError::Decode(e.to_string());

        let tracking_code: String = row.try_get("tracking_code").map_err(decode)?;
        let event_timestamp: DateTime<Utc> = row.try_get("event_timestamp").map_err(decode)?;

        Ok(TrackingEvent {
            tracking_code: TrackingCode::new(tracking_code),
            event_id: row.try_get("event_id").map_err(decode)?,
            status_code: row.try_get("status_code").map_err(decode)?,
            status_description: row.try_get("status_description").map_err(decode)?,
            event_timestamp,
            received_by: row.try_get("received_by").map_err(decode)?,
        })
    }
}

impl TrackingEventStore for PostgresEventStore {
    fn upsert<'a>(&'a self, event: &'a TrackingEvent) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            let result = sqlx::query(
                r"
                INSERT INTO tracking_events (
                    tracking_code, event_id, status_code, status_description,
                    event_timestamp, received_by
                ) VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (tracking_code, event_id) DO NOTHING
                ",
            )
            .bind(event.tracking_code.as_str())
            .bind(&event.event_id)
            .bind(event.status_code)
            .bind(&event.status_description)
            .bind(event.event_timestamp)
            .bind(event.received_by.as_deref())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

            let inserted = result.rows_affected() > 0;
            if inserted {
                metrics::counter!("tracking_store_events_inserted_total").increment(1);
            }

            tracing::debug!(
                tracking_code = %event.tracking_code,
                event_id = %event.event_id,
                inserted,
                "Tracking event upserted"
            );

            Ok(inserted)
        })
    }

    fn list_by_tracking_code<'a>(
        &'a self,
        tracking_code: &'a TrackingCode,
    ) -> StoreFuture<'a, Vec<TrackingEvent>> {
        Box::pin(async move {
            let rows = sqlx::query(SELECT_EVENTS)
                .bind(tracking_code.as_str())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| StoreError::Database(e.to_string()))?;

            rows.iter().map(Self::row_to_event).collect()
        })
    }

    fn latest_by_tracking_code<'a>(
        &'a self,
        tracking_code: &'a TrackingCode,
    ) -> StoreFuture<'a, Option<TrackingEvent>> {
        Box::pin(async move {
            let row = sqlx::query(SELECT_LATEST_EVENT)
                .bind(tracking_code.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StoreError::Database(e.to_string()))?;

            row.as_ref().map(Self::row_to_event).transpose()
        })
    }
}
