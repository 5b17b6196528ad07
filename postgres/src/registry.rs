//! `PostgreSQL`-backed shipment registry.

use fm_tracking_core::event_store::{ShipmentRegistry, StoreFuture};
use fm_tracking_core::{ShipmentRecord, StoreError, TrackingCode};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

/// Shipment registry on the `shipments` table.
#[derive(Clone, Debug)]
pub struct PostgresShipmentRegistry {
    pool: PgPool,
}

impl PostgresShipmentRegistry {
    /// Create a registry over an existing connection pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_shipment(row: &PgRow) -> Result<ShipmentRecord, StoreError> {
        let decode = |e: sqlx::Error| StoreError::Decode(e.to_string());
        let tracking_code: String = row.try_get("tracking_code").map_err(decode)?;

        Ok(ShipmentRecord {
            tracking_code: TrackingCode::new(tracking_code),
            order_number: row.try_get("order_number").map_err(decode)?,
            customer_name: row.try_get("customer_name").map_err(decode)?,
            customer_phone: row.try_get("customer_phone").map_err(decode)?,
            destination_summary: row.try_get("destination_summary").map_err(decode)?,
            dispatched_at: row.try_get("dispatched_at").map_err(decode)?,
        })
    }
}

impl ShipmentRegistry for PostgresShipmentRegistry {
    fn list_all(&self) -> StoreFuture<'_, Vec<ShipmentRecord>> {
        Box::pin(async move {
            let rows = sqlx::query(
                r"
                SELECT tracking_code, order_number, customer_name, customer_phone,
                       destination_summary, dispatched_at
                FROM shipments
                ",
            )
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

            rows.iter().map(Self::row_to_shipment).collect()
        })
    }

    fn get_by_tracking_code<'a>(
        &'a self,
        tracking_code: &'a TrackingCode,
    ) -> StoreFuture<'a, Option<ShipmentRecord>> {
        Box::pin(async move {
            let row = sqlx::query(
                r"
                SELECT tracking_code, order_number, customer_name, customer_phone,
                       destination_summary, dispatched_at
                FROM shipments
                WHERE tracking_code = $1
                ",
            )
            .bind(tracking_code.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

            row.as_ref().map(Self::row_to_shipment).transpose()
        })
    }

    fn register<'a>(&'a self, shipment: &'a ShipmentRecord) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            let result = sqlx::query(
                r"
                INSERT INTO shipments (
                    tracking_code, order_number, customer_name, customer_phone,
                    destination_summary, dispatched_at
                ) VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (tracking_code) DO NOTHING
                ",
            )
            .bind(shipment.tracking_code.as_str())
            .bind(&shipment.order_number)
            .bind(&shipment.customer_name)
            .bind(shipment.customer_phone.as_deref())
            .bind(&shipment.destination_summary)
            .bind(shipment.dispatched_at)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

            let inserted = result.rows_affected() > 0;
            if inserted {
                tracing::info!(
                    tracking_code = %shipment.tracking_code,
                    order_number = %shipment.order_number,
                    "Shipment registered"
                );
            } else {
                tracing::debug!(
                    tracking_code = %shipment.tracking_code,
                    "Shipment already registered"
                );
            }

            Ok(inserted)
        })
    }
}
