//! Billing repository implementation
//!
//! Fetches the raw inputs of the billing engine: qualifying attendance
//! rows and the rate histories of the dogs involved. All monetary
//! arithmetic happens in pawbill-services; this layer only retrieves.

use async_trait::async_trait;
use pawbill_core::{
    models::Rate,
    traits::{BillableRow, BillingQuery, BillingRepository},
    AppError, AppResult,
};
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// PostgreSQL implementation of BillingRepository
pub struct PgBillingRepository {
    pool: PgPool,
}

impl PgBillingRepository {
    /// Create a new billing repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BillingRepository for PgBillingRepository {
    #[instrument(skip(self))]
    async fn list_billable(&self, query: &BillingQuery) -> AppResult<Vec<BillableRow>> {
        debug!(
            "Fetching billable attendances from {} to {}",
            query.start_date, query.end_date
        );

        let rows = sqlx::query(
            r#"
            SELECT
                a.dog_id,
                a.duration,
                d.name AS dog_name,
                u.first_name AS owner_first_name,
                u.last_name AS owner_last_name,
                w.date AS walk_date
            FROM attendances a
            JOIN walks w ON w.id = a.walk_id
            JOIN dogs d ON d.id = a.dog_id
            JOIN users u ON u.id = d.owner_id
            WHERE w.status = 'COMPLETED'
              AND w.date >= $1
              AND w.date <= $2
              AND a.attended = TRUE
              AND a.duration IS NOT NULL
              AND ($3::uuid IS NULL OR a.dog_id = $3)
              AND ($4::uuid IS NULL OR d.owner_id = $4)
            ORDER BY w.date DESC, d.name
            "#,
        )
        .bind(query.start_date)
        .bind(query.end_date)
        .bind(query.dog_id)
        .bind(query.owner_id)
        .map(|row: sqlx::postgres::PgRow| {
            use sqlx::Row;
            let first_name: String = row.get("owner_first_name");
            let last_name: String = row.get("owner_last_name");
            BillableRow {
                dog_id: row.get("dog_id"),
                dog_name: row.get("dog_name"),
                owner_name: format!("{} {}", first_name, last_name),
                walk_date: row.get("walk_date"),
                duration_minutes: row.get("duration"),
            }
        })
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error fetching billable attendances: {}", e);
            AppError::Database(format!("Failed to fetch billable attendances: {}", e))
        })?;

        debug!("Found {} billable attendances", rows.len());
        Ok(rows)
    }

    #[instrument(skip(self, dog_ids))]
    async fn rate_history(&self, dog_ids: &[Uuid]) -> AppResult<Vec<Rate>> {
        debug!("Fetching rate history for {} dogs", dog_ids.len());

        if dog_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT id, dog_id, hourly_rate, effective_from, created_at
            FROM rates
            WHERE dog_id = ANY($1)
            ORDER BY dog_id, effective_from DESC, created_at DESC
            "#,
        )
        .bind(dog_ids)
        .map(|row: sqlx::postgres::PgRow| {
            use sqlx::Row;
            Rate {
                id: row.get("id"),
                dog_id: row.get("dog_id"),
                hourly_rate: row.get("hourly_rate"),
                effective_from: row.get("effective_from"),
                created_at: row.get("created_at"),
            }
        })
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error fetching rate history: {}", e);
            AppError::Database(format!("Failed to fetch rate history: {}", e))
        })?;

        Ok(rows)
    }
}
