//! Rate repository implementation
//!
//! Provides PostgreSQL-backed storage for the append-only hourly rate
//! history. Entries are created and deleted, never updated in place.

use async_trait::async_trait;
use pawbill_core::{models::Rate, traits::RateRepository, AppError, AppResult};
use sqlx::{FromRow, PgPool};
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// PostgreSQL implementation of RateRepository
pub struct PgRateRepository {
    pool: PgPool,
}

#[derive(FromRow)]
struct RateRow {
    id: Uuid,
    dog_id: Uuid,
    hourly_rate: rust_decimal::Decimal,
    effective_from: chrono::NaiveDate,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<RateRow> for Rate {
    fn from(row: RateRow) -> Self {
        Rate {
            id: row.id,
            dog_id: row.dog_id,
            hourly_rate: row.hourly_rate,
            effective_from: row.effective_from,
            created_at: row.created_at,
        }
    }
}

impl PgRateRepository {
    /// Create a new rate repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RateRepository for PgRateRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Rate>> {
        debug!("Finding rate by id: {}", id);

        let row: Option<RateRow> = sqlx::query_as(
            r#"
            SELECT id, dog_id, hourly_rate, effective_from, created_at
            FROM rates
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding rate {}: {}", id, e);
            AppError::Database(format!("Failed to find rate: {}", e))
        })?;

        Ok(row.map(Rate::from))
    }

    #[instrument(skip(self))]
    async fn list_filtered(&self, dog_id: Option<Uuid>) -> AppResult<Vec<Rate>> {
        debug!("Listing rates, dog filter: {:?}", dog_id);

        let rows: Vec<RateRow> = sqlx::query_as(
            r#"
            SELECT id, dog_id, hourly_rate, effective_from, created_at
            FROM rates
            WHERE ($1::uuid IS NULL OR dog_id = $1)
            ORDER BY effective_from DESC, created_at DESC
            "#,
        )
        .bind(dog_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing rates: {}", e);
            AppError::Database(format!("Failed to fetch rates: {}", e))
        })?;

        Ok(rows.into_iter().map(Rate::from).collect())
    }

    #[instrument(skip(self, rate))]
    async fn create(&self, rate: &Rate) -> AppResult<Rate> {
        debug!(
            "Creating rate for dog {} effective {}",
            rate.dog_id, rate.effective_from
        );

        let row: RateRow = sqlx::query_as(
            r#"
            INSERT INTO rates (id, dog_id, hourly_rate, effective_from)
            VALUES ($1, $2, $3, $4)
            RETURNING id, dog_id, hourly_rate, effective_from, created_at
            "#,
        )
        .bind(rate.id)
        .bind(rate.dog_id)
        .bind(rate.hourly_rate)
        .bind(rate.effective_from)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating rate: {}", e);
            if e.to_string().contains("foreign key") {
                AppError::DogNotFound(rate.dog_id.to_string())
            } else {
                AppError::Database(format!("Failed to create rate: {}", e))
            }
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        debug!("Deleting rate: {}", id);

        let result = sqlx::query("DELETE FROM rates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting rate {}: {}", id, e);
                AppError::Database(format!("Failed to delete rate: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}
