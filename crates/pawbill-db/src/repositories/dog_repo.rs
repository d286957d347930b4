//! Dog repository implementation
//!
//! Provides PostgreSQL-backed storage for dog profiles, joined with
//! owner information for display.

use async_trait::async_trait;
use pawbill_core::{
    models::{Dog, OwnerInfo},
    traits::{DogRepository, Repository},
    AppError, AppResult,
};
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// PostgreSQL implementation of DogRepository
pub struct PgDogRepository {
    pool: PgPool,
}

impl PgDogRepository {
    /// Create a new dog repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: sqlx::postgres::PgRow) -> Dog {
        use sqlx::Row;
        Dog {
            id: row.get("id"),
            name: row.get("name"),
            breed: row.get("breed"),
            age: row.get("age"),
            weight: row.get("weight"),
            owner_id: row.get("owner_id"),
            owner: Some(OwnerInfo {
                id: row.get("owner_id"),
                first_name: row.get("owner_first_name"),
                last_name: row.get("owner_last_name"),
            }),
            medical_notes: row.get("medical_notes"),
            emergency_contact: row.get("emergency_contact"),
            photo_url: row.get("photo_url"),
            created_at: row.get("created_at"),
        }
    }
}

const SELECT_DOG: &str = r#"
    SELECT
        d.id, d.name, d.breed, d.age, d.weight, d.owner_id,
        d.medical_notes, d.emergency_contact, d.photo_url, d.created_at,
        u.first_name AS owner_first_name, u.last_name AS owner_last_name
    FROM dogs d
    JOIN users u ON u.id = d.owner_id
"#;

#[async_trait]
impl Repository<Dog, Uuid> for PgDogRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Dog>> {
        debug!("Finding dog by id: {}", id);

        let result = sqlx::query(&format!("{SELECT_DOG} WHERE d.id = $1"))
            .bind(id)
            .map(Self::map_row)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding dog {}: {}", id, e);
                AppError::Database(format!("Failed to find dog: {}", e))
            })?;

        Ok(result)
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> AppResult<Vec<Dog>> {
        self.list_filtered(None).await
    }

    #[instrument(skip(self, entity))]
    async fn create(&self, entity: &Dog) -> AppResult<Dog> {
        debug!("Creating dog: {}", entity.name);

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO dogs (
                id, name, breed, age, weight, owner_id,
                medical_notes, emergency_contact, photo_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(entity.id)
        .bind(&entity.name)
        .bind(&entity.breed)
        .bind(entity.age)
        .bind(entity.weight)
        .bind(entity.owner_id)
        .bind(&entity.medical_notes)
        .bind(&entity.emergency_contact)
        .bind(&entity.photo_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating dog: {}", e);
            if e.to_string().contains("foreign key") {
                AppError::UserNotFound(entity.owner_id.to_string())
            } else {
                AppError::Database(format!("Failed to create dog: {}", e))
            }
        })?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::DogNotFound(id.to_string()))
    }

    #[instrument(skip(self, entity))]
    async fn update(&self, entity: &Dog) -> AppResult<Dog> {
        debug!("Updating dog: {}", entity.id);

        let result = sqlx::query(
            r#"
            UPDATE dogs
            SET name = $2,
                breed = $3,
                age = $4,
                weight = $5,
                owner_id = $6,
                medical_notes = $7,
                emergency_contact = $8,
                photo_url = $9
            WHERE id = $1
            "#,
        )
        .bind(entity.id)
        .bind(&entity.name)
        .bind(&entity.breed)
        .bind(entity.age)
        .bind(entity.weight)
        .bind(entity.owner_id)
        .bind(&entity.medical_notes)
        .bind(&entity.emergency_contact)
        .bind(&entity.photo_url)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating dog {}: {}", entity.id, e);
            AppError::Database(format!("Failed to update dog: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::DogNotFound(entity.id.to_string()));
        }

        self.find_by_id(entity.id)
            .await?
            .ok_or_else(|| AppError::DogNotFound(entity.id.to_string()))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        debug!("Deleting dog: {}", id);

        // Cascades the dog's rates and attendances (schema FKs)
        let result = sqlx::query("DELETE FROM dogs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting dog {}: {}", id, e);
                AppError::Database(format!("Failed to delete dog: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl DogRepository for PgDogRepository {
    #[instrument(skip(self))]
    async fn list_filtered(&self, owner_id: Option<Uuid>) -> AppResult<Vec<Dog>> {
        debug!("Listing dogs, owner filter: {:?}", owner_id);

        let rows = sqlx::query(&format!(
            r#"
            {SELECT_DOG}
            WHERE ($1::uuid IS NULL OR d.owner_id = $1)
            ORDER BY d.name
            "#
        ))
        .bind(owner_id)
        .map(Self::map_row)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing dogs: {}", e);
            AppError::Database(format!("Failed to fetch dogs: {}", e))
        })?;

        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn ids_for_owner(&self, owner_id: Uuid) -> AppResult<Vec<Uuid>> {
        let ids = sqlx::query_scalar("SELECT id FROM dogs WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error listing dog ids for owner {}: {}", owner_id, e);
                AppError::Database(format!("Failed to fetch dog ids: {}", e))
            })?;

        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{create_pool, tests::test_config};
    use chrono::{NaiveDate, Utc};
    use pawbill_core::models::Rate;
    use rust_decimal::Decimal;

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_delete_cascades_rates() {
        let pool = create_pool(&test_config()).await.unwrap();
        let repo = PgDogRepository::new(pool.clone());

        let owner_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, first_name, last_name, role)
            VALUES ($1, $2, 'x', 'Test', 'Owner', 'OWNER')
            "#,
        )
        .bind(owner_id)
        .bind(format!("{}@test.invalid", owner_id))
        .execute(&pool)
        .await
        .unwrap();

        let dog = repo
            .create(&Dog {
                id: Uuid::new_v4(),
                name: "Rex".to_string(),
                breed: None,
                age: None,
                weight: None,
                owner_id,
                owner: None,
                medical_notes: None,
                emergency_contact: None,
                photo_url: None,
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let rate = Rate {
            id: Uuid::new_v4(),
            dog_id: dog.id,
            hourly_rate: Decimal::new(2500, 2),
            effective_from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            created_at: Utc::now(),
        };
        sqlx::query(
            "INSERT INTO rates (id, dog_id, hourly_rate, effective_from) VALUES ($1, $2, $3, $4)",
        )
        .bind(rate.id)
        .bind(rate.dog_id)
        .bind(rate.hourly_rate)
        .bind(rate.effective_from)
        .execute(&pool)
        .await
        .unwrap();

        // Rate history must not block deletion
        assert!(repo.delete(dog.id).await.unwrap());

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rates WHERE dog_id = $1")
            .bind(dog.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, 0);

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(owner_id)
            .execute(&pool)
            .await
            .unwrap();
    }
}
