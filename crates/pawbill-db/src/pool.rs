//! PostgreSQL connection pool management
//!
//! Provides utilities for creating and managing database connection pools.

use pawbill_core::config::DatabaseConfig;
use pawbill_core::{AppError, AppResult};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::{info, warn};

/// Create a PostgreSQL connection pool
///
/// Pool sizing and timeouts come from the database section of the
/// application configuration.
///
/// # Example
///
/// ```no_run
/// use pawbill_core::config::DatabaseConfig;
/// use pawbill_db::create_pool;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: "postgresql://localhost/pawbill".to_string(),
///         max_connections: 10,
///         acquire_timeout_secs: 30,
///         idle_timeout_secs: 600,
///     };
///     let pool = create_pool(&config).await?;
///     Ok(())
/// }
/// ```
pub async fn create_pool(config: &DatabaseConfig) -> AppResult<PgPool> {
    info!("Creating database connection pool");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Some(Duration::from_secs(config.idle_timeout_secs)))
        .test_before_acquire(true)
        .connect(&config.url)
        .await
        .map_err(|e| {
            warn!("Failed to create database pool: {}", e);
            AppError::Pool(format!("Failed to connect to database: {}", e))
        })?;

    info!(
        "Database pool created successfully with {} max connections",
        config.max_connections
    );

    // Test the connection
    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(|e| AppError::Database(format!("Database health check failed: {}", e)))?;

    info!("Database connection verified");

    Ok(pool)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Config pointing at DATABASE_URL, for database-backed tests
    pub(crate) fn test_config() -> DatabaseConfig {
        DatabaseConfig {
            url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql://localhost/pawbill".to_string()),
            max_connections: 5,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_create_pool() {
        let result = create_pool(&test_config()).await;
        assert!(result.is_ok());
    }
}
