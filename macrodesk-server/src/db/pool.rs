//! Database connection pool management
//!
//! Uses sqlx PgPool with a warm core (`pool_size`) and a bounded overflow.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;

/// Create a PostgreSQL connection pool.
///
/// Connections are pinged before being handed out, so a dropped server
/// connection surfaces as a reconnect rather than a failed request.
///
/// # Errors
///
/// Returns an error if the initial connection fails.
///
/// # Example
///
/// ```ignore
/// let config = DatabaseConfig::new("postgres://localhost/macrodesk", "public")?;
/// let pool = create_pool(&config).await?;
/// ```
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    tracing::info!(
        pool_size = config.pool_size,
        max_connections = config.max_connections(),
        "Connecting to database"
    );

    PgPoolOptions::new()
        .min_connections(config.pool_size.min(config.max_connections()))
        .max_connections(config.max_connections())
        .test_before_acquire(true)
        .connect(&config.url)
        .await
}
