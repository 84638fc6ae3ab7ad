//! Connection pool and schema migrations for the PostgreSQL stores.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::config::Config;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Opens the pool and makes sure the database answers before the server starts.
pub async fn create_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    log::info!(
        "Creating database pool (max {} connections)",
        config.database_max_connections
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(&config.database_url)
        .await?;

    ping(&pool).await?;
    Ok(pool)
}

pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    let one: i32 = sqlx::query_scalar("SELECT 1").fetch_one(pool).await?;
    log::debug!("Database answered ping with {}", one);
    Ok(())
}

/// Applies every pending migration under `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    log::info!("Running database migrations");

    match sqlx::migrate!("./migrations").run(pool).await {
        Ok(()) => {
            log::info!("Database schema is up to date");
            Ok(())
        }
        Err(e) => {
            log::warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}
