//! Connecting to the clinical record store.

use std::time::{Duration, Instant};

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info};

use carescope_core::config::DatabaseConfig;
use carescope_core::error::{AppError, ErrorKind};
use carescope_core::result::AppResult;

/// Open a pool sized by `config`.
pub async fn connect(config: &DatabaseConfig) -> AppResult<PgPool> {
    config.validate()?;
    info!(
        url = %config.redacted_url(),
        pool_size = config.pool_size,
        "Opening clinical record store"
    );

    PgPoolOptions::new()
        .max_connections(config.pool_size)
        .acquire_timeout(config.timeout())
        .connect(&config.url)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Cannot reach {}: {e}", config.redacted_url()),
                e,
            )
        })
}

/// Round-trip one trivial statement and report how long it took.
pub async fn ping(pool: &PgPool) -> AppResult<Duration> {
    let started = Instant::now();
    let one: i32 = sqlx::query_scalar("SELECT 1")
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Ping failed", e))?;
    if one != 1 {
        return Err(AppError::database(format!("Ping returned {one}")));
    }

    let elapsed = started.elapsed();
    debug!(elapsed_ms = elapsed.as_millis() as u64, "Ping answered");
    Ok(elapsed)
}
