//! Database connection pool using OnceCell pattern.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::OnceCell;

use crate::config::Settings;

static POOL: OnceCell<PgPool> = OnceCell::const_new();

/// Get or initialize the database connection pool.
pub async fn get_pool() -> Result<&'static PgPool, sqlx::Error> {
    POOL.get_or_try_init(|| async {
        let settings =
            Settings::current().map_err(|e| sqlx::Error::Configuration(Box::new(e)))?;

        tracing::info!(host = %settings.database.host, "Connecting to database");
        PgPoolOptions::new()
            .max_connections(settings.database.max_connections)
            .connect(&settings.database.url())
            .await
    })
    .await
}
