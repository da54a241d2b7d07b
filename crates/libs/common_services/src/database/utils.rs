use crate::database::DbError;
use app_state::DatabaseSettings;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::info;

/// Get a database connection pool and run pending migrations.
pub async fn get_db_pool(
    database_url: &str,
    db_settings: &DatabaseSettings,
) -> Result<Pool<Postgres>, DbError> {
    info!("Connecting to database.");
    let pool = PgPoolOptions::new()
        .max_connections(db_settings.max_connections)
        .min_connections(db_settings.min_connections)
        .max_lifetime(Duration::from_secs(db_settings.max_lifetime))
        .idle_timeout(Duration::from_secs(db_settings.idle_timeout))
        .acquire_timeout(Duration::from_secs(db_settings.acquire_timeout))
        .test_before_acquire(true)
        .connect(database_url)
        .await?;

    info!("Running migrations.");
    sqlx::migrate!("../../../migrations").run(&pool).await?;
    Ok(pool)
}
