use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::{info, warn};

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(1)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(database_url)
        .await?;
    info!("connected to PostgreSQL");
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    info!("running database migrations");
    sqlx::migrate!().run(pool).await?;
    info!("migrations completed");
    Ok(())
}

/// Drops every table, migration history included, and migrates from scratch.
pub async fn reset_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    warn!("dropping all tables, existing data will be lost");
    sqlx::query("DROP TABLE IF EXISTS sessions, posts, users, _sqlx_migrations CASCADE")
        .execute(pool)
        .await?;
    run_migrations(pool).await
}
