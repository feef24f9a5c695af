use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};
use tripwire_core::AppError;

/// Opens the audit store pool and applies pending schema migrations.
pub async fn connect_and_migrate(database_url: &str) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(|error| {
            error!(error = %error, "failed to connect to audit store database");
            AppError::Store(format!("failed to connect to database: {error}"))
        })?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| {
            error!(error = %error, "failed to migrate audit store schema");
            AppError::Store(format!("failed to run migrations: {error}"))
        })?;
    info!("audit store schema is up to date");

    Ok(pool)
}
