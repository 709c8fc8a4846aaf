use crate::error::DbError;
use dotenvy::dotenv;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::env;
use std::time::Duration;

/// Establishes a connection pool to the PostgreSQL database.
///
/// This function reads `DATABASE_URL` (from the environment or a `.env` file),
/// creates a connection pool and returns it. The pool is shared across the
/// whole application.
pub async fn connect() -> Result<PgPool, DbError> {
    // A missing .env file is fine as long as the variable is set some other way.
    dotenv().ok();

    let database_url = env::var("DATABASE_URL")
        .map_err(|_e| DbError::ConnectionConfigError("DATABASE_URL must be set.".to_string()))?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to the database.");
    Ok(pool)
}

/// Applies the embedded migrations so the schema is up to date at start-up.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations applied.");
    Ok(())
}
