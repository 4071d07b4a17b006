/// Database migration runner
///
/// Migrations live in `taskflow-shared/migrations/` and are embedded into
/// the binary at compile time by `sqlx::migrate!`.
///
/// # Example
///
/// ```no_run
/// use taskflow_shared::db::migrations::{ensure_database_exists, run_migrations};
/// use taskflow_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let url = std::env::var("DATABASE_URL")?;
/// ensure_database_exists(&url).await?;
///
/// let pool = create_pool(DatabaseConfig { url, ..Default::default() }).await?;
/// run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::{migrate::MigrateDatabase, postgres::PgPool, Postgres};
use tracing::{debug, error, info};

/// Applies all pending migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");

    sqlx::migrate!("./migrations").run(pool).await.map_err(|e| {
        error!(error = %e, "Migration failed");
        e
    })?;

    info!("Database schema is up to date");
    Ok(())
}

/// Creates the database named in `database_url` if it does not exist
///
/// Useful in development; production databases are provisioned upfront.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if Postgres::database_exists(database_url).await? {
        debug!("Database already exists");
        return Ok(());
    }

    info!("Database does not exist, creating it");
    Postgres::create_database(database_url).await
}
