/// Database migration runner
///
/// Migrations live in `taskboard-shared/migrations/` and are embedded at
/// compile time with `sqlx::migrate!`. They create the `documents` table used
/// by the PostgreSQL document store.

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Runs all pending migrations
///
/// # Errors
///
/// Returns an error if a migration fails to apply or the connection drops.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    match sqlx::migrate!("./migrations").run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}
