//! # Database Migrations
//!
//! Embedded SQL migrations for Till.
//!
//! ## Adding New Migrations
//!
//! 1. Create a new file in `migrations/sqlite/` with the next sequence number
//! 2. Name format: `NNN_description.sql` (e.g., `002_add_till_terminal.sql`)
//! 3. **NEVER** modify existing migrations - always add new ones

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

/// Embedded migrations from the `migrations/sqlite` directory.
///
/// ```text
/// migrations/sqlite/
/// └── 001_cash_counters.sql   # counters, audit events, collaborator tables
/// ```
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending database migrations.
///
/// Idempotent; each migration runs in its own transaction and is recorded
/// in `_sqlx_migrations`.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!("Checking for pending migrations");

    MIGRATOR.run(pool).await?;

    info!("All migrations applied successfully");
    Ok(())
}

/// Returns `(total_migrations, applied_migrations)` for the readiness check.
///
/// A database that has never been migrated has no `_sqlx_migrations` table
/// and reports zero applied. Migrations recorded as failed are not counted.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let tracked: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'",
    )
    .fetch_one(pool)
    .await?;
    if tracked == 0 {
        return Ok((total, 0));
    }

    let applied: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?;

    Ok((total, applied as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_status_of_fresh_and_migrated_database() {
        let pool = memory_pool().await;
        let total = MIGRATOR.migrations.len();
        assert_eq!(migration_status(&pool).await.unwrap(), (total, 0));

        run_migrations(&pool).await.unwrap();
        assert_eq!(migration_status(&pool).await.unwrap(), (total, total));
    }

    #[tokio::test]
    async fn test_failed_migrations_are_not_counted() {
        let pool = memory_pool().await;
        run_migrations(&pool).await.unwrap();

        sqlx::query(
            "INSERT INTO _sqlx_migrations (version, description, success, checksum, execution_time)
             VALUES (9999, 'half applied', 0, x'00', 0)",
        )
        .execute(&pool)
        .await
        .unwrap();

        let total = MIGRATOR.migrations.len();
        assert_eq!(migration_status(&pool).await.unwrap(), (total, total));
    }

    #[tokio::test]
    async fn test_status_errors_are_reported() {
        let pool = memory_pool().await;
        pool.close().await;
        assert!(migration_status(&pool).await.is_err());
    }
}
