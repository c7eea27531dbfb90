//! Embedded schema migrations.
//!
//! The SQL files under `migrations/sqlite/` are compiled into the binary, so the
//! server and the seeder bring their own schema. Applied versions are tracked
//! in `_sqlx_migrations`; a file that has shipped is never edited, a new
//! `NNN_name.sql` is added instead.
//!
//! ```text
//! 001_initial_schema.sql   users, admins, categories, sweets, purchases
//! 002_indexes.sql          catalog filters, price range, purchase history
//! ```

use sqlx::migrate::Migrator;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies every migration the database has not seen yet, in version order.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    let known = MIGRATOR.iter().count();
    info!(known, "Applying schema migrations");

    MIGRATOR.run(pool).await?;

    info!("Schema is up to date");
    Ok(())
}

/// `(embedded, applied)` migration counts. A fresh pool reports zero applied.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let embedded = MIGRATOR.iter().count();

    let applied: Option<i64> = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_optional(pool)
        .await
        .ok()
        .flatten();

    Ok((embedded, applied.unwrap_or(0).max(0) as usize))
}
