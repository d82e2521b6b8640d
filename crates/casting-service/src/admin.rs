//! Operator database tasks run by `casting-admin`.

use crate::MIGRATOR;
use sqlx::PgPool;
use tracing::instrument;

/// Tables owned by the service, dependents first.
const TABLES: [&str; 3] = ["movie_actors", "movies", "actors"];

/// Apply pending migrations.
#[instrument(skip_all, name = "casting.admin.migrate")]
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await?;
    tracing::info!(target: "casting.admin", "Migrations applied");
    Ok(())
}

/// Drop every service table and the migration history, then re-apply all
/// migrations. All rows are lost.
#[instrument(skip_all, name = "casting.admin.reset")]
pub async fn reset(pool: &PgPool) -> anyhow::Result<()> {
    let mut tx = pool.begin().await?;
    for table in TABLES {
        sqlx::query(&format!("DROP TABLE IF EXISTS {table} CASCADE"))
            .execute(&mut *tx)
            .await?;
    }
    sqlx::query("DROP TABLE IF EXISTS _sqlx_migrations")
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::warn!(target: "casting.admin", "All casting tables dropped");

    migrate(pool).await?;
    Ok(())
}
