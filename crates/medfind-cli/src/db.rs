//! `db` command handlers.

use medfind_core::AppConfig;

/// # Errors
///
/// Returns an error if `DATABASE_URL` is unset or the database is unreachable.
pub(crate) async fn run_db_ping(config: &AppConfig) -> anyhow::Result<()> {
    let pool = medfind_db::connect_pool_from_config(config).await?;
    medfind_db::ping(&pool).await?;
    println!("database reachable");
    Ok(())
}

/// # Errors
///
/// Returns an error if `DATABASE_URL` is unset or a migration fails.
pub(crate) async fn run_db_migrate(config: &AppConfig) -> anyhow::Result<()> {
    let pool = medfind_db::connect_pool_from_config(config).await?;
    let applied = medfind_db::run_migrations(&pool).await?;
    println!("applied {applied} migration(s)");
    Ok(())
}
