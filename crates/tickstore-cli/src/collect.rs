//! `tickstore-cli collect` — one collection pass in an isolated process.

use tickstore_core::AppConfig;

pub async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let pool_config = tickstore_db::PoolConfig::from_app_config(config);
    let pool = tickstore_db::connect_pool(&config.database_url, pool_config).await?;
    tickstore_db::run_migrations(&pool).await?;

    let stats = tickstore_collector::run_collection(&pool, config, "cli").await?;

    println!(
        "collection complete: {} symbols processed ({} failed), {} bars written",
        stats.symbols_processed, stats.symbols_failed, stats.bars_written
    );
    Ok(())
}
