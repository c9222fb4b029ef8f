//! The data-collection pipeline shared by the webhook-triggered server task
//! and the one-shot CLI run.
//!
//! One call to [`run_collection`] is one collection run: it creates a
//! `collection_runs` row, fetches daily bars for every configured symbol
//! (incrementally, starting after the latest stored bar), upserts them, and
//! closes the run row as succeeded or failed. A symbol that fails is logged
//! and counted; the remaining symbols still run.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use sqlx::PgPool;
use thiserror::Error;

use tickstore_core::AppConfig;
use tickstore_db::NewDailyBar;
use tickstore_provider::ProviderClient;

#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("failed to load symbol universe: {0}")]
    Symbols(#[from] tickstore_core::ConfigError),

    #[error("failed to build provider client: {0}")]
    ProviderClient(#[from] tickstore_provider::ProviderError),

    #[error(transparent)]
    Db(#[from] tickstore_db::DbError),

    #[error("collection run timed out after {secs}s")]
    Timeout { secs: u64 },
}

/// Aggregated result of one completed collection run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunStats {
    pub symbols_processed: i32,
    pub symbols_failed: i32,
    pub bars_written: i32,
}

/// Executes one full collection run and records it in `collection_runs`.
///
/// `trigger_source` labels the run row (`"webhook"` or `"cli"`). The symbol
/// loop is bounded by `collector_run_timeout_secs`; an elapsed timeout fails
/// the run. Every failure path closes the run row before returning, so the
/// run history never shows a run stuck in `running` once this returns.
///
/// # Errors
///
/// Returns [`CollectorError`] if the run could not be set up (symbols file,
/// provider client, run bookkeeping) or timed out. Per-symbol fetch/persist
/// failures are NOT errors: they are counted in [`RunStats::symbols_failed`].
pub async fn run_collection(
    pool: &PgPool,
    config: &AppConfig,
    trigger_source: &str,
) -> Result<RunStats, CollectorError> {
    let run = tickstore_db::create_collection_run(pool, trigger_source).await?;
    if let Err(e) = tickstore_db::start_collection_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, &format!("{e}")).await;
        return Err(e.into());
    }

    let timeout_secs = config.collector_run_timeout_secs;
    let deadline = Duration::from_secs(timeout_secs);

    match tokio::time::timeout(deadline, process_symbols(pool, config)).await {
        Ok(Ok(stats)) => {
            tickstore_db::complete_collection_run(
                pool,
                run.id,
                stats.symbols_processed,
                stats.symbols_failed,
                stats.bars_written,
            )
            .await?;
            tracing::info!(
                run_id = run.id,
                symbols_processed = stats.symbols_processed,
                symbols_failed = stats.symbols_failed,
                bars_written = stats.bars_written,
                "collection run succeeded"
            );
            Ok(stats)
        }
        Ok(Err(e)) => {
            fail_run_best_effort(pool, run.id, &format!("{e}")).await;
            Err(e)
        }
        Err(_elapsed) => {
            let err = CollectorError::Timeout { secs: timeout_secs };
            fail_run_best_effort(pool, run.id, &format!("{err}")).await;
            Err(err)
        }
    }
}

/// Load the universe and drive per-symbol collection with bounded concurrency.
async fn process_symbols(pool: &PgPool, config: &AppConfig) -> Result<RunStats, CollectorError> {
    let universe = tickstore_core::load_symbols(&config.symbols_path)?;
    if universe.symbols.is_empty() {
        tracing::warn!(
            path = %config.symbols_path.display(),
            "symbol universe is empty; nothing to collect"
        );
        return Ok(RunStats::default());
    }

    let client = Arc::new(ProviderClient::from_app_config(config)?);
    let max_concurrent = config.collector_max_concurrent_symbols.max(1);

    tracing::info!(
        symbols = universe.symbols.len(),
        max_concurrent,
        "starting collection"
    );

    let results: Vec<(String, anyhow::Result<u64>)> = stream::iter(universe.symbols)
        .map(|entry| {
            let client = Arc::clone(&client);
            async move {
                let outcome =
                    collect_symbol(pool, &client, config.collector_history_start, &entry.symbol)
                        .await;
                (entry.symbol, outcome)
            }
        })
        .buffer_unordered(max_concurrent)
        .collect()
        .await;

    let mut stats = RunStats::default();
    for (symbol, outcome) in results {
        match outcome {
            Ok(written) => {
                stats.symbols_processed = stats.symbols_processed.saturating_add(1);
                stats.bars_written = stats
                    .bars_written
                    .saturating_add(i32::try_from(written).unwrap_or(i32::MAX));
            }
            Err(e) => {
                tracing::error!(symbol = %symbol, error = %e, "symbol collection failed");
                stats.symbols_processed = stats.symbols_processed.saturating_add(1);
                stats.symbols_failed = stats.symbols_failed.saturating_add(1);
            }
        }
    }

    Ok(stats)
}

/// Fetch and persist new bars for a single symbol.
///
/// Asks the store for the latest bar already held, fetches from the following
/// day (or from `history_start` for a symbol with no history), and upserts
/// whatever comes back. Returns the number of bars written.
async fn collect_symbol(
    pool: &PgPool,
    client: &ProviderClient,
    history_start: NaiveDate,
    symbol: &str,
) -> anyhow::Result<u64> {
    let latest = tickstore_db::latest_bar_date(pool, symbol).await?;
    let start = next_fetch_start(latest, history_start);

    let bars = client.fetch_daily_bars(symbol, Some(start)).await?;
    if bars.is_empty() {
        tracing::info!(symbol = %symbol, %start, "no new bars since last run");
        return Ok(0);
    }

    let new_bars: Vec<NewDailyBar> = bars
        .into_iter()
        .map(|bar| NewDailyBar {
            symbol: symbol.to_owned(),
            bar_date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        })
        .collect();

    let written = tickstore_db::upsert_daily_bars(pool, &new_bars).await?;
    tracing::info!(symbol = %symbol, bars = written, "bars persisted");
    Ok(written)
}

/// First date to request from the provider: the day after the latest stored
/// bar, or the configured history start for a symbol with no bars yet.
fn next_fetch_start(latest: Option<NaiveDate>, history_start: NaiveDate) -> NaiveDate {
    match latest {
        Some(date) => date.succ_opt().unwrap_or(date),
        None => history_start,
    }
}

/// Mark the run failed, logging (rather than propagating) a bookkeeping error.
/// The caller is already on an error path; a second failure here must not mask it.
async fn fail_run_best_effort(pool: &PgPool, run_id: i64, error_message: &str) {
    if let Err(e) = tickstore_db::fail_collection_run(pool, run_id, error_message).await {
        tracing::error!(run_id, error = %e, "failed to mark collection run as failed");
    }
}
