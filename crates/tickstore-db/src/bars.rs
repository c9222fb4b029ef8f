//! Database operations for the `daily_bars` table.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

/// One daily OHLCV bar ready for insertion.
#[derive(Debug, Clone)]
pub struct NewDailyBar {
    pub symbol: String,
    pub bar_date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: i64,
}

/// Returns the most recent `bar_date` stored for `symbol`, or `None` if the
/// symbol has no history yet. Drives incremental fetches: the collector asks
/// the provider only for days after this date.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn latest_bar_date(pool: &PgPool, symbol: &str) -> Result<Option<NaiveDate>, DbError> {
    let date = sqlx::query_scalar::<_, Option<NaiveDate>>(
        "SELECT MAX(bar_date) FROM daily_bars WHERE symbol = $1",
    )
    .bind(symbol)
    .fetch_one(pool)
    .await?;

    Ok(date)
}

/// Upserts a batch of daily bars, returning the number of rows written.
///
/// Conflicts on `(symbol, bar_date)` update the OHLCV columns in place, so
/// re-fetching an overlapping window is idempotent and picks up corrections
/// the provider publishes for recent sessions.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails; the batch runs in a single
/// transaction, so a failure writes nothing.
pub async fn upsert_daily_bars(pool: &PgPool, bars: &[NewDailyBar]) -> Result<u64, DbError> {
    if bars.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    let mut written = 0u64;

    for bar in bars {
        let result = sqlx::query(
            "INSERT INTO daily_bars (symbol, bar_date, open, high, low, close, volume) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (symbol, bar_date) DO UPDATE SET \
                 open   = EXCLUDED.open, \
                 high   = EXCLUDED.high, \
                 low    = EXCLUDED.low, \
                 close  = EXCLUDED.close, \
                 volume = EXCLUDED.volume",
        )
        .bind(&bar.symbol)
        .bind(bar.bar_date)
        .bind(bar.open)
        .bind(bar.high)
        .bind(bar.low)
        .bind(bar.close)
        .bind(bar.volume)
        .execute(&mut *tx)
        .await?;

        written += result.rows_affected();
    }

    tx.commit().await?;
    Ok(written)
}
