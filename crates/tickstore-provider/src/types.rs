use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

/// One daily OHLCV bar as returned by the provider.
///
/// Prices arrive as decimal strings ("187.15") so no precision is lost in
/// transit; volume is a plain integer share count.
#[derive(Debug, Clone, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    #[serde(with = "rust_decimal::serde::str")]
    pub open: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub high: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub low: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub close: Decimal,
    pub volume: i64,
}

/// Response body of `GET /v1/chart/daily/{symbol}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    pub symbol: String,
    pub bars: Vec<DailyBar>,
}
