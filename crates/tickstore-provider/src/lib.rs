//! HTTP client for the market-data provider's daily-chart endpoint.

mod client;
mod error;
mod retry;
mod types;

pub use client::ProviderClient;
pub use error::ProviderError;
pub use types::{ChartResponse, DailyBar};
