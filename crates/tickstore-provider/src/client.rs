use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Client;

use crate::error::ProviderError;
use crate::retry::retry_with_backoff;
use crate::types::{ChartResponse, DailyBar};

/// HTTP client for the provider's `GET /v1/chart/daily/{symbol}` endpoint.
///
/// Handles rate limiting (429), unknown symbols (404), and other non-2xx
/// responses as typed errors. Transient errors (429, network failures) are
/// automatically retried with exponential backoff up to `max_retries`
/// additional attempts.
pub struct ProviderClient {
    client: Client,
    base_url: String,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff: `backoff_base_secs * 2^attempt`.
    backoff_base_secs: u64,
}

impl ProviderClient {
    /// Creates a `ProviderClient` with configured timeout, `User-Agent`, and retry policy.
    ///
    /// `max_retries` is the number of additional attempts after the first failure for
    /// retriable errors (429, network errors). Set to `0` to disable retries.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidBaseUrl`] if `base_url` does not parse as an
    /// absolute URL, or [`ProviderError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ProviderError> {
        let trimmed = base_url.trim_end_matches('/');
        reqwest::Url::parse(trimmed).map_err(|e| ProviderError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: trimmed.to_owned(),
            max_retries,
            backoff_base_secs,
        })
    }

    /// Creates a `ProviderClient` from the application config.
    ///
    /// # Errors
    ///
    /// Same as [`ProviderClient::new`].
    pub fn from_app_config(config: &tickstore_core::AppConfig) -> Result<Self, ProviderError> {
        Self::new(
            &config.provider_base_url,
            config.provider_timeout_secs,
            &config.provider_user_agent,
            config.provider_max_retries,
            config.provider_retry_backoff_base_secs,
        )
    }

    /// Fetches daily bars for `symbol`, optionally starting at `start`
    /// (inclusive), with automatic retry on transient errors.
    ///
    /// # Errors
    ///
    /// - [`ProviderError::RateLimited`] — HTTP 429 after all retries exhausted.
    /// - [`ProviderError::SymbolNotFound`] — HTTP 404 (not retried).
    /// - [`ProviderError::UnexpectedStatus`] — any other non-2xx status (not retried).
    /// - [`ProviderError::Http`] — network or TLS failure after all retries exhausted.
    /// - [`ProviderError::Deserialize`] — response body is not valid JSON (not retried).
    pub async fn fetch_daily_bars(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
    ) -> Result<Vec<DailyBar>, ProviderError> {
        let url = self.chart_url(symbol, start);
        let max_retries = self.max_retries;
        let backoff_base_secs = self.backoff_base_secs;

        retry_with_backoff(max_retries, backoff_base_secs, || {
            let url = url.clone();
            let symbol = symbol.to_owned();
            async move {
                let response = self
                    .client
                    .get(&url)
                    .header(reqwest::header::ACCEPT, "application/json")
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);

                    return Err(ProviderError::RateLimited { retry_after_secs });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(ProviderError::SymbolNotFound { symbol });
                }

                if !status.is_success() {
                    return Err(ProviderError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                let body = response.text().await?;
                let parsed = serde_json::from_str::<ChartResponse>(&body).map_err(|e| {
                    ProviderError::Deserialize {
                        symbol: symbol.clone(),
                        source: e,
                    }
                })?;

                Ok(parsed.bars)
            }
        })
        .await
    }

    /// Builds the chart URL for the given symbol and optional start date.
    fn chart_url(&self, symbol: &str, start: Option<NaiveDate>) -> String {
        let base = &self.base_url;
        match start {
            Some(date) => format!("{base}/v1/chart/daily/{symbol}?start={date}"),
            None => format!("{base}/v1/chart/daily/{symbol}"),
        }
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
