//! Integration tests for `ProviderClient::fetch_daily_bars`.
//!
//! Uses `wiremock` to stand up a local HTTP server for each test so no real
//! network traffic is made. Covers the happy paths (bars, empty history,
//! incremental start date) and every error variant the client can propagate.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tickstore_provider::{ProviderClient, ProviderError};

/// Builds a `ProviderClient` suitable for tests: 5-second timeout, descriptive UA, no retries.
fn test_client(base: &str) -> ProviderClient {
    ProviderClient::new(base, 5, "tickstore-test/0.1", 0, 0)
        .expect("failed to build test ProviderClient")
}

/// Builds a `ProviderClient` with retries enabled for retry-specific tests.
fn test_client_with_retries(base: &str, max_retries: u32) -> ProviderClient {
    ProviderClient::new(base, 5, "tickstore-test/0.1", max_retries, 0)
        .expect("failed to build test ProviderClient")
}

/// Minimal valid one-bar JSON fixture.
fn one_bar_json(symbol: &str) -> serde_json::Value {
    json!({
        "symbol": symbol,
        "bars": [{
            "date": "2024-01-02",
            "open": "187.15",
            "high": "188.44",
            "low": "183.89",
            "close": "185.64",
            "volume": 82488700
        }]
    })
}

#[tokio::test]
async fn fetch_daily_bars_returns_bars_on_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/chart/daily/AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&one_bar_json("AAPL")))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.fetch_daily_bars("AAPL", None).await;

    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let bars = result.unwrap();
    assert_eq!(bars.len(), 1, "expected exactly 1 bar");
    assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    assert_eq!(bars[0].close, Decimal::new(18564, 2));
    assert_eq!(bars[0].volume, 82_488_700);
}

#[tokio::test]
async fn fetch_daily_bars_forwards_start_date_as_query_param() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/chart/daily/TSLA"))
        .and(query_param("start", "2024-06-01"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(&json!({"symbol": "TSLA", "bars": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let result = client.fetch_daily_bars("TSLA", Some(start)).await;

    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    assert!(result.unwrap().is_empty());
}

#[tokio::test]
async fn fetch_daily_bars_returns_empty_vec_when_no_new_data() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/chart/daily/SPY"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(&json!({"symbol": "SPY", "bars": []})),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.fetch_daily_bars("SPY", None).await;

    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    assert!(
        result.unwrap().is_empty(),
        "expected empty Vec when provider has no new bars"
    );
}

#[tokio::test]
async fn fetch_daily_bars_maps_404_to_symbol_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/chart/daily/NOPE"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.fetch_daily_bars("NOPE", None).await;

    assert!(
        matches!(result, Err(ProviderError::SymbolNotFound { ref symbol }) if symbol == "NOPE"),
        "expected SymbolNotFound, got: {result:?}"
    );
}

#[tokio::test]
async fn fetch_daily_bars_maps_429_to_rate_limited_with_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/chart/daily/AAPL"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "17"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.fetch_daily_bars("AAPL", None).await;

    assert!(
        matches!(
            result,
            Err(ProviderError::RateLimited {
                retry_after_secs: 17
            })
        ),
        "expected RateLimited {{ 17 }}, got: {result:?}"
    );
}

#[tokio::test]
async fn fetch_daily_bars_retries_429_then_succeeds() {
    let server = MockServer::start().await;

    // First attempt is rate limited; the retry gets a valid body.
    Mock::given(method("GET"))
        .and(path("/v1/chart/daily/AAPL"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/chart/daily/AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&one_bar_json("AAPL")))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client_with_retries(&server.uri(), 2);
    let result = client.fetch_daily_bars("AAPL", None).await;

    assert!(result.is_ok(), "expected Ok after retry, got: {result:?}");
    assert_eq!(result.unwrap().len(), 1);
}

#[tokio::test]
async fn fetch_daily_bars_does_not_retry_server_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/chart/daily/AAPL"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client_with_retries(&server.uri(), 3);
    let result = client.fetch_daily_bars("AAPL", None).await;

    assert!(
        matches!(
            result,
            Err(ProviderError::UnexpectedStatus { status: 500, .. })
        ),
        "expected UnexpectedStatus(500), got: {result:?}"
    );
}

#[tokio::test]
async fn fetch_daily_bars_maps_bad_body_to_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/chart/daily/AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.fetch_daily_bars("AAPL", None).await;

    assert!(
        matches!(result, Err(ProviderError::Deserialize { ref symbol, .. }) if symbol == "AAPL"),
        "expected Deserialize, got: {result:?}"
    );
}
