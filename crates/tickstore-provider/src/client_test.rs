use chrono::NaiveDate;

use super::*;

fn client_for(base: &str) -> ProviderClient {
    ProviderClient::new(base, 5, "tickstore-test/0.1", 0, 0).expect("build test client")
}

#[test]
fn chart_url_without_start_has_no_query() {
    let client = client_for("https://data.example.com");
    assert_eq!(
        client.chart_url("AAPL", None),
        "https://data.example.com/v1/chart/daily/AAPL"
    );
}

#[test]
fn chart_url_with_start_appends_iso_date() {
    let client = client_for("https://data.example.com");
    let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    assert_eq!(
        client.chart_url("BRK.B", Some(start)),
        "https://data.example.com/v1/chart/daily/BRK.B?start=2024-01-02"
    );
}

#[test]
fn new_trims_trailing_slash_from_base_url() {
    let client = client_for("https://data.example.com/");
    assert_eq!(
        client.chart_url("SPY", None),
        "https://data.example.com/v1/chart/daily/SPY"
    );
}

#[test]
fn new_rejects_relative_base_url() {
    let result = ProviderClient::new("not a url", 5, "tickstore-test/0.1", 0, 0);
    assert!(matches!(
        result,
        Err(ProviderError::InvalidBaseUrl { .. })
    ));
}
