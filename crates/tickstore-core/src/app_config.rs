use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::NaiveDate;

#[derive(Clone)]
pub struct AppConfig {
    pub webhook_token: String,
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub symbols_path: PathBuf,
    pub provider_base_url: String,
    pub provider_timeout_secs: u64,
    pub provider_user_agent: String,
    pub provider_max_retries: u32,
    pub provider_retry_backoff_base_secs: u64,
    pub collector_max_concurrent_symbols: usize,
    pub collector_run_timeout_secs: u64,
    pub collector_history_start: NaiveDate,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("webhook_token", &"[redacted]")
            .field("database_url", &"[redacted]")
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("symbols_path", &self.symbols_path)
            .field("provider_base_url", &self.provider_base_url)
            .field("provider_timeout_secs", &self.provider_timeout_secs)
            .field("provider_user_agent", &self.provider_user_agent)
            .field("provider_max_retries", &self.provider_max_retries)
            .field(
                "provider_retry_backoff_base_secs",
                &self.provider_retry_backoff_base_secs,
            )
            .field(
                "collector_max_concurrent_symbols",
                &self.collector_max_concurrent_symbols,
            )
            .field(
                "collector_run_timeout_secs",
                &self.collector_run_timeout_secs,
            )
            .field("collector_history_start", &self.collector_history_start)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
