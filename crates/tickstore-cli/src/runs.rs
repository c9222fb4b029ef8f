//! `tickstore-cli runs` — print recent collection runs.

use tickstore_core::AppConfig;
use tickstore_db::CollectionRunRow;

pub async fn show(config: &AppConfig, limit: i64) -> anyhow::Result<()> {
    let pool_config = tickstore_db::PoolConfig::from_app_config(config);
    let pool = tickstore_db::connect_pool(&config.database_url, pool_config).await?;

    let rows = tickstore_db::list_collection_runs(&pool, limit.clamp(1, 200)).await?;
    if rows.is_empty() {
        println!("no collection runs recorded yet");
        return Ok(());
    }

    for row in &rows {
        println!("{}", format_run(row));
    }
    Ok(())
}

fn format_run(row: &CollectionRunRow) -> String {
    let completed = row
        .completed_at
        .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string());

    let mut line = format!(
        "{}  {:<9} {:<8} completed={} symbols={}/{} bars={}",
        row.public_id,
        row.status,
        row.trigger_source,
        completed,
        row.symbols_processed - row.symbols_failed,
        row.symbols_processed,
        row.bars_written,
    );

    if let Some(err) = &row.error_message {
        line.push_str(&format!("  error: {err}"));
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn sample_row() -> CollectionRunRow {
        CollectionRunRow {
            id: 1,
            public_id: Uuid::nil(),
            trigger_source: "cli".to_string(),
            status: "succeeded".to_string(),
            started_at: Some(Utc.with_ymd_and_hms(2024, 6, 14, 2, 0, 0).unwrap()),
            completed_at: Some(Utc.with_ymd_and_hms(2024, 6, 14, 2, 15, 0).unwrap()),
            symbols_processed: 7,
            symbols_failed: 2,
            bars_written: 1840,
            error_message: None,
            created_at: Utc.with_ymd_and_hms(2024, 6, 14, 2, 0, 0).unwrap(),
        }
    }

    #[test]
    fn format_run_includes_counters_and_completion_time() {
        let line = format_run(&sample_row());
        assert!(line.contains("succeeded"));
        assert!(line.contains("completed=2024-06-14 02:15:00"));
        assert!(line.contains("symbols=5/7"));
        assert!(line.contains("bars=1840"));
        assert!(!line.contains("error:"));
    }

    #[test]
    fn format_run_appends_error_message_when_present() {
        let mut row = sample_row();
        row.status = "failed".to_string();
        row.error_message = Some("collection run timed out after 3600s".to_string());
        let line = format_run(&row);
        assert!(line.contains("failed"));
        assert!(line.contains("error: collection run timed out after 3600s"));
    }
}
