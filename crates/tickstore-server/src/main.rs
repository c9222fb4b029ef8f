mod api;
mod guard;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState, CollectionJob},
    guard::RunGuard,
    middleware::WebhookAuth,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(tickstore_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = tickstore_db::PoolConfig::from_app_config(&config);
    let pool = tickstore_db::connect_pool(&config.database_url, pool_config).await?;
    tickstore_db::run_migrations(&pool).await?;

    let auth = WebhookAuth::from_config(&config);
    let guard = RunGuard::new();
    let job = collection_job(pool.clone(), Arc::clone(&config));

    let app = build_app(AppState { pool, guard, job }, auth);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "tickstore server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// The background job dispatched on each accepted webhook trigger.
///
/// The run's outcome never reaches the caller that triggered it — the 202
/// already went out — so this closure owns all outcome handling: success is
/// logged inside the collector, and failure is logged here. Either way the
/// run row in `collection_runs` records what happened.
fn collection_job(pool: sqlx::PgPool, config: Arc<tickstore_core::AppConfig>) -> CollectionJob {
    Arc::new(move || {
        let pool = pool.clone();
        let config = Arc::clone(&config);
        Box::pin(async move {
            if let Err(e) = tickstore_collector::run_collection(&pool, &config, "webhook").await {
                tracing::error!(error = %e, "background collection job failed");
            }
        })
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
