mod collect;
mod runs;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tickstore-cli")]
#[command(about = "tickstore command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one collection pass and exit.
    ///
    /// Unlike the webhook path, a CLI run is a fresh process with nothing
    /// else in flight, so no single-flight guard is involved.
    Collect,
    /// Show recent collection runs.
    Runs {
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = tickstore_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Collect => collect::run(&config).await,
        Commands::Runs { limit } => runs::show(&config, limit).await,
    }
}
