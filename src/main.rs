use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use chrono::{Datelike, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use league_stats::api::{build_router, state::AppState};
use league_stats::config::AppConfig;
use league_stats::ledger::JsonlLedgerStore;
use league_stats::service::{parse_stat_type, parse_year, StatsError, StatsService};
use league_stats::storage::StorageConfig;

#[derive(Parser)]
#[command(name = "league-stats")]
#[command(about = "Leaderboards and rankings for poker leagues")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error); defaults to the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },

    /// Compute a stat once and print it as JSON
    Stats {
        /// League id
        #[arg(long)]
        league: i64,

        /// Stat type (omit for general league stats)
        #[arg(long)]
        stat_type: Option<String>,

        /// Year (defaults to the current year)
        #[arg(long)]
        year: Option<String>,

        /// Print the full ranking instead of the leader
        #[arg(long)]
        ranking: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(Path::new(&cli.config))?;
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = PathBuf::from(data_dir);
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting league-stats v{}", env!("CARGO_PKG_VERSION"));

    let store = JsonlLedgerStore::new(StorageConfig::new(config.data_dir.clone()));
    let service = StatsService::new(Arc::new(store), &config.stats);

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            let state = AppState {
                service: Arc::new(service),
                cors_origin: config.server.cors_origin.clone(),
            };
            let app = build_router(state);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!(data_dir = %config.data_dir.display(), "Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Stats {
            league,
            stat_type,
            year,
            ranking,
        } => {
            let window = parse_year(year.as_deref(), Utc::now().year())?;
            if league <= 0 {
                return Err(StatsError::InvalidLeagueId(league.to_string()).into());
            }

            let json = match (stat_type.as_deref(), ranking) {
                (Some(raw), true) => {
                    let response = service.ranking(league, parse_stat_type(raw)?, window).await?;
                    serde_json::to_string_pretty(&response)?
                }
                (Some(raw), false) => {
                    let response = service
                        .single_stat(league, parse_stat_type(raw)?, window)
                        .await?;
                    serde_json::to_string_pretty(&response)?
                }
                (None, true) => return Err(StatsError::MissingStatType.into()),
                (None, false) => {
                    let response = service.general_stats(league, window).await?;
                    serde_json::to_string_pretty(&response)?
                }
            };
            println!("{}", json);
        }
    }

    Ok(())
}
