//! folio server binary.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use folio_core::SystemClock;
use folio_core::config::AppConfig;
use folio_server::{AppState, create_router, refresh};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// folio - publishing backend with asset lifecycle management
#[derive(Parser, Debug)]
#[command(name = "folio-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "FOLIO_CONFIG",
        default_value = "config/folio.toml"
    )]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Serve the HTTP API (default)
    Serve,
    /// Run one sweep of pending assets and exit
    Sweep,
}

/// Load configuration from an optional TOML file overlaid with `FOLIO_` env vars.
fn load_config(path: &str) -> Result<AppConfig> {
    let mut figment = Figment::new();

    if Path::new(path).exists() {
        tracing::info!(config_path = %path, "Loading configuration from file");
        figment = figment.merge(Toml::file(path));
    } else {
        tracing::debug!("No config file found at {}", path);
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("FOLIO_").split("__"))
        .extract()
        .context("failed to load configuration")?;

    config
        .validate()
        .map_err(|e| anyhow::anyhow!(e))
        .context("invalid configuration")?;

    Ok(config)
}

async fn build_state(config: AppConfig) -> Result<AppState> {
    let storage = folio_storage::from_config(&config.storage)
        .await
        .context("failed to initialize storage")?;
    tracing::info!(backend = storage.backend_name(), "Storage backend initialized");

    let metadata = folio_metadata::from_config(&config.metadata)
        .await
        .context("failed to initialize metadata store")?;
    tracing::info!("Metadata store initialized");

    let refresher = refresh::from_config(config.refresh.as_ref())
        .context("failed to initialize site refresh")?;
    if config.refresh.is_none() {
        tracing::info!("Site refresh hooks not configured");
    }

    Ok(AppState::new(
        config,
        storage,
        metadata,
        Arc::new(SystemClock),
        refresher,
    ))
}

/// Sweep pending assets every `interval` for the life of the process.
fn spawn_sweep_scheduler(state: &AppState) {
    let interval = state.config.sweep.auto_schedule_interval();
    let sweeper = state.sweeper();

    tokio::spawn(async move {
        tracing::info!(
            interval_secs = interval.as_secs(),
            "Automatic sweep scheduler enabled"
        );

        loop {
            tokio::time::sleep(interval).await;
            if let Err(e) = sweeper.run().await {
                tracing::error!(error = %e, "Automatic sweep failed to scan pending assets");
            }
        }
    });
}

async fn serve(state: AppState) -> Result<()> {
    if state.config.sweep.auto_schedule_enabled {
        spawn_sweep_scheduler(&state);
    } else {
        tracing::info!("Automatic sweep scheduling disabled");
    }

    let addr: SocketAddr = state
        .config
        .server
        .bind
        .parse()
        .context("invalid bind address")?;
    let app = create_router(state);

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("folio v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args.config)?;

    folio_server::metrics::register_metrics();

    let state = build_state(config).await?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(state).await,
        Command::Sweep => {
            let stats = state
                .sweeper()
                .run()
                .await
                .context("sweep failed to scan pending assets")?;
            tracing::info!(?stats, "Sweep complete");
            println!("{}", stats.tombstoned);
            Ok(())
        }
    }
}
