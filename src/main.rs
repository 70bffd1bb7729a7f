//! Child Mortality Dashboard server
//!
//! Run with: cargo run -- --data data/clean_data.csv
//!
//! # Configuration
//!
//! Settings come from a TOML file (`--config`, or the first of
//! `~/.config/childmort/config.toml`, `/etc/childmort/config.toml`,
//! `./config.toml`), then `CHILDMORT_*` environment variables, then flags.
//!
//! - `CHILDMORT_DATA_PATH`: Cleaned dataset CSV
//! - `CHILDMORT_ISO_PATH`: Extra `country,iso_alpha` table
//! - `CHILDMORT_API_HOST` / `CHILDMORT_API_PORT`: Bind address (default: 0.0.0.0:8050)
//! - `CHILDMORT_LOG_LEVEL` / `CHILDMORT_LOG_FORMAT`: Logging (pretty or json)
//! - `RUST_LOG`: Log filter (default: the configured level)

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use childmort::api::{serve, AppState};
use childmort::config::{generate_default_config, Config, LoggingConfig};
use childmort::dataset::{DatasetLoader, DatasetStore, IsoLookup};

#[derive(Parser)]
#[command(name = "childmort")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Interactive dashboard of child deaths by disease across Africa")]
struct Args {
    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dataset CSV, overrides the configured path
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Print a default configuration file and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_config {
        print!("{}", generate_default_config());
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load_default(),
    };
    if let Some(data) = args.data {
        config.dataset.path = data;
    }
    if let Some(host) = args.host {
        config.api.host = host;
    }
    if let Some(port) = args.port {
        config.api.port = port;
    }

    init_logging(&config.logging);

    tracing::info!("Starting Child Mortality Dashboard v{}", env!("CARGO_PKG_VERSION"));

    let mut iso = IsoLookup::builtin();
    if let Some(iso_path) = &config.dataset.iso_path {
        let added = iso
            .extend_from_csv(iso_path)
            .with_context(|| format!("Failed to read ISO table {}", iso_path.display()))?;
        tracing::info!(path = ?iso_path, added, "ISO table extended");
    }

    let loader = DatasetLoader::new()
        .with_iso(iso)
        .with_header(config.dataset.has_header);
    let store = DatasetStore::load_with(&loader, &config.dataset.path)
        .with_context(|| format!("Failed to load dataset {}", config.dataset.path.display()))?;

    let stats = store.stats();
    if !stats.missing_iso.is_empty() {
        tracing::warn!(
            countries = ?stats.missing_iso,
            "Countries without an ISO code are left off the map"
        );
    }

    let state = AppState::new(Arc::new(store), &config);
    serve(state, &config.api).await?;

    tracing::info!("Child Mortality Dashboard stopped");
    Ok(())
}

/// Install the global subscriber
///
/// `RUST_LOG` wins over the configured level when set.
fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("childmort={},tower_http=info", logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
