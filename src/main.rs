//! folio CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use folio::commands;
use folio::config::Config;
use folio::constants::SEED_UPLOAD_DELAY_MS;

#[derive(Parser)]
#[command(name = "folio", version, about = "Portfolio admin service and site tooling")]
struct Cli {
    /// Configuration file (defaults to ./folio.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the admin API server
    Serve {
        /// Override server.port
        #[arg(short, long)]
        port: Option<u16>,
        /// Keep the database in memory (nothing is persisted)
        #[arg(long)]
        ephemeral: bool,
        /// Disable the /metrics endpoint
        #[arg(long)]
        no_metrics: bool,
    },
    /// Upload images and create projects listed in a manifest
    Seed {
        /// Path to the TOML manifest
        manifest: PathBuf,
        /// Pause between uploads in milliseconds
        #[arg(long, default_value_t = SEED_UPLOAD_DELAY_MS)]
        delay_ms: u64,
        /// Seed an in-memory database (dry run against the image host)
        #[arg(long)]
        ephemeral: bool,
    },
    /// Write site data JSON for the static build
    Export {
        /// Output file
        #[arg(short, long, default_value = "site-data.json")]
        out: PathBuf,
        /// Fetch every delivery URL once after exporting
        #[arg(long)]
        warm: bool,
    },
    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate configuration and print warnings
    Check,
}

fn init_logging(json: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("folio=info"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve {
            port,
            ephemeral,
            no_metrics,
        } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            commands::serve::execute(config, ephemeral, !no_metrics).await
        },
        Commands::Seed {
            manifest,
            delay_ms,
            ephemeral,
        } => {
            commands::seed::execute(config, &manifest, Duration::from_millis(delay_ms), ephemeral)
                .await
        },
        Commands::Export { out, warm } => commands::export::execute(config, &out, warm).await,
        Commands::Config { action } => match action {
            ConfigAction::Check => commands::config_cmd::check(&config),
        },
    }
}
