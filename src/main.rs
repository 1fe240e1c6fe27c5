//! Table planner server: multi-tenant floor plan editing backend.
//!
//! Main entry point that loads configuration, initializes logging, and
//! dispatches to the `serve` or `migrate` command.

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use planner_core::config::{AppConfig, DatabaseBackend};
use planner_core::error::AppError;
use planner_database::DatabasePool;
use planner_database::migration::run_migrations;

/// Table planner backend
#[derive(Debug, Parser)]
#[command(name = "planner-server", version, about, long_about = None)]
struct Cli {
    /// Configuration environment overlay (`config/{env}.toml`)
    #[arg(short, long, env = "PLANNER_ENV", default_value = "development")]
    env: String,

    /// Directory holding `default.toml` and the environment overlays
    #[arg(long, default_value = "config")]
    config_dir: String,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config_dir, &cli.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %cli.env, "Table planner v{}", env!("CARGO_PKG_VERSION"));

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => planner_api::run_server(config).await,
        Commands::Migrate => migrate(&config).await,
    };

    if let Err(e) = result {
        tracing::error!(kind = %e.kind, "{}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Run migrations against the configured PostgreSQL database.
async fn migrate(config: &AppConfig) -> Result<(), AppError> {
    if config.database.backend != DatabaseBackend::Postgres {
        return Err(AppError::configuration(
            "migrate requires database.backend = \"postgres\"",
        ));
    }
    let database = DatabasePool::connect(&config.database).await?;
    let result = run_migrations(database.pool()).await;
    database.close().await;
    result
}
