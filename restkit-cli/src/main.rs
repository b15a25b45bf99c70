//! restkit CLI
//!
//! - `serve`: run the HTTP API with CORS derived from registered routes
//! - `db`: build connection strings, check/create/drop databases
//! - `config`: locate, show and initialise `~/.restkit/config.toml`

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod tracing_setup;

use config::RestkitConfig;
use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "restkit",
    author,
    version,
    about = "CORS-aware HTTP routing and database helpers for REST backends"
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file (default: ~/.restkit/config.toml)
    #[arg(long, global = true, env = "RESTKIT_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Database helpers (conn-string, check, create, drop, random)
    Db(commands::db::DbCommand),
    /// Manage restkit configuration (path, show, init)
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    tracing_setup::init(&TracingConfig { debug: cli.debug }).ok();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve(args) => {
            let config = RestkitConfig::load(config_path)?;
            commands::run_serve(args, &config).await?
        }
        Commands::Db(args) => {
            let config = RestkitConfig::load(config_path)?;
            commands::run_db(args, &config).await?
        }
        Commands::Config(args) => config::run_config(args, config_path)?,
    }
    Ok(())
}
