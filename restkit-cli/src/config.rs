//! restkit configuration file and `restkit config` subcommands
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:3030"
//!
//! [server.cors]
//! allow_cors = true
//! origin = "http://localhost:5173"
//!
//! [database]
//! dialect = "postgres"
//! host = "localhost"
//! name = "app"
//! user = "app"
//! password = "secret"
//! ```

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use restkit_core::CorsPolicy;
use restkit_db::{Collation, SqlDialect};

/// Contents of `~/.restkit/config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestkitConfig {
    pub server: ServerSection,
    pub database: Option<DatabaseSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: Option<SocketAddr>,
    pub cors: CorsPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub dialect: SqlDialect,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub name: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub ssl_mode: Option<String>,
    /// Full connection string; wins over the individual fields
    pub url: Option<String>,
    /// Create the database on `serve` when it does not exist
    #[serde(default)]
    pub create: bool,
    pub collation: Option<Collation>,
}

impl RestkitConfig {
    /// Load from `path`, or from [`Self::config_path`].
    ///
    /// A missing file is not an error: defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .context(format!("Failed to read config file: {:?}", path))?;
        Self::parse(&content).context(format!("Failed to parse config file: {:?}", path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid TOML")
    }

    /// Get config file path: ~/.restkit/config.toml
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".restkit/config.toml")
    }
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show config file path
    Path,
    /// Print the effective configuration as TOML
    Show,
    /// Write a starter config file
    Init(InitArgs),
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Force overwrite existing config
    #[arg(long, short)]
    pub force: bool,
}

pub fn run_config(args: ConfigArgs, config_path: Option<&Path>) -> Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(RestkitConfig::config_path);

    match args.command {
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommands::Show => run_show(&path),
        ConfigCommands::Init(args) => run_init(&path, args),
    }
}

fn run_show(path: &Path) -> Result<()> {
    let config = RestkitConfig::load(Some(path))?;
    if !path.exists() {
        eprintln!("# {} not found, showing defaults", path.display());
    }

    let toml_str =
        toml::to_string_pretty(&config).context("Failed to serialize config to TOML")?;
    println!("{}", toml_str);
    Ok(())
}

fn run_init(path: &Path, args: InitArgs) -> Result<()> {
    if path.exists() && !args.force {
        anyhow::bail!("Config already exists at {:?}\n\nUse --force to overwrite", path);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let starter = RestkitConfig {
        server: ServerSection {
            bind: Some(SocketAddr::from(([127, 0, 0, 1], 3030))),
            cors: CorsPolicy::disabled(),
        },
        database: None,
    };
    let content = toml::to_string_pretty(&starter).context("Failed to serialize config")?;
    fs::write(path, content).context(format!("Failed to write config file: {:?}", path))?;

    println!("Created config at: {}", path.display());
    Ok(())
}
