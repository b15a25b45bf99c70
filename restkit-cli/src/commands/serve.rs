//! HTTP server command
//!
//! Runs the restkit HTTP server, optionally backed by a database.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;

use restkit_core::CorsPolicy;
use restkit_db::{open_db_with_conn_str, OpenOptions};
use restkit_server::{run_server, AppState, ServerConfig};

use super::db::DbArgs;
use crate::config::RestkitConfig;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: 127.0.0.1:3030)
    #[arg(long, short = 'b', env = "RESTKIT_BIND")]
    pub bind: Option<SocketAddr>,

    /// Answer CORS preflight requests and add origin headers
    #[arg(long, env = "RESTKIT_ALLOW_CORS")]
    pub allow_cors: bool,

    /// Value of Access-Control-Allow-Origin (default: *)
    #[arg(long, env = "RESTKIT_ORIGIN")]
    pub origin: Option<String>,

    /// Run without a database even if one is configured
    #[arg(long)]
    pub no_db: bool,

    /// Create the database when it does not exist
    #[arg(long)]
    pub create_db: bool,

    #[command(flatten)]
    pub db: DbArgs,
}

impl ServeArgs {
    /// Merge flags over the config file.
    pub fn server_config(&self, config: &RestkitConfig) -> ServerConfig {
        let defaults = ServerConfig::default();
        let section = &config.server;

        let origin = self
            .origin
            .clone()
            .or_else(|| Some(section.cors.origin.clone()).filter(|o| !o.is_empty()))
            .unwrap_or_else(|| CorsPolicy::any_origin().origin);

        ServerConfig {
            bind_addr: self.bind.or(section.bind).unwrap_or(defaults.bind_addr),
            cors: CorsPolicy::new(self.allow_cors || section.cors.allow_cors, origin),
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, config: &RestkitConfig) -> Result<()> {
    let server_config = args.server_config(config);

    let db = match args.db.resolve(config.database.as_ref()).filter(|_| !args.no_db) {
        Some(db) => {
            let create = args.create_db || config.database.as_ref().is_some_and(|c| c.create);
            tracing::info!(dialect = %db.dialect, create, "Opening database");
            let conn = open_db_with_conn_str(
                db.dialect,
                &db.conn_str,
                OpenOptions::new().create(create),
                db.collation.as_ref(),
            )
            .await
            .context("Failed to open database")?;
            Some(conn)
        }
        None => {
            tracing::info!("Running without a database");
            None
        }
    };

    tracing::info!("Starting restkit server on {}", server_config.bind_addr);

    // Run server (blocks until shutdown)
    run_server(AppState::new(db), server_config)
        .await
        .context("Server error")?;

    Ok(())
}
