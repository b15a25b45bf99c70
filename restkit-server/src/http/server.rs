//! Axum server setup
//!
//! Server skeleton with:
//! - CORS from the route registry (disabled by default)
//! - Tracing middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use restkit_core::{CorsPolicy, RestkitError};

use super::cors::CorsApi;
use super::routes;
use crate::state::AppState;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:3030)
    pub bind_addr: SocketAddr,

    /// CORS policy (default: disabled)
    pub cors: CorsPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3030)),
            cors: CorsPolicy::default(),
        }
    }
}

/// Build the application router.
///
/// Every API route goes through [`CorsApi`], so with CORS enabled each one
/// answers preflight requests with the methods registered for it.
pub fn build_app(state: AppState, policy: &CorsPolicy) -> Result<Router, RestkitError> {
    let mut api = CorsApi::<AppState>::from_policy(policy)?;

    let mut group = api.group("/api");
    api.get(Some(&mut group), "/health", routes::health::health)?;
    api.get(Some(&mut group), "/routes", routes::table::list_routes)?;
    api.mount(group);

    Ok(api
        .into_router()
        .fallback(routes::fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Run the HTTP server.
///
/// # Example
///
/// ```ignore
/// let state = AppState::new(None);
/// run_server(state, ServerConfig::default()).await?;
/// ```
pub async fn run_server(state: AppState, config: ServerConfig) -> Result<(), ServerError> {
    if config.cors.allow_cors {
        tracing::info!(origin = %config.cors.origin, "CORS enabled");
    }
    let app = build_app(state, &config.cors)?;

    // Bind listener
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    // Run with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CORS configuration error: {0}")]
    Cors(#[from] RestkitError),
}
