//! HTTP server layer
//!
//! Axum server with:
//! - CORS preflight and headers derived from registered routes
//! - Request tracing
//! - Graceful shutdown
//! - JSON error responses

pub mod cors;
pub mod error;
pub mod routes;
pub mod server;

pub use cors::{AxumMatchedPath, CorsApi, RegisteredRoute, RouteGroup, RouteHandler};
pub use error::ApiError;
pub use server::{build_app, run_server, ServerConfig, ServerError};
