//! restkit-server: axum adapter for the CORS registry and the restkit server
//!
//! [`CorsApi`] registers axum routes through a
//! [`restkit_core::CorsRegistry`], so every route gets its origin headers and
//! an `OPTIONS` preflight handler listing the methods registered for it.

pub mod http;
pub mod state;

pub use http::{build_app, run_server, ApiError, CorsApi, RegisteredRoute, RouteGroup, ServerConfig, ServerError};
pub use state::AppState;
