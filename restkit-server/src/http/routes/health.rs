//! Health check endpoint

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::http::error::ApiError;
use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// `ok`, or `not_configured` when the server runs without a database
    pub database: &'static str,
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let database = match state.db() {
        Some(db) => {
            db.ping().await.map_err(|e| ApiError::Unavailable {
                service: "database",
                reason: e.to_string(),
            })?;
            "ok"
        }
        None => "not_configured",
    };

    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        database,
    }))
}
