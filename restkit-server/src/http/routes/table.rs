//! CORS table listing

use std::sync::Arc;

use axum::{Extension, Json};
use serde::Serialize;

use restkit_core::CorsRegistry;

#[derive(Debug, Serialize)]
pub struct RouteEntry {
    pub path: String,
    pub methods: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RoutesResponse {
    pub cors_enabled: bool,
    pub origin: String,
    pub routes: Vec<RouteEntry>,
}

/// GET /api/routes
///
/// Paths are sorted; methods keep their registration order.
pub async fn list_routes(Extension(registry): Extension<Arc<CorsRegistry>>) -> Json<RoutesResponse> {
    let routes = registry
        .table()
        .entries()
        .into_iter()
        .map(|entry| RouteEntry {
            path: entry.path().to_owned(),
            methods: entry.methods().iter().map(ToString::to_string).collect(),
        })
        .collect();

    Json(RoutesResponse {
        cors_enabled: registry.is_enabled(),
        origin: registry.policy().origin.clone(),
        routes,
    })
}
