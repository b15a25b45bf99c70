//! Route handlers organized by resource

pub mod health;
pub mod table;

use axum::http::Uri;

use super::error::ApiError;

/// JSON 404 for paths no route matched.
pub async fn fallback(uri: Uri) -> ApiError {
    ApiError::NotFound {
        resource: "route",
        id: uri.path().to_owned(),
    }
}
