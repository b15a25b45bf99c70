//! Application state shared across handlers

use std::sync::Arc;

use restkit_db::DbConnection;

/// Shared application state
#[derive(Clone, Default)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

#[derive(Default)]
struct AppStateInner {
    db: Option<DbConnection>,
}

impl AppState {
    pub fn new(db: Option<DbConnection>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { db }),
        }
    }

    /// Database opened at startup, if one was configured.
    pub fn db(&self) -> Option<&DbConnection> {
        self.inner.db.as_ref()
    }
}
