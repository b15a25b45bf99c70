//! CORS policy configuration and header sets

use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use http::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use super::{ALLOW_ALL_HEADER_VALUES, ANY_ORIGIN};
use crate::error::{RestkitError, Result};

/// CORS settings for a registry
///
/// `origin` is written verbatim into `Access-Control-Allow-Origin`. There is
/// no per-request origin matching: one fixed origin or `*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsPolicy {
    pub allow_cors: bool,
    pub origin: String,
}

impl CorsPolicy {
    pub fn new(allow_cors: bool, origin: impl Into<String>) -> Self {
        Self {
            allow_cors,
            origin: origin.into(),
        }
    }

    /// Enabled policy allowing any origin.
    pub fn any_origin() -> Self {
        Self::new(true, ANY_ORIGIN)
    }

    /// Disabled policy.
    pub fn disabled() -> Self {
        Self::new(false, ANY_ORIGIN)
    }

    /// Parse the origin into a header value.
    pub fn origin_value(&self) -> Result<HeaderValue> {
        HeaderValue::from_str(&self.origin)
            .map_err(|e| RestkitError::invalid_origin(&self.origin, e.to_string()))
    }
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Ordered set of CORS response headers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorsHeaders {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl CorsHeaders {
    /// Headers written on every response of a registered route.
    pub(crate) fn simple(origin: &HeaderValue) -> Self {
        Self {
            headers: vec![
                (ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone()),
                (
                    ACCESS_CONTROL_ALLOW_HEADERS,
                    HeaderValue::from_static(ALLOW_ALL_HEADER_VALUES),
                ),
            ],
        }
    }

    /// Headers written on a preflight response.
    pub(crate) fn preflight(origin: &HeaderValue, methods: HeaderValue) -> Self {
        let mut headers = Self::simple(origin);
        headers
            .headers
            .push((ACCESS_CONTROL_ALLOW_METHODS, methods));
        headers
    }

    pub fn get(&self, name: &HeaderName) -> Option<&HeaderValue> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// `get` as a string, for assertions and logging.
    pub fn get_str(&self, name: &HeaderName) -> Option<&str> {
        self.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.headers.iter().map(|(n, v)| (n, v))
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Write every header into `target`, replacing existing values.
    pub fn apply(&self, target: &mut HeaderMap) {
        for (name, value) in &self.headers {
            target.insert(name.clone(), value.clone());
        }
    }
}

impl IntoIterator for CorsHeaders {
    type Item = (HeaderName, HeaderValue);
    type IntoIter = std::vec::IntoIter<(HeaderName, HeaderValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.headers.into_iter()
    }
}
