//! CORS registry over `axum::Router`
//!
//! ```ignore
//! let mut api = CorsApi::<AppState>::from_policy(&CorsPolicy::any_origin())?;
//! let mut group = api.group("/api");
//! api.get(Some(&mut group), "/user", list_users)?;
//! api.post(Some(&mut group), "/user", create_user)?;
//! api.mount(group);
//! let app = api.into_router().with_state(state);
//! // OPTIONS /api/user -> Access-Control-Allow-Methods: OPTIONS,GET,POST
//! ```
//!
//! The router returned by [`CorsApi::into_router`] must be served at the
//! root: preflight lookups key on axum's `MatchedPath`, which would carry an
//! extra prefix if the router were nested again.

use std::sync::Arc;

use axum::extract::{MatchedPath, Request};
use axum::handler::Handler;
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{on, MethodFilter, MethodRouter};
use axum::{Extension, Router};
use tower_http::set_header::SetResponseHeaderLayer;

use restkit_core::{CorsHeaders, CorsPolicy, CorsRegistry, MatchedPathResolver, RestkitError, RouteSink};

/// Route handler with its HTTP method still open
///
/// The method filter is supplied when the route is added, so the same
/// erased handler works for every registration path.
pub struct RouteHandler<S> {
    build: Box<dyn FnOnce(MethodFilter) -> MethodRouter<S>>,
}

impl<S> RouteHandler<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new<H, T>(handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        Self {
            build: Box::new(move |filter| on(filter, handler)),
        }
    }

    fn into_method_router(self, filter: MethodFilter) -> MethodRouter<S> {
        (self.build)(filter)
    }
}

/// Routes sharing a prefix, nested into the root router by [`CorsApi::mount`]
pub struct RouteGroup<S> {
    prefix: String,
    router: Router<S>,
}

impl<S> RouteGroup<S> {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

/// What a registration produced: the method and the path axum will match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredRoute {
    pub method: Method,
    pub path: String,
}

/// Path axum reports as matched for `path` nested under `prefix`.
pub fn nested_path(prefix: &str, path: &str) -> String {
    if prefix.ends_with('/') {
        format!("{prefix}{}", path.trim_start_matches('/'))
    } else if path == "/" {
        prefix.to_owned()
    } else {
        format!("{prefix}{path}")
    }
}

/// Resolves the matched route through axum's `MatchedPath` extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct AxumMatchedPath;

impl<B> MatchedPathResolver<axum::http::Request<B>> for AxumMatchedPath {
    fn matched_path<'r>(&self, request: &'r axum::http::Request<B>) -> Option<&'r str> {
        request
            .extensions()
            .get::<MatchedPath>()
            .map(MatchedPath::as_str)
    }
}

/// axum side of [`RouteSink`]
struct AxumSink<S> {
    root: Router<S>,
}

impl<S> RouteSink for AxumSink<S>
where
    S: Clone + Send + Sync + 'static,
{
    type Group = RouteGroup<S>;
    type Handler = RouteHandler<S>;
    type Handle = RegisteredRoute;
    type Error = RestkitError;

    fn effective_path(&self, group: Option<&RouteGroup<S>>, path: &str) -> String {
        match group {
            Some(group) => nested_path(&group.prefix, path),
            None => path.to_owned(),
        }
    }

    fn add_route(
        &mut self,
        group: Option<&mut RouteGroup<S>>,
        method: &Method,
        path: &str,
        handler: RouteHandler<S>,
    ) -> Result<RegisteredRoute, RestkitError> {
        let filter = MethodFilter::try_from(method.clone())
            .map_err(|_| RestkitError::invalid_method(method.as_str()))?;
        let route = handler.into_method_router(filter);
        let effective = self.effective_path(group.as_deref(), path);

        match group {
            Some(group) => group.router = std::mem::take(&mut group.router).route(path, route),
            None => self.root = std::mem::take(&mut self.root).route(path, route),
        }

        Ok(RegisteredRoute {
            method: method.clone(),
            path: effective,
        })
    }

    fn with_cors_headers(&self, handler: RouteHandler<S>, headers: &CorsHeaders) -> RouteHandler<S> {
        let headers = headers.clone();
        RouteHandler {
            build: Box::new(move |filter| {
                headers
                    .into_iter()
                    .fold(handler.into_method_router(filter), |route, (name, value)| {
                        route.layer(SetResponseHeaderLayer::overriding(name, value))
                    })
            }),
        }
    }

    fn preflight_handler(&self) -> RouteHandler<S> {
        RouteHandler::new(preflight)
    }
}

/// Answers `OPTIONS` for every path with a CORS entry.
async fn preflight(request: Request) -> impl IntoResponse {
    let headers = request
        .extensions()
        .get::<Arc<CorsRegistry>>()
        .and_then(|registry| registry.preflight(&AxumMatchedPath, &request));

    let mut response = StatusCode::OK.into_response();
    if let Some(headers) = headers {
        headers.apply(response.headers_mut());
    }
    response
}

/// axum router builder that keeps the CORS registry in step with routes
pub struct CorsApi<S = ()> {
    sink: AxumSink<S>,
    registry: CorsRegistry,
}

impl<S> CorsApi<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new(registry: CorsRegistry) -> Self {
        Self {
            sink: AxumSink {
                root: Router::new(),
            },
            registry,
        }
    }

    pub fn from_policy(policy: &CorsPolicy) -> Result<Self, RestkitError> {
        CorsRegistry::from_policy(policy.clone()).map(Self::new)
    }

    pub fn registry(&self) -> &CorsRegistry {
        &self.registry
    }

    /// Start a group of routes to be nested at `prefix`.
    ///
    /// `prefix` follows `Router::nest` rules: it starts with `/` and is not
    /// `/` itself.
    pub fn group(&self, prefix: impl Into<String>) -> RouteGroup<S> {
        RouteGroup {
            prefix: prefix.into(),
            router: Router::new(),
        }
    }

    /// Nest a group into the root router.
    pub fn mount(&mut self, group: RouteGroup<S>) {
        let RouteGroup { prefix, router } = group;
        self.sink.root = std::mem::take(&mut self.sink.root).nest(&prefix, router);
    }

    /// Register `handler` for `(path, method)` in `group`, or at the root.
    ///
    /// Registering the same `(path, method)` twice panics inside axum.
    pub fn handle<H, T>(
        &mut self,
        group: Option<&mut RouteGroup<S>>,
        path: &str,
        method: Method,
        handler: H,
    ) -> Result<RegisteredRoute, RestkitError>
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.registry.register_handler(
            &mut self.sink,
            group,
            path,
            method,
            RouteHandler::new(handler),
        )
    }

    pub fn get<H, T>(
        &mut self,
        group: Option<&mut RouteGroup<S>>,
        path: &str,
        handler: H,
    ) -> Result<RegisteredRoute, RestkitError>
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.handle(group, path, Method::GET, handler)
    }

    pub fn post<H, T>(
        &mut self,
        group: Option<&mut RouteGroup<S>>,
        path: &str,
        handler: H,
    ) -> Result<RegisteredRoute, RestkitError>
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.handle(group, path, Method::POST, handler)
    }

    pub fn put<H, T>(
        &mut self,
        group: Option<&mut RouteGroup<S>>,
        path: &str,
        handler: H,
    ) -> Result<RegisteredRoute, RestkitError>
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.handle(group, path, Method::PUT, handler)
    }

    pub fn patch<H, T>(
        &mut self,
        group: Option<&mut RouteGroup<S>>,
        path: &str,
        handler: H,
    ) -> Result<RegisteredRoute, RestkitError>
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.handle(group, path, Method::PATCH, handler)
    }

    pub fn delete<H, T>(
        &mut self,
        group: Option<&mut RouteGroup<S>>,
        path: &str,
        handler: H,
    ) -> Result<RegisteredRoute, RestkitError>
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.handle(group, path, Method::DELETE, handler)
    }

    /// Freeze the registry and hand back the router.
    ///
    /// The registry is installed as an `Arc<CorsRegistry>` request extension
    /// on every route registered so far; routes added afterwards do not see it.
    pub fn into_router(self) -> Router<S> {
        let registry = Arc::new(self.registry);
        self.sink.root.layer(Extension(registry))
    }
}
