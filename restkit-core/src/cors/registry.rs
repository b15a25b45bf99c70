//! CORS route registry
//!
//! Registration happens once at startup through `&mut CorsRegistry`; after
//! that the registry is only read (typically behind an `Arc`) to answer
//! preflight requests.

use http::{HeaderValue, Method};

use super::policy::{CorsHeaders, CorsPolicy};
use super::table::CorsTable;
use crate::error::{RestkitError, Result};

/// Route registration capability of the underlying HTTP router.
///
/// Implemented by router adapters (see `restkit-server` for axum).
pub trait RouteSink {
    /// Route group / sub-router mounted under a shared prefix.
    type Group;
    /// Handler accepted by the router.
    type Handler;
    /// Whatever the router hands back for a registration.
    type Handle;
    type Error: From<RestkitError>;

    /// Literal path the router will report as matched for `path` registered
    /// in `group` (or at the root for `None`). Must follow the router's own
    /// prefix concatenation rule.
    fn effective_path(&self, group: Option<&Self::Group>, path: &str) -> String;

    fn add_route(
        &mut self,
        group: Option<&mut Self::Group>,
        method: &Method,
        path: &str,
        handler: Self::Handler,
    ) -> std::result::Result<Self::Handle, Self::Error>;

    /// Wrap `handler` so its responses carry `headers`.
    fn with_cors_headers(&self, handler: Self::Handler, headers: &CorsHeaders) -> Self::Handler;

    /// Handler answering `OPTIONS`; it calls back into
    /// [`CorsRegistry::preflight`] when invoked.
    fn preflight_handler(&self) -> Self::Handler;
}

/// Recovers the route path the router matched for a request.
pub trait MatchedPathResolver<Req: ?Sized> {
    fn matched_path<'r>(&self, request: &'r Req) -> Option<&'r str>;
}

/// Path -> allowed methods bookkeeping plus the preflight answer
#[derive(Debug, Clone)]
pub struct CorsRegistry {
    policy: CorsPolicy,
    /// Parsed origin, present only when CORS is enabled
    origin: Option<HeaderValue>,
    table: CorsTable,
}

impl CorsRegistry {
    /// Create a registry; with `allow_cors == false` every CORS side effect is skipped.
    pub fn configure(allow_cors: bool, origin: impl Into<String>) -> Result<Self> {
        Self::from_policy(CorsPolicy::new(allow_cors, origin))
    }

    pub fn from_policy(policy: CorsPolicy) -> Result<Self> {
        let origin = if policy.allow_cors {
            Some(policy.origin_value()?)
        } else {
            None
        };

        Ok(Self {
            policy,
            origin,
            table: CorsTable::new(),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.origin.is_some()
    }

    pub fn policy(&self) -> &CorsPolicy {
        &self.policy
    }

    pub fn table(&self) -> &CorsTable {
        &self.table
    }

    /// Register `handler` for `(path, method)` with the router.
    ///
    /// With CORS enabled the handler is wrapped to emit origin/headers, and
    /// the first registration for an effective path also registers the
    /// preflight handler under `(path, OPTIONS)`. Returns the router's handle
    /// for the primary registration.
    pub fn register_handler<R: RouteSink>(
        &mut self,
        router: &mut R,
        mut group: Option<&mut R::Group>,
        path: &str,
        method: Method,
        handler: R::Handler,
    ) -> std::result::Result<R::Handle, R::Error> {
        let Some(headers) = self.response_headers() else {
            return router.add_route(group, &method, path, handler);
        };

        let effective = router.effective_path(group.as_deref(), path);
        if method == Method::OPTIONS {
            return Err(RestkitError::preflight_conflict(effective).into());
        }

        let handler = router.with_cors_headers(handler, &headers);
        let handle = router.add_route(group.as_deref_mut(), &method, path, handler)?;

        if !self.table.contains_path(&effective) {
            let preflight = router.preflight_handler();
            router.add_route(group, &Method::OPTIONS, path, preflight)?;
            tracing::debug!(path = %effective, "registered CORS preflight handler");
        }
        self.table.record(&effective, method);

        Ok(handle)
    }

    /// Origin and allow-headers for regular responses; `None` when disabled.
    pub fn response_headers(&self) -> Option<CorsHeaders> {
        self.origin.as_ref().map(CorsHeaders::simple)
    }

    /// Preflight headers for a matched route path.
    ///
    /// `None` when CORS is disabled, when no path was matched, or when the
    /// path has no table entry.
    pub fn preflight_headers(&self, matched_path: Option<&str>) -> Option<CorsHeaders> {
        let origin = self.origin.as_ref()?;
        let entry = self.table.get(matched_path?)?;
        // method tokens are always valid header characters
        let methods = HeaderValue::from_str(&entry.allow_methods()).ok()?;
        Some(CorsHeaders::preflight(origin, methods))
    }

    /// Answer a preflight request, resolving its path through the router.
    ///
    /// A miss writes nothing; it is logged so a path normalization drift
    /// between registration and matching shows up.
    pub fn preflight<Req, P>(&self, resolver: &P, request: &Req) -> Option<CorsHeaders>
    where
        Req: ?Sized,
        P: MatchedPathResolver<Req>,
    {
        let matched = resolver.matched_path(request);
        let headers = self.preflight_headers(matched);
        if headers.is_none() && self.is_enabled() {
            tracing::warn!(
                matched_path = ?matched,
                "preflight request has no CORS entry, no headers written"
            );
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{
        ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    };
    use http::HeaderMap;

    use crate::cors::ANY_ORIGIN;

    #[derive(Debug, Clone)]
    enum FakeHandler {
        Endpoint { cors: Option<CorsHeaders> },
        Preflight,
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct FakeHandle {
        method: Method,
        path: String,
    }

    #[derive(Debug)]
    enum FakeError {
        Cors(RestkitError),
    }

    impl From<RestkitError> for FakeError {
        fn from(e: RestkitError) -> Self {
            Self::Cors(e)
        }
    }

    type FakeRoute = (Method, String, FakeHandler);

    #[derive(Debug, Default)]
    struct FakeGroup {
        prefix: String,
        routes: Vec<FakeRoute>,
    }

    /// Exact-match router; later duplicates are stored but never reached.
    #[derive(Debug, Default)]
    struct FakeRouter {
        routes: Vec<FakeRoute>,
    }

    impl FakeRouter {
        fn group(prefix: &str) -> FakeGroup {
            FakeGroup {
                prefix: prefix.to_owned(),
                routes: Vec::new(),
            }
        }

        fn mount(&mut self, group: FakeGroup) {
            for (method, path, handler) in group.routes {
                self.routes
                    .push((method, format!("{}{}", group.prefix, path), handler));
            }
        }

        fn count(&self, method: &Method, path: &str) -> usize {
            self.routes
                .iter()
                .filter(|(m, p, _)| m == method && p == path)
                .count()
        }

        /// Dispatch and return the response headers, `None` for 404.
        fn serve(&self, registry: &CorsRegistry, method: Method, path: &str) -> Option<HeaderMap> {
            let (_, matched, handler) = self
                .routes
                .iter()
                .find(|(m, p, _)| *m == method && p == path)?;

            let mut headers = HeaderMap::new();
            match handler {
                FakeHandler::Endpoint { cors: Some(cors) } => cors.apply(&mut headers),
                FakeHandler::Endpoint { cors: None } => {}
                FakeHandler::Preflight => {
                    let request = FakeRequest {
                        matched: Some(matched.clone()),
                    };
                    if let Some(cors) = registry.preflight(&FromRequest, &request) {
                        cors.apply(&mut headers);
                    }
                }
            }
            Some(headers)
        }
    }

    impl RouteSink for FakeRouter {
        type Group = FakeGroup;
        type Handler = FakeHandler;
        type Handle = FakeHandle;
        type Error = FakeError;

        fn effective_path(&self, group: Option<&FakeGroup>, path: &str) -> String {
            match group {
                Some(group) => format!("{}{}", group.prefix, path),
                None => path.to_owned(),
            }
        }

        fn add_route(
            &mut self,
            group: Option<&mut FakeGroup>,
            method: &Method,
            path: &str,
            handler: FakeHandler,
        ) -> std::result::Result<FakeHandle, FakeError> {
            let routes = match group {
                Some(group) => &mut group.routes,
                None => &mut self.routes,
            };
            routes.push((method.clone(), path.to_owned(), handler));
            Ok(FakeHandle {
                method: method.clone(),
                path: path.to_owned(),
            })
        }

        fn with_cors_headers(&self, _handler: FakeHandler, headers: &CorsHeaders) -> FakeHandler {
            FakeHandler::Endpoint {
                cors: Some(headers.clone()),
            }
        }

        fn preflight_handler(&self) -> FakeHandler {
            FakeHandler::Preflight
        }
    }

    struct FakeRequest {
        matched: Option<String>,
    }

    struct FromRequest;

    impl MatchedPathResolver<FakeRequest> for FromRequest {
        fn matched_path<'r>(&self, request: &'r FakeRequest) -> Option<&'r str> {
            request.matched.as_deref()
        }
    }

    fn endpoint() -> FakeHandler {
        FakeHandler::Endpoint { cors: None }
    }

    fn register(
        registry: &mut CorsRegistry,
        router: &mut FakeRouter,
        group: Option<&mut FakeGroup>,
        path: &str,
        method: Method,
    ) -> FakeHandle {
        registry
            .register_handler(router, group, path, method, endpoint())
            .unwrap()
    }

    fn allow_methods(headers: &HeaderMap) -> Option<&str> {
        headers
            .get(ACCESS_CONTROL_ALLOW_METHODS)
            .and_then(|v| v.to_str().ok())
    }

    fn assert_preflight(
        router: &FakeRouter,
        registry: &CorsRegistry,
        path: &str,
        origin: &str,
        methods: &str,
    ) {
        let headers = router
            .serve(registry, Method::OPTIONS, path)
            .unwrap_or_else(|| panic!("no OPTIONS route for {path}"));
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], origin);
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], "*");
        assert_eq!(allow_methods(&headers), Some(methods));
    }

    #[test]
    fn single_get_route() {
        let mut registry = CorsRegistry::configure(true, ANY_ORIGIN).unwrap();
        let mut router = FakeRouter::default();
        register(&mut registry, &mut router, None, "/api/realm", Method::GET);

        assert_preflight(&router, &registry, "/api/realm", "*", "OPTIONS,GET");
    }

    #[test]
    fn collection_and_item_routes_are_independent() {
        let mut registry = CorsRegistry::configure(true, ANY_ORIGIN).unwrap();
        let mut router = FakeRouter::default();
        for method in [Method::GET, Method::POST] {
            register(&mut registry, &mut router, None, "/api/user", method);
        }
        for method in [Method::GET, Method::PUT, Method::DELETE] {
            register(&mut registry, &mut router, None, "/api/user/{id}", method);
        }

        assert_preflight(&router, &registry, "/api/user", "*", "OPTIONS,GET,POST");
        assert_preflight(
            &router,
            &registry,
            "/api/user/{id}",
            "*",
            "OPTIONS,GET,PUT,DELETE",
        );
        assert_eq!(registry.table().len(), 2);
    }

    #[test]
    fn sub_routers_do_not_leak() {
        let origin = "192.168.30.0";
        let mut registry = CorsRegistry::configure(true, origin).unwrap();
        let mut router = FakeRouter::default();

        let mut service1 = FakeRouter::group("/service1");
        let mut service2 = FakeRouter::group("/service2");
        for method in [Method::GET, Method::POST] {
            register(&mut registry, &mut router, Some(&mut service1), "/api/object", method);
        }
        register(&mut registry, &mut router, Some(&mut service2), "/api/object", Method::GET);
        register(&mut registry, &mut router, Some(&mut service2), "/api/object", Method::POST);
        register(&mut registry, &mut router, Some(&mut service2), "/api/class/{id}", Method::DELETE);
        router.mount(service1);
        router.mount(service2);

        assert_preflight(&router, &registry, "/service1/api/object", origin, "OPTIONS,GET,POST");
        assert_preflight(&router, &registry, "/service2/api/object", origin, "OPTIONS,GET,POST");
        assert_preflight(&router, &registry, "/service2/api/class/{id}", origin, "OPTIONS,DELETE");
        assert!(registry.table().get("/api/object").is_none());
    }

    #[test]
    fn group_and_root_resolving_to_same_path_share_entry() {
        let mut registry = CorsRegistry::configure(true, ANY_ORIGIN).unwrap();
        let mut router = FakeRouter::default();

        let mut api = FakeRouter::group("/api");
        register(&mut registry, &mut router, Some(&mut api), "/user", Method::GET);
        router.mount(api);
        register(&mut registry, &mut router, None, "/api/user", Method::POST);

        assert_eq!(router.count(&Method::OPTIONS, "/api/user"), 1);
        assert_preflight(&router, &registry, "/api/user", "*", "OPTIONS,GET,POST");
    }

    #[test]
    fn re_registration_does_not_duplicate_method() {
        let mut registry = CorsRegistry::configure(true, ANY_ORIGIN).unwrap();
        let mut router = FakeRouter::default();
        register(&mut registry, &mut router, None, "/api/user", Method::GET);
        register(&mut registry, &mut router, None, "/api/user", Method::POST);
        register(&mut registry, &mut router, None, "/api/user", Method::GET);

        assert_eq!(router.count(&Method::OPTIONS, "/api/user"), 1);
        assert_preflight(&router, &registry, "/api/user", "*", "OPTIONS,GET,POST");
    }

    #[test]
    fn regular_responses_carry_origin_and_headers_only() {
        let mut registry = CorsRegistry::configure(true, "http://localhost:3000").unwrap();
        let mut router = FakeRouter::default();
        register(&mut registry, &mut router, None, "/api/user", Method::POST);

        let headers = router.serve(&registry, Method::POST, "/api/user").unwrap();
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:3000");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], "*");
        assert!(headers.get(ACCESS_CONTROL_ALLOW_METHODS).is_none());
    }

    #[test]
    fn disabled_registry_only_delegates() {
        let mut registry = CorsRegistry::configure(false, ANY_ORIGIN).unwrap();
        let mut router = FakeRouter::default();
        register(&mut registry, &mut router, None, "/api/user", Method::GET);

        let headers = router.serve(&registry, Method::GET, "/api/user").unwrap();
        assert!(headers.is_empty());
        assert!(router.serve(&registry, Method::OPTIONS, "/api/user").is_none());
        assert!(registry.table().is_empty());
        assert!(registry.response_headers().is_none());
    }

    #[test]
    fn disabled_registry_passes_options_through() {
        let mut registry = CorsRegistry::configure(false, ANY_ORIGIN).unwrap();
        let mut router = FakeRouter::default();
        register(&mut registry, &mut router, None, "/api/user", Method::OPTIONS);

        assert_eq!(router.count(&Method::OPTIONS, "/api/user"), 1);
    }

    #[test]
    fn returns_primary_handle() {
        let mut registry = CorsRegistry::configure(true, ANY_ORIGIN).unwrap();
        let mut router = FakeRouter::default();
        let handle = register(&mut registry, &mut router, None, "/api/realm", Method::GET);

        assert_eq!(
            handle,
            FakeHandle {
                method: Method::GET,
                path: "/api/realm".into()
            }
        );
    }

    #[test]
    fn explicit_options_is_rejected_when_enabled() {
        let mut registry = CorsRegistry::configure(true, ANY_ORIGIN).unwrap();
        let mut router = FakeRouter::default();
        let result =
            registry.register_handler(&mut router, None, "/api/user", Method::OPTIONS, endpoint());

        assert!(matches!(
            result,
            Err(FakeError::Cors(RestkitError::PreflightConflict { .. }))
        ));
        assert!(router.routes.is_empty());
    }

    #[test]
    fn preflight_miss_writes_nothing() {
        let mut registry = CorsRegistry::configure(true, ANY_ORIGIN).unwrap();
        let mut router = FakeRouter::default();
        register(&mut registry, &mut router, None, "/api/realm", Method::GET);

        assert!(registry.preflight_headers(Some("/api/realm/")).is_none());
        assert!(registry.preflight_headers(None).is_none());

        let request = FakeRequest { matched: None };
        assert!(registry.preflight(&FromRequest, &request).is_none());
    }

    #[test]
    fn invalid_origin_fails_configure() {
        let err = CorsRegistry::configure(true, "bad\u{7f}origin").unwrap_err();
        assert!(matches!(err, RestkitError::InvalidOrigin { .. }));

        // origin is not used when disabled
        assert!(CorsRegistry::configure(false, "bad\u{7f}origin").is_ok());
    }
}
