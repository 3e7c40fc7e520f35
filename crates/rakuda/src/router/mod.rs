//! Route configuration and dispatch.
//!
//! Routes are declared on a [`RouterBuilder`] as a tree of [`Scope`]s, each holding handlers,
//! middlewares and nested scopes. [`RouterBuilder::build`] compiles the tree once into a
//! [`Router`]: full paths are resolved, every handler is wrapped with the middlewares of its scope
//! and of all enclosing scopes, and duplicates go through the [`ConflictPolicy`].
//!
//! The resulting router is immutable and can be shared between tasks to dispatch requests
//! concurrently.

mod builder;
mod compile;
mod conflict;
mod error;
mod fallback;
mod print;

pub use builder::{RouterBuilder, Scope};
pub use conflict::{ConflictPolicy, ConflictResult, DuplicateRoute, FailOnConflict, WarnOnConflict};
pub use error::BuildError;
pub use fallback::NotFound;
pub use print::print_routes;

use crate::body::{ReqBody, ResponseBody};
use crate::handler::{BoxedHandler, RequestHandler};
use crate::request::PathParams;
use async_trait::async_trait;
use compile::RouteTable;
use http::{Method, Request, Response};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

type InnerRouter<T> = matchit::Router<T>;

/// Identifies a route: an HTTP method and a fully resolved path pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    method: Method,
    pattern: String,
}

impl RouteKey {
    pub fn new(method: Method, pattern: impl Into<String>) -> Self {
        Self { method, pattern: pattern.into() }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.pattern)
    }
}

/// The compiled, immutable route table.
///
/// `Router` is itself a [`RequestHandler`]: each request is matched once against the routes of
/// its method, the captured [`PathParams`] are stored in the request extensions and the matched
/// handler (already wrapped by its middlewares) is invoked. Requests that match nothing, including
/// a known path under another method, go to the fallback.
///
/// Methods are matched exactly. In particular `HEAD` is not derived from `GET`: a path only
/// answers `HEAD` if a `HEAD` handler was registered for it, otherwise the request goes to the
/// fallback like any other method mismatch.
///
/// Path parameters are percent-decoded before they reach the handler, see [`PathParams`].
pub struct Router {
    routes: HashMap<Method, InnerRouter<BoxedHandler>>,
    fallback: BoxedHandler,
    len: usize,
}

/// Result of matching a route: the handler and the captured path parameters.
pub struct RouteMatch<'router, 'path> {
    handler: &'router BoxedHandler,
    params: matchit::Params<'router, 'path>,
}

impl Router {
    /// Creates an empty [`RouterBuilder`].
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    pub(crate) fn new(table: RouteTable, fallback: BoxedHandler) -> Self {
        let len = table.len();
        Self { routes: table.into_routes(), fallback, len }
    }

    /// Matches `method` and `path` against the compiled routes.
    ///
    /// Returns `None` when nothing matches, in which case dispatch would use the fallback.
    pub fn at<'path>(&self, method: &Method, path: &'path str) -> Option<RouteMatch<'_, 'path>> {
        let matched = self.routes.get(method)?.at(path).ok()?;
        Some(RouteMatch { handler: matched.value, params: matched.params })
    }

    /// The number of compiled routes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<'router, 'path> RouteMatch<'router, 'path> {
    pub fn handler(&self) -> &'router dyn RequestHandler {
        &**self.handler
    }

    pub fn params(&self) -> &matchit::Params<'router, 'path> {
        &self.params
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<_> = self.routes.keys().map(Method::as_str).collect();
        methods.sort_unstable();
        f.debug_struct("Router").field("routes", &self.len).field("methods", &methods).finish_non_exhaustive()
    }
}

impl fmt::Debug for RouteMatch<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMatch").field("params", &self.params).finish_non_exhaustive()
    }
}

#[async_trait]
impl RequestHandler for Router {
    async fn invoke(&self, mut req: Request<ReqBody>) -> Response<ResponseBody> {
        let Some((handler, params)) =
            self.at(req.method(), req.uri().path()).map(|matched| (matched.handler(), PathParams::from(matched.params())))
        else {
            debug!(method = %req.method(), path = req.uri().path(), "no route matched, using fallback");
            return self.fallback.invoke(req).await;
        };

        req.extensions_mut().insert(params);
        handler.invoke(req).await
    }
}
